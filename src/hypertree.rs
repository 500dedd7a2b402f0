//! # Hypertree
//!
//! `d` layers of Merkle trees of height `h' = h / d` whose leaves are W-OTS+ public keys.
//! The W-OTS+ key at leaf `leaf` of tree `tree` in layer 0 signs the FORS public key; the key
//! selected in layer `i` signs the root of the layer `i - 1` tree, and the single tree of
//! layer `d - 1` has the scheme public root as its root.
//!
//! The `h`-bit leaf coordinate `(tree, leaf)` derived from `H_msg` is consumed `h'` bits per
//! layer: layer 0 uses `leaf` (`h'` bits) within tree `tree` (`h - h'` bits), and each next
//! layer takes the low `h'` bits of the current tree index as its leaf and the remaining high
//! bits as its tree. After `d` layers the tree index is exhausted and the top layer has a
//! single tree, index 0.

use crate::adrs::Adrs;
use crate::adrs::AdrsType::Tree;
use crate::merkle::{build_root, root_from_path, treehash};
use crate::params::ParameterSet;
use crate::utils::low_bits_mask;
use crate::wots_plus::WotsPlus;
use rayon::prelude::*;
use std::marker::PhantomData;
use subtle::ConstantTimeEq;

/// Position of the W-OTS+ key used in one hypertree layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerCoordinate {
    pub layer: u32,
    /// Index of the tree within the layer, at most `h - (layer + 1) h'` bits.
    pub tree: u64,
    /// Index of the leaf within the tree, `h'` bits.
    pub leaf: u32,
}

#[derive(Clone, Debug)]
pub struct Hypertree<'a, P: ParameterSet> {
    hasher: &'a P::Hasher,
    _params: PhantomData<P>,
}

impl<'a, P: ParameterSet> Hypertree<'a, P> {
    pub fn new(hasher: &'a P::Hasher) -> Self {
        Self {
            hasher,
            _params: PhantomData,
        }
    }

    /// Splits the bottom-layer coordinate into the coordinate of every layer, bottom first.
    pub fn layer_coordinates(tree: u64, leaf: u32) -> Vec<LayerCoordinate> {
        let mut coordinates = Vec::with_capacity(P::D);
        let mut tree = tree;
        let mut leaf = leaf;
        for layer in 0..P::D {
            coordinates.push(LayerCoordinate {
                layer: layer as u32,
                tree,
                leaf,
            });
            leaf = (tree & low_bits_mask(P::TREE_HEIGHT)) as u32;
            tree = tree.checked_shr(P::TREE_HEIGHT as u32).unwrap_or(0);
        }
        coordinates
    }

    fn key_adrs(layer: u32, tree: u64, keypair: u32) -> Adrs {
        Adrs::new(layer, tree).with_keypair(keypair)
    }

    fn tree_adrs(layer: u32, tree: u64) -> Adrs {
        Adrs::new(layer, tree).with_type(Tree)
    }

    /// Computes the root of tree `tree` in layer `layer` and the authentication path of
    /// leaf `leaf`.
    fn layer_tree(&self, sk_seed: &[u8], coordinate: &LayerCoordinate) -> (Vec<u8>, Vec<u8>) {
        let wots = WotsPlus::<P>::new(self.hasher);
        let LayerCoordinate { layer, tree, leaf } = *coordinate;
        treehash(
            self.hasher,
            &Self::tree_adrs(layer, tree),
            leaf,
            0,
            P::TREE_HEIGHT,
            |idx| wots.gen_pk(sk_seed, &Self::key_adrs(layer, tree, idx)),
        )
    }

    /// Computes the root of the single tree of the top layer, i.e. the public root.
    pub fn build_top_root(&self, sk_seed: &[u8]) -> Vec<u8> {
        let wots = WotsPlus::<P>::new(self.hasher);
        let layer = (P::D - 1) as u32;
        build_root(
            self.hasher,
            &Self::tree_adrs(layer, 0),
            0,
            P::TREE_HEIGHT,
            |idx| wots.gen_pk(sk_seed, &Self::key_adrs(layer, 0, idx)),
        )
    }

    /// Signs `message` (the `n`-byte FORS public key) from the bottom-layer key at
    /// `(tree, leaf)`.
    ///
    /// The trees of all layers are computed in parallel, then each layer signs the root of
    /// the layer below it.
    ///
    /// # Returns
    ///
    /// The `d * (WOTS_BYTES + h' * n)`-byte signature: for each layer, bottom first, the
    /// W-OTS+ signature followed by the authentication path.
    pub fn sign(&self, message: &[u8], sk_seed: &[u8], tree: u64, leaf: u32) -> Vec<u8> {
        let coordinates = Self::layer_coordinates(tree, leaf);
        let trees: Vec<(Vec<u8>, Vec<u8>)> = coordinates
            .par_iter()
            .map(|coordinate| self.layer_tree(sk_seed, coordinate))
            .collect();

        let wots = WotsPlus::<P>::new(self.hasher);
        let mut sig = Vec::with_capacity(P::D * (P::WOTS_BYTES + P::TREE_HEIGHT * P::N));
        let mut signed: &[u8] = message;
        for (coordinate, (root, auth_path)) in coordinates.iter().zip(trees.iter()) {
            let key_adrs = Self::key_adrs(coordinate.layer, coordinate.tree, coordinate.leaf);
            sig.extend_from_slice(&wots.sign(signed, sk_seed, &key_adrs));
            sig.extend_from_slice(auth_path);
            signed = root.as_slice();
        }
        sig
    }

    /// Recomputes the top root from a hypertree signature over `message`.
    pub fn root_from_sig(&self, message: &[u8], sig: &[u8], tree: u64, leaf: u32) -> Vec<u8> {
        let wots = WotsPlus::<P>::new(self.hasher);
        let layer_bytes = P::WOTS_BYTES + P::TREE_HEIGHT * P::N;

        let mut node = message[..P::N].to_vec();
        for (coordinate, layer_sig) in Self::layer_coordinates(tree, leaf)
            .iter()
            .zip(sig.chunks(layer_bytes))
        {
            let (wots_sig, auth_path) = layer_sig.split_at(P::WOTS_BYTES);
            let key_adrs = Self::key_adrs(coordinate.layer, coordinate.tree, coordinate.leaf);
            let wots_pk = wots.pk_from_sig(wots_sig, &node, &key_adrs);
            node = root_from_path(
                self.hasher,
                &wots_pk,
                coordinate.leaf,
                0,
                auth_path,
                P::TREE_HEIGHT,
                &Self::tree_adrs(coordinate.layer, coordinate.tree),
            );
        }
        node
    }

    /// Checks a hypertree signature against the public root in constant time.
    pub fn verify(
        &self,
        message: &[u8],
        sig: &[u8],
        tree: u64,
        leaf: u32,
        pub_root: &[u8],
    ) -> bool {
        self.root_from_sig(message, sig, tree, leaf)
            .ct_eq(pub_root)
            .into()
    }
}
