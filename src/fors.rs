//! # Forest Of Random Subsets (FORS)
//!
//! FORS signs the `k * a`-bit message digest produced by `H_msg`. The digest is cut into `k`
//! indices of `a` bits; index `i` selects one of the `2^a` secret leaves of tree `i`. A
//! signature reveals each selected secret leaf together with its authentication path, and the
//! FORS public key is the compression of the `k` tree roots.
//!
//! All `k` trees of one FORS instance share a single address (hypertree tree and leaf, i.e.
//! the key pair the bottom hypertree layer will sign with) and are laid out side by side in
//! one index space: tree `i` covers leaf indices `i * 2^a .. (i + 1) * 2^a`, so no two leaves
//! of different trees are ever hashed under the same address.
//!
//! The trees are independent and are built in parallel.

use crate::adrs::Adrs;
use crate::adrs::AdrsType::{ForsPrf, ForsRoots, ForsTree};
use crate::hash::SpxHasher;
use crate::merkle::{root_from_path, treehash};
use crate::params::ParameterSet;
use rayon::prelude::*;
use std::marker::PhantomData;
use zeroize::Zeroizing;

#[derive(Clone, Debug)]
pub struct Fors<'a, P: ParameterSet> {
    hasher: &'a P::Hasher,
    _params: PhantomData<P>,
}

impl<'a, P: ParameterSet> Fors<'a, P> {
    pub fn new(hasher: &'a P::Hasher) -> Self {
        Self {
            hasher,
            _params: PhantomData,
        }
    }

    /// Interprets the first `k * a` bits of `m` as `k` integers of `a` bits each.
    ///
    /// Bits are consumed least significant first within each byte and the first consumed
    /// bit of an index is its least significant one.
    pub fn message_to_indices(m: &[u8]) -> Vec<u32> {
        let mut offset = 0;
        let mut indices = vec![0_u32; P::FORS_TREES];
        for index in indices.iter_mut() {
            for j in 0..P::FORS_HEIGHT {
                *index ^= (((m[offset >> 3] >> (offset & 0x7)) & 0x1) as u32) << j;
                offset += 1;
            }
        }
        indices
    }

    fn tree_adrs(fors_adrs: &Adrs) -> Adrs {
        fors_adrs
            .with_type(ForsTree)
            .with_keypair(fors_adrs.keypair())
    }

    /// Derives the secret leaf at absolute index `idx`.
    fn gen_sk(&self, sk_seed: &[u8], fors_adrs: &Adrs, idx: u32) -> Zeroizing<Vec<u8>> {
        let prf_adrs = fors_adrs
            .with_type(ForsPrf)
            .with_keypair(fors_adrs.keypair())
            .with_tree_index(idx);
        let mut sk = Zeroizing::new(vec![0u8; P::N]);
        self.hasher.prf_addr(&mut sk, sk_seed, &prf_adrs);
        sk
    }

    /// Hashes the secret leaf at absolute index `idx` into the leaf node.
    fn sk_to_leaf(&self, sk: &[u8], fors_adrs: &Adrs, idx: u32) -> Vec<u8> {
        let leaf_adrs = Self::tree_adrs(fors_adrs).with_tree_index(idx);
        let mut leaf = vec![0u8; P::N];
        self.hasher.f(&mut leaf, sk, &leaf_adrs);
        leaf
    }

    fn compress_roots(&self, roots: &[u8], fors_adrs: &Adrs) -> Vec<u8> {
        let roots_adrs = fors_adrs
            .with_type(ForsRoots)
            .with_keypair(fors_adrs.keypair());
        let mut pk = vec![0u8; P::N];
        self.hasher.thash(&mut pk, roots, &roots_adrs);
        pk
    }

    /// Signs the FORS message digest `m` (at least `FORS_MSG_BYTES` bytes).
    ///
    /// # Arguments
    ///
    /// * `m` - The message digest.
    /// * `sk_seed` - The `n`-byte secret seed.
    /// * `fors_adrs` - Address with layer 0, the hypertree tree and the key pair (leaf) set.
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// * `Vec<u8>` - The `FORS_BYTES` signature: for each tree, the revealed secret leaf
    ///   followed by its authentication path.
    /// * `Vec<u8>` - The `n`-byte FORS public key, as the verifier will recompute it.
    pub fn sign(&self, m: &[u8], sk_seed: &[u8], fors_adrs: &Adrs) -> (Vec<u8>, Vec<u8>) {
        let indices = Self::message_to_indices(m);
        let tree_adrs = Self::tree_adrs(fors_adrs);

        let trees: Vec<(Zeroizing<Vec<u8>>, Vec<u8>, Vec<u8>)> = indices
            .par_iter()
            .enumerate()
            .map(|(i, &leaf_idx)| {
                let idx_offset = (i << P::FORS_HEIGHT) as u32;
                let sk = self.gen_sk(sk_seed, fors_adrs, leaf_idx + idx_offset);
                let (root, auth_path) = treehash(
                    self.hasher,
                    &tree_adrs,
                    leaf_idx,
                    idx_offset,
                    P::FORS_HEIGHT,
                    |idx| {
                        let leaf_sk = self.gen_sk(sk_seed, fors_adrs, idx);
                        self.sk_to_leaf(&leaf_sk, fors_adrs, idx)
                    },
                );
                (sk, auth_path, root)
            })
            .collect();

        let mut sig = Vec::with_capacity(P::FORS_BYTES);
        let mut roots = Vec::with_capacity(P::FORS_TREES * P::N);
        for (sk, auth_path, root) in &trees {
            sig.extend_from_slice(sk);
            sig.extend_from_slice(auth_path);
            roots.extend_from_slice(root);
        }

        (sig, self.compress_roots(&roots, fors_adrs))
    }

    /// Derives the FORS public key from a signature and the message digest `m`.
    pub fn pk_from_sig(&self, sig: &[u8], m: &[u8], fors_adrs: &Adrs) -> Vec<u8> {
        let indices = Self::message_to_indices(m);
        let tree_adrs = Self::tree_adrs(fors_adrs);
        let tree_bytes = (P::FORS_HEIGHT + 1) * P::N;

        let mut roots = Vec::with_capacity(P::FORS_TREES * P::N);
        for (i, (&leaf_idx, tree_sig)) in indices.iter().zip(sig.chunks(tree_bytes)).enumerate() {
            let idx_offset = (i << P::FORS_HEIGHT) as u32;
            let (sk, auth_path) = tree_sig.split_at(P::N);
            let leaf = self.sk_to_leaf(sk, fors_adrs, leaf_idx + idx_offset);
            roots.extend_from_slice(&root_from_path(
                self.hasher,
                &leaf,
                leaf_idx,
                idx_offset,
                auth_path,
                P::FORS_HEIGHT,
                &tree_adrs,
            ));
        }

        self.compress_roots(&roots, fors_adrs)
    }
}
