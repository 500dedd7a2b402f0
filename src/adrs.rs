//! # Hash addresses
//!
//! Every tweakable hash call of SPHINCS+ is domain separated by an address `ADRS` naming the
//! logical position of the call: which hypertree layer, which tree in that layer, what kind of
//! hash it is, and where inside a WOTS+ key or a tree it happens.
//!
//! [`Adrs`] is an immutable value. Each `with_*` builder returns a new address with a single
//! field changed, so an address can be handed to parallel workers or reused out of order
//! without aliasing.

use crate::utils::{set_u32_at, set_u64_at};

/// Byte length of the full address fed to SHAKE.
pub const ADRS_BYTES: usize = 32;

/// Byte length of the compressed address fed to SHA2.
pub const ADRS_COMPRESSED_BYTES: usize = 22;

/// All 7 types of ADRS defined for WOTS+, FORS and the hypertree.
/// The corresponding value is set as the `type` word of an ADRS.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AdrsType {
    /// 0, used for hashing through a WOTS+ chain.
    #[default]
    WotsHash,
    /// 1, used for compression of the WOTS+ public key.
    WotsPk,
    /// 2, used for internal nodes of a hypertree layer.
    Tree,
    /// 3, used for leaves and internal nodes of a FORS tree.
    ForsTree,
    /// 4, used for compression of the FORS roots into the FORS public key.
    ForsRoots,
    /// 5, used for WOTS+ secret key generation (start of each chain).
    WotsPrf,
    /// 6, used for FORS secret leaf generation.
    ForsPrf,
}

/// The address of a single hash call.
///
/// The 32-byte encoding consists of:
/// * `layer address`: 4 bytes, the hypertree layer, 0 at the bottom,
/// * 4 zero bytes, then the `tree address`: 8 bytes, index of the tree within its layer,
/// * `type`: 4 bytes, set by [`AdrsType`],
/// * `key pair address`: 4 bytes, the WOTS+ key or FORS instance (leaf of the tree above),
/// * `chain address` or `tree height`: 4 bytes,
/// * `hash address` or `tree index`: 4 bytes.
///
/// All words are big-endian. The last two words are shared: WOTS+ addresses use them as
/// chain and hash position, tree addresses as node height and node index.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Adrs {
    layer: u32,
    tree: u64,
    adrs_type: AdrsType,
    keypair: u32,
    word2: u32,
    word3: u32,
}

impl From<AdrsType> for Adrs {
    fn from(adrs_type: AdrsType) -> Self {
        Self::default().with_type(adrs_type)
    }
}

impl Adrs {
    /// Returns the address of the tree `tree` in hypertree layer `layer`, with type
    /// [`AdrsType::WotsHash`] and all lower fields zero.
    pub fn new(layer: u32, tree: u64) -> Self {
        Self::default().with_layer(layer).with_tree(tree)
    }

    /// Specify which level of the hypertree (the "layer") we're working on.
    #[must_use]
    pub fn with_layer(self, layer: u32) -> Self {
        Self { layer, ..self }
    }

    /// Specify which tree within the layer (the "tree address") we're working on.
    #[must_use]
    pub fn with_tree(self, tree: u64) -> Self {
        Self { tree, ..self }
    }

    /// Specify what hash will be computed with this address. Changing the type clears the
    /// key pair, chain and hash words, so that the fields of one type never leak into another.
    #[must_use]
    pub fn with_type(self, adrs_type: AdrsType) -> Self {
        Self {
            adrs_type,
            keypair: 0,
            word2: 0,
            word3: 0,
            ..self
        }
    }

    /// Specify which leaf we're working on; that is, which WOTS+ key or FORS instance.
    #[must_use]
    pub fn with_keypair(self, keypair: u32) -> Self {
        Self { keypair, ..self }
    }

    /// Specify which WOTS+ chain within the key.
    #[must_use]
    pub fn with_chain(self, chain: u32) -> Self {
        Self {
            word2: chain,
            ..self
        }
    }

    /// Specify the position within a WOTS+ chain.
    #[must_use]
    pub fn with_hash(self, hash: u32) -> Self {
        Self {
            word3: hash,
            ..self
        }
    }

    /// Specify the height of the node being computed in a tree.
    #[must_use]
    pub fn with_tree_height(self, height: u32) -> Self {
        Self {
            word2: height,
            ..self
        }
    }

    /// Specify the horizontal index of the node being computed in a tree.
    #[must_use]
    pub fn with_tree_index(self, index: u32) -> Self {
        Self {
            word3: index,
            ..self
        }
    }

    pub fn layer(&self) -> u32 {
        self.layer
    }

    pub fn tree(&self) -> u64 {
        self.tree
    }

    pub fn adrs_type(&self) -> AdrsType {
        self.adrs_type
    }

    pub fn keypair(&self) -> u32 {
        self.keypair
    }

    /// The full 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; ADRS_BYTES] {
        let mut out = [0u8; ADRS_BYTES];
        set_u32_at(&mut out, self.layer, 0);
        set_u64_at(&mut out, self.tree, 8);
        set_u32_at(&mut out, self.adrs_type as u32, 16);
        set_u32_at(&mut out, self.keypair, 20);
        set_u32_at(&mut out, self.word2, 24);
        set_u32_at(&mut out, self.word3, 28);
        out
    }

    /// The 22-byte encoding used by the SHA2 instantiation: layer and type are shrunk to a
    /// single byte, and the padding before the tree address is dropped.
    pub fn to_compressed(&self) -> [u8; ADRS_COMPRESSED_BYTES] {
        let mut out = [0u8; ADRS_COMPRESSED_BYTES];
        out[0] = self.layer as u8;
        set_u64_at(&mut out, self.tree, 1);
        out[9] = self.adrs_type as u8;
        set_u32_at(&mut out, self.keypair, 10);
        set_u32_at(&mut out, self.word2, 14);
        set_u32_at(&mut out, self.word3, 18);
        out
    }
}
