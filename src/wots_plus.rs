//! # Winternitz One-Time Signature Scheme Plus (W-OTS+)
//!
//! This module implements the W-OTS+ scheme as defined by SPHINCS+. A W-OTS+ key signs a
//! single `n`-byte digest using `len = len1 + len2` hash chains of length `w - 1`: `len1`
//! chains carry the base-`w` digits of the digest and `len2` chains carry a checksum over
//! those digits, so that advancing any chain of the signature forces another one backwards.
//!
//! W-OTS+ keys are never stored. Each chain start is derived on demand with
//! `PRF(PK.seed, SK.seed, ADRS)` from the secret seed and the address of the chain, and all
//! chain and compression hashes are tweaked by their [`Adrs`]. A key is therefore fully named
//! by the address of its key pair: hypertree layer, tree within that layer and leaf index
//! (`keypair`).
//!
//! ## Important Note
//!
//! This W-OTS+ implementation is provided to be used inside the hypertree, where every key
//! signs exactly one tree root. It is not suggested to be used as a standalone signature
//! scheme.

use crate::adrs::Adrs;
use crate::adrs::AdrsType::{WotsHash, WotsPk, WotsPrf};
use crate::hash::SpxHasher;
use crate::params::ParameterSet;
use std::marker::PhantomData;
use zeroize::Zeroizing;

/// Encapsulates the W-OTS+ operations over a hasher bound to one public seed.
#[derive(Clone, Debug)]
pub struct WotsPlus<'a, P: ParameterSet> {
    hasher: &'a P::Hasher,
    _params: PhantomData<P>,
}

impl<'a, P: ParameterSet> WotsPlus<'a, P> {
    /// Creates a new `WotsPlus` instance over the given hasher.
    ///
    /// The hasher carries the public seed, which keys every chain and compression hash of
    /// the scheme.
    pub fn new(hasher: &'a P::Hasher) -> Self {
        Self {
            hasher,
            _params: PhantomData,
        }
    }

    /// Computes the chaining function.
    ///
    /// Interprets `input` as the `start`-th value of the chain and applies `F` for `steps`
    /// iterations, setting the hash address of `adrs` to the position of each step. The
    /// chain never runs past position `w - 1`, and `steps == 0` returns `input` unchanged.
    ///
    /// # Arguments
    ///
    /// * `input` - The `n`-byte chain value at position `start`.
    /// * `start` - Position of `input` in the chain.
    /// * `steps` - Number of `F` applications.
    /// * `adrs` - The address of the chain, i.e. layer, tree, key pair and chain index.
    ///
    /// # Returns
    ///
    /// The `n`-byte chain value at position `min(start + steps, w - 1)`.
    pub fn chain(&self, input: &[u8], start: usize, steps: usize, adrs: &Adrs) -> Vec<u8> {
        let n = P::N;
        let mut current = input[..n].to_vec();
        let mut next = vec![0u8; n];

        let end = (start + steps).min(P::WOTS_W - 1);
        for i in start..end {
            let step_adrs = adrs.with_hash(i as u32);
            self.hasher.f(&mut next, &current, &step_adrs);
            std::mem::swap(&mut current, &mut next);
        }
        current
    }

    /// Derives the chain lengths for an `n`-byte message: `len1` base-`w` digits of the
    /// message followed by `len2` base-`w` digits of its checksum.
    pub fn chain_lengths(message: &[u8]) -> Vec<u32> {
        let mut lengths = vec![0_u32; P::WOTS_LEN];
        Self::base_w(&mut lengths[..P::WOTS_LEN1], message);
        let (msg_digits, csum_digits) = lengths.split_at_mut(P::WOTS_LEN1);
        Self::checksum(csum_digits, msg_digits);
        lengths
    }

    /// Converts bytes into integers in base `w`, most significant digit first, filling all
    /// of `output`.
    fn base_w(output: &mut [u32], input: &[u8]) {
        let mask = (P::WOTS_W - 1) as u32;
        let mut bits = 0;
        let mut total: u32 = 0;
        let mut input_index = 0;

        for out in output.iter_mut() {
            if bits == 0 {
                total = input[input_index] as u32;
                input_index += 1;
                bits += 8;
            }
            bits -= P::WOTS_LOGW;
            *out = (total >> bits) & mask;
        }
    }

    /// Computes the W-OTS+ checksum `sum(w - 1 - d)` over the message digits and writes its
    /// `len2` base-`w` digits.
    fn checksum(csum_base_w: &mut [u32], msg_base_w: &[u32]) {
        let w = P::WOTS_W as u64;
        let mut csum: u64 = msg_base_w.iter().map(|&d| w - 1 - d as u64).sum();

        // Align so that the unused bits of the last byte are the least significant ones.
        let csum_bits = P::WOTS_LEN2 * P::WOTS_LOGW;
        csum <<= (8 - csum_bits % 8) % 8;

        let csum_bytes = csum.to_be_bytes();
        let csum_len = (csum_bits + 7) / 8;
        Self::base_w(csum_base_w, &csum_bytes[8 - csum_len..]);
    }

    fn chain_adrs(key_adrs: &Adrs, chain: usize) -> Adrs {
        key_adrs
            .with_type(WotsHash)
            .with_keypair(key_adrs.keypair())
            .with_chain(chain as u32)
    }

    /// Derives the secret start of chain `chain` with `PRF(PK.seed, SK.seed, ADRS)`.
    fn chain_start(&self, sk_seed: &[u8], key_adrs: &Adrs, chain: usize) -> Zeroizing<Vec<u8>> {
        let prf_adrs = key_adrs
            .with_type(WotsPrf)
            .with_keypair(key_adrs.keypair())
            .with_chain(chain as u32);
        let mut start = Zeroizing::new(vec![0u8; P::N]);
        self.hasher.prf_addr(&mut start, sk_seed, &prf_adrs);
        start
    }

    /// Compresses the `len` chain ends into the `n`-byte public key under a `WotsPk`
    /// address.
    fn compress(&self, chain_ends: &[u8], key_adrs: &Adrs) -> Vec<u8> {
        let pk_adrs = key_adrs
            .with_type(WotsPk)
            .with_keypair(key_adrs.keypair());
        let mut pk = vec![0u8; P::N];
        self.hasher.thash(&mut pk, chain_ends, &pk_adrs);
        pk
    }

    /// Regenerates the secret starts of all `len` chains of the key at `key_adrs`.
    ///
    /// # Returns
    ///
    /// The `len * n` secret bytes, wiped when dropped.
    pub fn gen_leaf_chains(&self, sk_seed: &[u8], key_adrs: &Adrs) -> Zeroizing<Vec<u8>> {
        let mut chains = Zeroizing::new(Vec::with_capacity(P::WOTS_BYTES));
        for i in 0..P::WOTS_LEN {
            chains.extend_from_slice(&self.chain_start(sk_seed, key_adrs, i));
        }
        chains
    }

    /// Generates the compressed W-OTS+ public key of the key pair at `key_adrs`.
    ///
    /// Every chain is run to its end `w - 1` and the ends are compressed with `T_len`. The
    /// result is the leaf value of the hypertree tree the key belongs to.
    ///
    /// # Arguments
    ///
    /// * `sk_seed` - The `n`-byte secret seed.
    /// * `key_adrs` - The address naming the key pair: layer, tree and key pair index.
    ///
    /// # Returns
    ///
    /// The `n`-byte public key.
    pub fn gen_pk(&self, sk_seed: &[u8], key_adrs: &Adrs) -> Vec<u8> {
        let chains = self.gen_leaf_chains(sk_seed, key_adrs);
        let mut ends = Vec::with_capacity(P::WOTS_BYTES);
        for (i, start) in chains.chunks(P::N).enumerate() {
            let chain_adrs = Self::chain_adrs(key_adrs, i);
            ends.extend_from_slice(&self.chain(start, 0, P::WOTS_W - 1, &chain_adrs));
        }
        self.compress(&ends, key_adrs)
    }

    /// Signs an `n`-byte message with the key pair at `key_adrs`.
    ///
    /// Each chain is run from its secret start for as many steps as its digit, and the
    /// intermediate values are emitted.
    ///
    /// # Returns
    ///
    /// The `len * n`-byte signature.
    pub fn sign(&self, message: &[u8], sk_seed: &[u8], key_adrs: &Adrs) -> Vec<u8> {
        let lengths = Self::chain_lengths(message);
        let mut sig = Vec::with_capacity(P::WOTS_BYTES);
        for (i, &steps) in lengths.iter().enumerate() {
            let start = self.chain_start(sk_seed, key_adrs, i);
            let chain_adrs = Self::chain_adrs(key_adrs, i);
            let value = Zeroizing::new(self.chain(&start, 0, steps as usize, &chain_adrs));
            sig.extend_from_slice(&value);
        }
        sig
    }

    /// Computes the public key from a W-OTS+ signature and message.
    ///
    /// Each chain is continued from the signature value for the remaining `w - 1 - d`
    /// steps, which reaches the chain end a genuine signer would reach. The signature is
    /// valid iff the returned key equals the expected one.
    ///
    /// # Returns
    ///
    /// The `n`-byte computed public key.
    pub fn pk_from_sig(&self, signature: &[u8], message: &[u8], key_adrs: &Adrs) -> Vec<u8> {
        let lengths = Self::chain_lengths(message);
        let mut ends = Vec::with_capacity(P::WOTS_BYTES);
        for (i, (&digit, value)) in lengths.iter().zip(signature.chunks(P::N)).enumerate() {
            let digit = digit as usize;
            let chain_adrs = Self::chain_adrs(key_adrs, i);
            ends.extend_from_slice(&self.chain(value, digit, P::WOTS_W - 1 - digit, &chain_adrs));
        }
        self.compress(&ends, key_adrs)
    }
}

#[cfg(all(test, feature = "shake"))]
mod tests {
    use super::*;
    use crate::hash::shake::Shake256Hasher;
    use crate::params::ShakeToy;
    use proptest::prelude::*;
    use rand::prelude::*;
    use rand::rngs::OsRng;

    type Wots<'a> = WotsPlus<'a, ShakeToy>;

    #[test]
    fn test_wots_plus() {
        let mut pub_seed = [0; 16];
        let mut sk_seed = [0; 16];
        OsRng.fill_bytes(&mut pub_seed);
        OsRng.fill_bytes(&mut sk_seed);

        let hasher = Shake256Hasher::new(&pub_seed);
        let wp = Wots::new(&hasher);
        let key_adrs = Adrs::new(1, 5).with_keypair(3);

        let pk = wp.gen_pk(&sk_seed, &key_adrs);

        let mut message = [0u8; 16];
        OsRng.fill_bytes(&mut message);

        let signature = wp.sign(&message, &sk_seed, &key_adrs);
        assert_eq!(signature.len(), ShakeToy::WOTS_BYTES);
        assert_eq!(wp.pk_from_sig(&signature, &message, &key_adrs), pk);

        let mut fake_signature = signature.clone();
        fake_signature[0] ^= 1;
        assert_ne!(wp.pk_from_sig(&fake_signature, &message, &key_adrs), pk);

        let mut fake_message = message;
        fake_message[15] ^= 0x80;
        assert_ne!(wp.pk_from_sig(&signature, &fake_message, &key_adrs), pk);

        let other_key = key_adrs.with_keypair(4);
        assert_ne!(wp.gen_pk(&sk_seed, &other_key), pk);

        println!("WOTS+ keygen, signing, and verify tests passed.");
    }

    #[test]
    fn test_chain_composes() {
        let hasher = Shake256Hasher::new(&[2u8; 16]);
        let wp = Wots::new(&hasher);
        let adrs = Adrs::new(0, 0).with_keypair(1).with_chain(2);
        let input = [7u8; 16];

        assert_eq!(wp.chain(&input, 0, 0, &adrs), input.to_vec());

        let full = wp.chain(&input, 0, 15, &adrs);
        let half = wp.chain(&input, 0, 6, &adrs);
        assert_eq!(wp.chain(&half, 6, 9, &adrs), full);
        // steps beyond the chain end are cut at w - 1
        assert_eq!(wp.chain(&input, 0, 40, &adrs), full);
    }

    #[test]
    fn test_chain_lengths_extremes() {
        let zeros = Wots::chain_lengths(&[0u8; 16]);
        assert!(zeros[..32].iter().all(|&d| d == 0));
        // checksum 32 * 15 = 480 = 0x1e0, shifted by 4 bits to 0x1e00: digits 1, 14, 0
        assert_eq!(&zeros[32..], &[1, 14, 0]);

        let ones = Wots::chain_lengths(&[0xffu8; 16]);
        assert!(ones[..32].iter().all(|&d| d == 15));
        assert_eq!(&ones[32..], &[0, 0, 0]);

        let mixed = Wots::chain_lengths(&[0x1fu8; 16]);
        assert_eq!(&mixed[..4], &[1, 15, 1, 15]);
    }

    #[test]
    fn test_gen_leaf_chains_are_distinct() {
        let hasher = Shake256Hasher::new(&[1u8; 16]);
        let wp = Wots::new(&hasher);
        let chains = wp.gen_leaf_chains(&[9u8; 16], &Adrs::new(0, 0));
        assert_eq!(chains.len(), ShakeToy::WOTS_BYTES);
        let first = &chains[..16];
        assert!(chains.chunks(16).skip(1).all(|c| c != first));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_pk_from_sig_recovers_pk(
            message in prop::array::uniform16(any::<u8>()),
            sk_seed in prop::array::uniform16(any::<u8>()),
            layer in 0u32..2,
            tree in 0u64..8,
            keypair in 0u32..8,
        ) {
            let hasher = Shake256Hasher::new(&[0x42u8; 16]);
            let wp = Wots::new(&hasher);
            let key_adrs = Adrs::new(layer, tree).with_keypair(keypair);
            let signature = wp.sign(&message, &sk_seed, &key_adrs);
            prop_assert_eq!(
                wp.pk_from_sig(&signature, &message, &key_adrs),
                wp.gen_pk(&sk_seed, &key_adrs)
            );
        }
    }
}
