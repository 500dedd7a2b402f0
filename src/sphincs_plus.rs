//! # SPHINCS+ stateless hash-based signatures
//!
//! This module ties W-OTS+, FORS and the hypertree together into the SPHINCS+ signature
//! scheme. The `SphincsPlus` struct is the main interface for generating keypairs, signing
//! messages, and verifying signatures. It is generic over a [`ParameterSet`], which selects
//! the hash functions and every size of the scheme at compile time.
//!
//! ## Overview
//!
//! * **Key generation** samples three `n`-byte seeds `SK.seed`, `SK.prf` and `PK.seed`, and
//!   computes `PK.root`, the root of the top hypertree tree. Key generation is a pure
//!   function of the three seeds.
//! * **Signing** derives the randomizer `R = PRF_msg(SK.prf, OptRand, M)`, hashes
//!   `H_msg(R, PK.seed, PK.root, M)` into the FORS message digest and the hypertree leaf
//!   coordinate `(tree, leaf)`, signs the digest with the FORS instance at that leaf, and
//!   signs the resulting FORS public key with the hypertree.
//! * **Verification** recomputes the digest and coordinate from `R`, recovers the FORS
//!   public key and then the hypertree root, and compares it with `PK.root` in constant time.
//!
//! ## Byte layouts
//!
//! * Secret key: `SK.seed || SK.prf || PK.seed || PK.root`.
//! * Public key: `PK.seed || PK.root`.
//! * Signature: `R || FORS signature || hypertree signature`.
//!
//! ## Usage Example
//!
//! ```rust
//! use sphincs_hb::params::ShakeToy;
//! use sphincs_hb::sphincs_plus::SphincsPlus;
//!
//! let sphincs = SphincsPlus::<ShakeToy>::new();
//! let (public_key, secret_key) = sphincs.keygen().expect("Key generation failed");
//!
//! let message = b"SPHINCS+ post-quantum signature message";
//! let signature = sphincs.sign(message, &secret_key).expect("Signing failed");
//!
//! assert!(sphincs.verify(&signature, message, &public_key).is_ok());
//! ```
//!
//! ## Security Considerations
//!
//! - **Sensitive Data Handling**: keys and signatures are wiped from memory when dropped, and
//!   transient secret chain values are held in zeroizing buffers.
//! - **Cloning Sensitivity**: cloning a secret key duplicates sensitive information in memory.
//! - **No oracle**: a failed verification reports [`Error::VerificationFailed`] only, never
//!   which stage diverged.

use crate::adrs::Adrs;
use crate::error::{Error, Result};
use crate::fors::Fors;
use crate::hash::SpxHasher;
use crate::hypertree::Hypertree;
use crate::params::ParameterSet;
use crate::utils::{bytes_to_u64, low_bits_mask, sized_bytes_struct};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::marker::PhantomData;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

sized_bytes_struct!(
    /// `SphincsPlusPublicKey` holds a SPHINCS+ public key `PK.seed || PK.root`.
    SphincsPlusPublicKey,
    PK_BYTES
);

sized_bytes_struct!(
    /// `SphincsPlusSecretKey` holds a SPHINCS+ secret key
    /// `SK.seed || SK.prf || PK.seed || PK.root`.
    SphincsPlusSecretKey,
    SK_BYTES
);

sized_bytes_struct!(
    /// `SphincsPlusSignature` holds a SPHINCS+ signature `R || FORS || HT`.
    SphincsPlusSignature,
    BYTES
);

impl<P: ParameterSet> SphincsPlusPublicKey<P> {
    pub fn pub_seed(&self) -> &[u8] {
        &self.bytes[..P::N]
    }

    pub fn pub_root(&self) -> &[u8] {
        &self.bytes[P::N..]
    }
}

impl<P: ParameterSet> SphincsPlusSecretKey<P> {
    pub fn sk_seed(&self) -> &[u8] {
        &self.bytes[..P::N]
    }

    pub fn sk_prf(&self) -> &[u8] {
        &self.bytes[P::N..2 * P::N]
    }

    pub fn pub_seed(&self) -> &[u8] {
        &self.bytes[2 * P::N..3 * P::N]
    }

    pub fn pub_root(&self) -> &[u8] {
        &self.bytes[3 * P::N..]
    }

    /// The public key embedded in the secret key.
    pub fn public_key(&self) -> SphincsPlusPublicKey<P> {
        SphincsPlusPublicKey::from_vec(self.bytes[2 * P::N..].to_vec())
    }
}

impl<P: ParameterSet> SphincsPlusSignature<P> {
    /// The randomizer `R`.
    pub fn randomizer(&self) -> &[u8] {
        &self.bytes[..P::N]
    }

    pub fn fors_signature(&self) -> &[u8] {
        &self.bytes[P::N..P::N + P::FORS_BYTES]
    }

    pub fn hypertree_signature(&self) -> &[u8] {
        &self.bytes[P::N + P::FORS_BYTES..]
    }
}

/// `SphincsPlus` provides key generation, signing and verification for the parameter set
/// `P`. It holds no state; all methods are pure functions of their inputs and the
/// randomness they draw, so a single instance may be shared across threads.
#[derive(Copy, Clone, Debug, Default)]
pub struct SphincsPlus<P: ParameterSet>(PhantomData<P>);

impl<P: ParameterSet> SphincsPlus<P> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    /// Splits the `H_msg` output into the FORS message digest and the hypertree leaf
    /// coordinate.
    ///
    /// The tree index is read big-endian from `TREE_BYTES` bytes and reduced to its
    /// `TREE_BITS` low bits; the leaf index likewise from `LEAF_BYTES` bytes to `LEAF_BITS`
    /// bits.
    fn split_digest(digest: &[u8]) -> (&[u8], u64, u32) {
        let (md, rest) = digest.split_at(P::FORS_MSG_BYTES);
        let (tree_bytes, leaf_bytes) = rest.split_at(P::TREE_BYTES);
        let tree = bytes_to_u64(tree_bytes) & low_bits_mask(P::TREE_BITS);
        let leaf = bytes_to_u64(&leaf_bytes[..P::LEAF_BYTES]) & low_bits_mask(P::LEAF_BITS);
        (md, tree, leaf as u32)
    }

    /// Generate (pk, sk) keypair from a `3n`-byte seed `SK.seed || SK.prf || PK.seed`.
    ///
    /// Returns `Err(Error::BadLength)` if the seed is not `SEED_BYTES` long.
    pub fn keygen_from_seed(
        &self,
        seed: &[u8],
    ) -> Result<(SphincsPlusPublicKey<P>, SphincsPlusSecretKey<P>)> {
        let () = P::ASSERT_VALID;
        if seed.len() != P::SEED_BYTES {
            return Err(Error::BadLength(P::SEED_BYTES, seed.len()));
        }
        let n = P::N;
        let sk_seed = &seed[..n];
        let pub_seed = &seed[2 * n..];

        let hasher = P::Hasher::new(pub_seed);
        let pub_root = Hypertree::<P>::new(&hasher).build_top_root(sk_seed);

        let mut sk = Vec::with_capacity(P::SK_BYTES);
        sk.extend_from_slice(seed);
        sk.extend_from_slice(&pub_root);
        let mut pk = Vec::with_capacity(P::PK_BYTES);
        pk.extend_from_slice(pub_seed);
        pk.extend_from_slice(&pub_root);

        debug!(params = P::NAME, "generated SPHINCS+ keypair");
        Ok((
            SphincsPlusPublicKey::from_vec(pk),
            SphincsPlusSecretKey::from_vec(sk),
        ))
    }

    /// Generate (pk, sk) keypair drawing the seeds from `rng`.
    ///
    /// A failing randomness source is reported as `Err(Error::RandomnessFailure)` and no key
    /// is produced.
    pub fn keygen_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(SphincsPlusPublicKey<P>, SphincsPlusSecretKey<P>)> {
        let mut seed = Zeroizing::new(vec![0u8; P::SEED_BYTES]);
        rng.try_fill_bytes(&mut seed)?;
        self.keygen_from_seed(&seed)
    }

    /// Generate (pk, sk) keypair of SPHINCS+ using the operating system randomness.
    pub fn keygen(&self) -> Result<(SphincsPlusPublicKey<P>, SphincsPlusSecretKey<P>)> {
        self.keygen_with_rng(&mut OsRng)
    }

    /// Calculate the SPHINCS+ signature of `message` with the given `n`-byte `OptRand`.
    ///
    /// All other signing methods funnel into this one; the signature is a deterministic
    /// function of `(message, sk, opt_rand)`.
    pub fn sign_with_opt_rand(
        &self,
        message: &[u8],
        sk: &SphincsPlusSecretKey<P>,
        opt_rand: &[u8],
    ) -> Result<SphincsPlusSignature<P>> {
        let () = P::ASSERT_VALID;
        if opt_rand.len() != P::N {
            return Err(Error::BadLength(P::N, opt_rand.len()));
        }
        let sk_seed = sk.sk_seed();
        let hasher = P::Hasher::new(sk.pub_seed());

        let mut r = vec![0u8; P::N];
        hasher.prf_msg(&mut r, sk.sk_prf(), opt_rand, message);

        let mut digest = vec![0u8; P::DGST_BYTES];
        hasher.h_msg(&mut digest, &r, sk.pub_root(), message);
        let (md, tree, leaf) = Self::split_digest(&digest);
        debug!(params = P::NAME, tree, leaf, "signing message");

        let fors_adrs = Adrs::new(0, tree).with_keypair(leaf);
        let (fors_sig, fors_pk) = Fors::<P>::new(&hasher).sign(md, sk_seed, &fors_adrs);
        let ht_sig = Hypertree::<P>::new(&hasher).sign(&fors_pk, sk_seed, tree, leaf);

        let mut sig = Vec::with_capacity(P::BYTES);
        sig.extend_from_slice(&r);
        sig.extend_from_slice(&fors_sig);
        sig.extend_from_slice(&ht_sig);
        Ok(SphincsPlusSignature::from_vec(sig))
    }

    /// Calculate the randomized SPHINCS+ signature, drawing `OptRand` from `rng`.
    pub fn sign_with_rng<R: RngCore + CryptoRng>(
        &self,
        message: &[u8],
        sk: &SphincsPlusSecretKey<P>,
        rng: &mut R,
    ) -> Result<SphincsPlusSignature<P>> {
        let mut opt_rand = vec![0u8; P::N];
        rng.try_fill_bytes(&mut opt_rand)?;
        self.sign_with_opt_rand(message, sk, &opt_rand)
    }

    /// Calculate the randomized SPHINCS+ signature for the given message and secret-key.
    pub fn sign(
        &self,
        message: &[u8],
        sk: &SphincsPlusSecretKey<P>,
    ) -> Result<SphincsPlusSignature<P>> {
        self.sign_with_rng(message, sk, &mut OsRng)
    }

    /// Calculate the deterministic SPHINCS+ signature, using `PK.seed` as `OptRand`.
    pub fn sign_deterministic(
        &self,
        message: &[u8],
        sk: &SphincsPlusSecretKey<P>,
    ) -> Result<SphincsPlusSignature<P>> {
        self.sign_with_opt_rand(message, sk, sk.pub_seed())
    }

    /// Verify the SPHINCS+ signature of `message` under the public key `pk`.
    ///
    /// It returns `Err(Error::VerificationFailed)` if the signature is invalid, without
    /// telling which part of the signature failed. Otherwise, it returns `Ok(())`.
    pub fn verify(
        &self,
        signature: &SphincsPlusSignature<P>,
        message: &[u8],
        pk: &SphincsPlusPublicKey<P>,
    ) -> Result<()> {
        let () = P::ASSERT_VALID;
        let hasher = P::Hasher::new(pk.pub_seed());

        let mut digest = vec![0u8; P::DGST_BYTES];
        hasher.h_msg(&mut digest, signature.randomizer(), pk.pub_root(), message);
        let (md, tree, leaf) = Self::split_digest(&digest);
        debug!(params = P::NAME, tree, leaf, "verifying signature");

        let fors_adrs = Adrs::new(0, tree).with_keypair(leaf);
        let fors_pk =
            Fors::<P>::new(&hasher).pk_from_sig(signature.fors_signature(), md, &fors_adrs);
        let root = Hypertree::<P>::new(&hasher).root_from_sig(
            &fors_pk,
            signature.hypertree_signature(),
            tree,
            leaf,
        );

        if bool::from(root.ct_eq(pk.pub_root())) {
            Ok(())
        } else {
            debug!(params = P::NAME, "signature rejected");
            Err(Error::VerificationFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha20Rng;

    #[cfg(feature = "sha2")]
    use crate::hash::sha2::Sha2Hasher;
    #[cfg(feature = "sha2")]
    use crate::params::Sha2_128f;
    #[cfg(feature = "shake")]
    use crate::params::{Shake128f, ShakeToy};

    /// The toy shape with `n = 24`, exercising the SHA-512 paths of the SHA2 hasher.
    #[cfg(feature = "sha2")]
    #[derive(Copy, Clone, Debug, Default)]
    struct Sha2Toy24;

    #[cfg(feature = "sha2")]
    impl ParameterSet for Sha2Toy24 {
        type Hasher = Sha2Hasher;
        const NAME: &'static str = "sphincs-sha2-toy24-simple";
        const N: usize = 24;
        const FULL_HEIGHT: usize = 6;
        const D: usize = 2;
        const FORS_HEIGHT: usize = 3;
        const FORS_TREES: usize = 5;
        const WOTS_W: usize = 16;
    }

    fn random_message() -> Vec<u8> {
        let mut rng = thread_rng();
        let len: u16 = rng.gen_range(0..2048);
        (0..len).map(|_| rng.gen::<u8>()).collect::<Vec<_>>()
    }

    fn round_trip<P: ParameterSet>() {
        let sp = SphincsPlus::<P>::new();

        let kg = sp.keygen();
        assert!(kg.is_ok());
        let (pk, sk) = kg.unwrap();
        assert_eq!(sk.public_key(), pk);

        let message = random_message();
        let signing = sp.sign(&message, &sk);
        assert!(signing.is_ok());
        let signature = signing.unwrap();
        assert_eq!(signature.as_ref().len(), P::BYTES);

        assert!(sp.verify(&signature, &message, &pk).is_ok());

        let mut fake_bytes = signature.to_bytes();
        fake_bytes[P::N + 1] ^= 1;
        let fake_signature = SphincsPlusSignature::<P>::try_from(fake_bytes.as_slice()).unwrap();
        assert_eq!(
            sp.verify(&fake_signature, &message, &pk),
            Err(Error::VerificationFailed)
        );

        let mut fake_message = message.clone();
        fake_message.push(0);
        assert_eq!(
            sp.verify(&signature, &fake_message, &pk),
            Err(Error::VerificationFailed)
        );
    }

    #[cfg(feature = "shake")]
    #[test]
    fn test_sphincs_plus_shake() {
        round_trip::<ShakeToy>();
        round_trip::<Shake128f>();
        println!("SPHINCS+ SHAKE keygen, signing, and verify tests passed.");
    }

    #[cfg(feature = "sha2")]
    #[test]
    fn test_sphincs_plus_sha2() {
        round_trip::<Sha2Toy24>();
        round_trip::<Sha2_128f>();
        println!("SPHINCS+ SHA2 keygen, signing, and verify tests passed.");
    }

    #[cfg(feature = "shake")]
    #[test]
    fn test_determinism() {
        let sp = SphincsPlus::<ShakeToy>::new();
        let seed = [0x3c_u8; 48];
        let (pk1, sk1) = sp.keygen_from_seed(&seed).unwrap();
        let (pk2, sk2) = sp.keygen_from_seed(&seed).unwrap();
        assert_eq!(pk1, pk2);
        assert_eq!(sk1, sk2);
        assert_eq!(sk1.sk_seed(), &seed[..16]);
        assert_eq!(sk1.sk_prf(), &seed[16..32]);
        assert_eq!(pk1.pub_seed(), &seed[32..]);

        let message = b"deterministic";
        let sig1 = sp.sign_deterministic(message, &sk1).unwrap();
        let sig2 = sp.sign_deterministic(message, &sk1).unwrap();
        assert_eq!(sig1, sig2);

        let sig3 = sp
            .sign_with_rng(message, &sk1, &mut ChaCha20Rng::seed_from_u64(7))
            .unwrap();
        let sig4 = sp
            .sign_with_rng(message, &sk1, &mut ChaCha20Rng::seed_from_u64(7))
            .unwrap();
        let sig5 = sp
            .sign_with_rng(message, &sk1, &mut ChaCha20Rng::seed_from_u64(8))
            .unwrap();
        assert_eq!(sig3, sig4);
        assert_ne!(sig3, sig5);
        assert_ne!(sig1.randomizer(), sig3.randomizer());
        for sig in [&sig1, &sig3, &sig5] {
            assert!(sp.verify(sig, message, &pk1).is_ok());
        }

        let (pk_rng1, _) = sp
            .keygen_with_rng(&mut ChaCha20Rng::seed_from_u64(1))
            .unwrap();
        let (pk_rng2, _) = sp
            .keygen_with_rng(&mut ChaCha20Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(pk_rng1, pk_rng2);
    }

    #[cfg(feature = "shake")]
    #[test]
    fn test_cross_key_rejection() {
        let sp = SphincsPlus::<ShakeToy>::new();
        let (pk_a, sk_a) = sp.keygen().unwrap();
        let (pk_b, _) = sp.keygen().unwrap();
        assert_ne!(pk_a, pk_b);

        let message = random_message();
        let signature = sp.sign(&message, &sk_a).unwrap();
        assert!(sp.verify(&signature, &message, &pk_a).is_ok());
        assert_eq!(
            sp.verify(&signature, &message, &pk_b),
            Err(Error::VerificationFailed)
        );
    }

    #[cfg(feature = "shake")]
    #[test]
    fn test_bad_lengths() {
        let sp = SphincsPlus::<ShakeToy>::new();
        assert_eq!(
            sp.keygen_from_seed(&[0u8; 47]).err(),
            Some(Error::BadLength(48, 47))
        );
        assert_eq!(
            SphincsPlusPublicKey::<ShakeToy>::try_from([0u8; 31].as_slice()).err(),
            Some(Error::BadLength(32, 31))
        );
        assert_eq!(
            SphincsPlusSignature::<ShakeToy>::try_from([0u8; 1553].as_slice()).err(),
            Some(Error::BadLength(1552, 1553))
        );

        let (_, sk) = sp.keygen().unwrap();
        assert_eq!(
            sp.sign_with_opt_rand(b"m", &sk, &[0u8; 15]).err(),
            Some(Error::BadLength(16, 15))
        );
    }

    #[cfg(feature = "shake")]
    #[test]
    fn test_split_digest_masks_indices() {
        // FORS_MSG_BYTES = 2, TREE_BYTES = 1 (3 bits), LEAF_BYTES = 1 (3 bits)
        let (md, tree, leaf) = SphincsPlus::<ShakeToy>::split_digest(&[1, 2, 0xff, 0xfa]);
        assert_eq!(md, &[1, 2]);
        assert_eq!(tree, 7);
        assert_eq!(leaf, 2);
    }

    #[cfg(feature = "shake")]
    #[test]
    fn test_rng_failure_produces_no_key() {
        struct FailingRng;
        impl RngCore for FailingRng {
            fn next_u32(&mut self) -> u32 {
                0
            }
            fn next_u64(&mut self) -> u64 {
                0
            }
            fn fill_bytes(&mut self, dest: &mut [u8]) {
                dest.fill(0)
            }
            fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
                Err(rand::Error::new("entropy source unavailable"))
            }
        }
        impl CryptoRng for FailingRng {}

        let sp = SphincsPlus::<ShakeToy>::new();
        assert!(matches!(
            sp.keygen_with_rng(&mut FailingRng),
            Err(Error::RandomnessFailure(_))
        ));
    }

    #[cfg(all(feature = "shake", feature = "serialization"))]
    #[test]
    fn test_serialization() {
        let sp = SphincsPlus::<ShakeToy>::new();
        let (pk, sk) = sp.keygen().unwrap();
        let signature = sp.sign(b"serde", &sk).unwrap();

        let pk_json = serde_json::to_string(&pk).unwrap();
        let sig_json = serde_json::to_string(&signature).unwrap();
        let pk_back: SphincsPlusPublicKey<ShakeToy> = serde_json::from_str(&pk_json).unwrap();
        let sig_back: SphincsPlusSignature<ShakeToy> = serde_json::from_str(&sig_json).unwrap();
        assert_eq!(pk_back, pk);
        assert!(sp.verify(&sig_back, b"serde", &pk_back).is_ok());

        assert!(serde_json::from_str::<SphincsPlusPublicKey<ShakeToy>>("[1,2,3]").is_err());
    }
}
