use crate::adrs::Adrs;
use crate::hash::SpxHasher;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

const SHA256_BLOCK_BYTES: usize = 64;
const SHA512_BLOCK_BYTES: usize = 128;

/// The SHA2 instantiation of the SPHINCS+ hash functions.
///
/// `F` and `PRF` always use SHA-256. For `n > 16`, multi-block tweakable hashes, `PRF_msg`
/// and `H_msg` switch to SHA-512. The block-padded public seed is absorbed once at
/// construction and the resulting states are cloned for every call.
#[derive(Clone, Debug)]
pub struct Sha2Hasher {
    pub_seed: Vec<u8>,
    sha256: Sha256,
    sha512: Option<Sha512>,
}

/// MGF1 as in RFC 8017, filling all of `output`.
fn mgf1<D: Digest>(output: &mut [u8], seed: &[u8]) {
    for (counter, chunk) in output.chunks_mut(<D as Digest>::output_size()).enumerate() {
        let block = D::new()
            .chain_update(seed)
            .chain_update((counter as u32).to_be_bytes())
            .finalize();
        chunk.copy_from_slice(&block[..chunk.len()]);
    }
}

impl SpxHasher for Sha2Hasher {
    fn new(pub_seed: &[u8]) -> Self {
        // block-pad and initialize sha256 and sha512 with pub_seed
        let mut block256 = [0_u8; SHA256_BLOCK_BYTES];
        block256[..pub_seed.len()].copy_from_slice(pub_seed);
        let sha256 = Sha256::new().chain_update(block256);

        let sha512 = (pub_seed.len() > 16).then(|| {
            let mut block512 = [0_u8; SHA512_BLOCK_BYTES];
            block512[..pub_seed.len()].copy_from_slice(pub_seed);
            Sha512::new().chain_update(block512)
        });

        Self {
            pub_seed: pub_seed.to_vec(),
            sha256,
            sha512,
        }
    }

    fn n(&self) -> usize {
        self.pub_seed.len()
    }

    fn pub_seed(&self) -> &[u8] {
        &self.pub_seed
    }

    /// T_l(PK.seed, ADRS, M) = SHA-X(BlockPad(PK.seed)||ADRSc||M)
    fn thash(&self, output: &mut [u8], input: &[u8], adrs: &Adrs) {
        let n = self.n();
        match &self.sha512 {
            Some(sha512) if input.len() > n => {
                let digest = sha512
                    .clone()
                    .chain_update(adrs.to_compressed())
                    .chain_update(input)
                    .finalize();
                output[..n].copy_from_slice(&digest[..n]);
            }
            _ => {
                let digest = self
                    .sha256
                    .clone()
                    .chain_update(adrs.to_compressed())
                    .chain_update(input)
                    .finalize();
                output[..n].copy_from_slice(&digest[..n]);
            }
        }
    }

    /// PRF(PK.seed, SK.seed, ADRS) = SHA-256(BlockPad(PK.seed)||ADRSc||SK.seed)
    fn prf_addr(&self, output: &mut [u8], sk_seed: &[u8], adrs: &Adrs) {
        let n = self.n();
        let digest = self
            .sha256
            .clone()
            .chain_update(adrs.to_compressed())
            .chain_update(&sk_seed[..n])
            .finalize();
        output[..n].copy_from_slice(&digest[..n]);
    }

    /// PRF_msg(SK.prf, OptRand, M) = HMAC-SHA-X(SK.prf, OptRand||M)
    fn prf_msg(&self, output: &mut [u8], sk_prf: &[u8], opt_rand: &[u8], message: &[u8]) {
        let n = self.n();
        if self.sha512.is_some() {
            let mut mac = Hmac::<Sha512>::new_from_slice(&sk_prf[..n])
                .expect("HMAC accepts keys of any length");
            mac.update(&opt_rand[..n]);
            mac.update(message);
            output[..n].copy_from_slice(&mac.finalize().into_bytes()[..n]);
        } else {
            let mut mac = Hmac::<Sha256>::new_from_slice(&sk_prf[..n])
                .expect("HMAC accepts keys of any length");
            mac.update(&opt_rand[..n]);
            mac.update(message);
            output[..n].copy_from_slice(&mac.finalize().into_bytes()[..n]);
        }
    }

    /// H_msg(R, PK.seed, PK.root, M) = MGF1-SHA-X(R||PK.seed||SHA-X(R||PK.seed||PK.root||M), m)
    fn h_msg(&self, output: &mut [u8], r: &[u8], pub_root: &[u8], message: &[u8]) {
        let n = self.n();
        let mut seed = Vec::with_capacity(2 * n + 64);
        seed.extend_from_slice(&r[..n]);
        seed.extend_from_slice(&self.pub_seed);
        if self.sha512.is_some() {
            let inner = Sha512::new()
                .chain_update(&r[..n])
                .chain_update(&self.pub_seed)
                .chain_update(&pub_root[..n])
                .chain_update(message)
                .finalize();
            seed.extend_from_slice(&inner);
            mgf1::<Sha512>(output, &seed);
        } else {
            let inner = Sha256::new()
                .chain_update(&r[..n])
                .chain_update(&self.pub_seed)
                .chain_update(&pub_root[..n])
                .chain_update(message)
                .finalize();
            seed.extend_from_slice(&inner);
            mgf1::<Sha256>(output, &seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adrs::AdrsType;

    #[test]
    fn test_seeded_state_matches_padding() {
        let pub_seed = [0x5a_u8; 16];
        let hasher = Sha2Hasher::new(&pub_seed);
        let adrs = Adrs::new(0, 1).with_type(AdrsType::WotsHash).with_chain(2);
        let input = [1u8; 16];

        let mut out = [0u8; 16];
        hasher.f(&mut out, &input, &adrs);

        let mut padded = [0u8; 64];
        padded[..16].copy_from_slice(&pub_seed);
        let expected = Sha256::new()
            .chain_update(padded)
            .chain_update(adrs.to_compressed())
            .chain_update(input)
            .finalize();
        assert_eq!(out, expected[..16]);
    }

    #[test]
    fn test_multi_block_uses_sha512_for_large_n() {
        let pub_seed = [0x11_u8; 24];
        let hasher = Sha2Hasher::new(&pub_seed);
        let adrs = Adrs::new(0, 0).with_type(AdrsType::Tree);
        let input = [2u8; 48];

        let mut out = [0u8; 24];
        hasher.thash(&mut out, &input, &adrs);

        let mut padded = [0u8; 128];
        padded[..24].copy_from_slice(&pub_seed);
        let expected = Sha512::new()
            .chain_update(padded)
            .chain_update(adrs.to_compressed())
            .chain_update(input)
            .finalize();
        assert_eq!(out, expected[..24]);
    }

    #[test]
    fn test_mgf1_counter_blocks() {
        let mut out = [0u8; 40];
        mgf1::<Sha256>(&mut out, b"seed");
        let first = Sha256::new()
            .chain_update(b"seed")
            .chain_update([0u8, 0, 0, 0])
            .finalize();
        let second = Sha256::new()
            .chain_update(b"seed")
            .chain_update([0u8, 0, 0, 1])
            .finalize();
        assert_eq!(out[..32], first[..]);
        assert_eq!(out[32..], second[..8]);
    }

    #[test]
    fn test_prf_msg_depends_on_opt_rand() {
        let hasher = Sha2Hasher::new(&[0u8; 32]);
        let sk_prf = [9u8; 32];
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        hasher.prf_msg(&mut a, &sk_prf, &[0u8; 32], b"msg");
        hasher.prf_msg(&mut b, &sk_prf, &[1u8; 32], b"msg");
        assert_ne!(a, b);
    }
}
