use crate::adrs::Adrs;
use crate::hash::SpxHasher;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

/// The SHAKE256 instantiation of the SPHINCS+ hash functions.
#[derive(Clone, Debug)]
pub struct Shake256Hasher {
    pub_seed: Vec<u8>,
}

impl Shake256Hasher {
    fn xof(output: &mut [u8], inputs: &[&[u8]]) {
        let mut hasher = Shake256::default();
        for input in inputs {
            hasher.update(input);
        }
        let mut reader = hasher.finalize_xof();
        reader.read(output);
    }
}

impl SpxHasher for Shake256Hasher {
    fn new(pub_seed: &[u8]) -> Self {
        Self {
            pub_seed: pub_seed.to_vec(),
        }
    }

    fn n(&self) -> usize {
        self.pub_seed.len()
    }

    fn pub_seed(&self) -> &[u8] {
        &self.pub_seed
    }

    /// T_l(PK.seed, ADRS, M) = SHAKE256(PK.seed||ADRS||M, 8n)
    fn thash(&self, output: &mut [u8], input: &[u8], adrs: &Adrs) {
        let n = self.n();
        Self::xof(&mut output[..n], &[&self.pub_seed, &adrs.to_bytes(), input]);
    }

    /// PRF(PK.seed, SK.seed, ADRS) = SHAKE256(PK.seed||ADRS||SK.seed, 8n)
    fn prf_addr(&self, output: &mut [u8], sk_seed: &[u8], adrs: &Adrs) {
        let n = self.n();
        Self::xof(
            &mut output[..n],
            &[&self.pub_seed, &adrs.to_bytes(), &sk_seed[..n]],
        );
    }

    /// PRF_msg(SK.prf, OptRand, M) = SHAKE256(SK.prf||OptRand||M, 8n)
    fn prf_msg(&self, output: &mut [u8], sk_prf: &[u8], opt_rand: &[u8], message: &[u8]) {
        let n = self.n();
        Self::xof(&mut output[..n], &[&sk_prf[..n], &opt_rand[..n], message]);
    }

    /// H_msg(R, PK.seed, PK.root, M) = SHAKE256(R||PK.seed||PK.root||M, 8m)
    fn h_msg(&self, output: &mut [u8], r: &[u8], pub_root: &[u8], message: &[u8]) {
        let n = self.n();
        Self::xof(output, &[&r[..n], &self.pub_seed, &pub_root[..n], message]);
    }
}
