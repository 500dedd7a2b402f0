//! # Hash/PRF collaborators
//!
//! SPHINCS+ only needs five keyed functions, all domain separated by an [`Adrs`] or keyed by
//! a secret seed:
//!
//! * `T_l(PK.seed, ADRS, M)`: the tweakable hash over `l` blocks of `n` bytes, of which
//!   `F` (one block) and `H` (two blocks) are special cases,
//! * `PRF(PK.seed, SK.seed, ADRS)`: derivation of WOTS+ chain starts and FORS secret leaves,
//! * `PRF_msg(SK.prf, OptRand, M)`: the signature randomizer `R`,
//! * `H_msg(R, PK.seed, PK.root, M)`: the digest stream that selects FORS indices and the
//!   hypertree leaf.
//!
//! A hasher is created once per public seed so that instantiations can precompute seed
//! dependent state.

use crate::adrs::Adrs;
use std::fmt::Debug;

#[cfg(feature = "sha2")]
pub mod sha2;
#[cfg(feature = "shake")]
pub mod shake;

pub trait SpxHasher: Clone + Debug + Send + Sync {
    /// Creates the hasher for the given `n`-byte public seed.
    fn new(pub_seed: &[u8]) -> Self;

    /// Digest length `n` in bytes.
    fn n(&self) -> usize;

    /// The public seed the hasher was created with.
    fn pub_seed(&self) -> &[u8];

    /// `T_l`: writes `n` bytes into `output` from `input`, a concatenation of `l` blocks of
    /// `n` bytes each.
    fn thash(&self, output: &mut [u8], input: &[u8], adrs: &Adrs);

    /// `F(PK.seed, ADRS, M1)`.
    fn f(&self, output: &mut [u8], input: &[u8], adrs: &Adrs) {
        self.thash(output, input, adrs);
    }

    /// `H(PK.seed, ADRS, M1 || M2)`.
    fn h(&self, output: &mut [u8], left: &[u8], right: &[u8], adrs: &Adrs) {
        let mut buf = Vec::with_capacity(left.len() + right.len());
        buf.extend_from_slice(left);
        buf.extend_from_slice(right);
        self.thash(output, &buf, adrs);
    }

    /// `PRF(PK.seed, SK.seed, ADRS)`.
    fn prf_addr(&self, output: &mut [u8], sk_seed: &[u8], adrs: &Adrs);

    /// `PRF_msg(SK.prf, OptRand, M)`, producing the `n`-byte randomizer `R`.
    fn prf_msg(&self, output: &mut [u8], sk_prf: &[u8], opt_rand: &[u8], message: &[u8]);

    /// `H_msg(R, PK.seed, PK.root, M)`, filling the whole of `output`.
    fn h_msg(&self, output: &mut [u8], r: &[u8], pub_root: &[u8], message: &[u8]);
}
