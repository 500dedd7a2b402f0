//! # SPHINCS+ parameter sets
//!
//! A parameter set fixes the six primary constants of the scheme
//!
//! * `N`: security parameter, the byte length of every digest,
//! * `FULL_HEIGHT` (`h`): height of the whole hypertree,
//! * `D`: number of hypertree layers,
//! * `FORS_HEIGHT` (`a`): height of each FORS tree,
//! * `FORS_TREES` (`k`): number of FORS trees,
//! * `WOTS_W` (`w`): Winternitz base,
//!
//! together with the hash collaborator. Every other size of the scheme is derived from these
//! as a default associated constant of [`ParameterSet`], so a new set only has to name its
//! primary constants.
//!
//! The shipped sets are the "simple" instances of the
//! [SPHINCS+ v.3.1 submission](https://sphincs.org/data/sphincs+-r3.1-specification.pdf) for
//! SHAKE (feature `shake`) and SHA2 (feature `sha2`), and [`ShakeToy`], a tiny set meant for
//! tests.

use crate::hash::SpxHasher;
use std::fmt::Debug;

#[cfg(feature = "sha2")]
use crate::hash::sha2::Sha2Hasher;
#[cfg(feature = "shake")]
use crate::hash::shake::Shake256Hasher;

const fn log2(mut x: usize) -> usize {
    let mut r = 0;
    while x > 1 {
        x >>= 1;
        r += 1;
    }
    r
}

/// Number of base-`w` digits needed for the WOTS+ checksum of `len1` message digits.
const fn wots_len2(len1: usize, w: usize) -> usize {
    let max_checksum = len1 * (w - 1);
    let mut capacity = w;
    let mut len2 = 1;
    while capacity <= max_checksum {
        capacity *= w;
        len2 += 1;
    }
    len2
}

pub trait ParameterSet: Copy + Clone + Debug + Default + Send + Sync + 'static {
    /// Hash collaborator instantiating `F`, `H`, `PRF`, `PRF_msg` and `H_msg`.
    type Hasher: SpxHasher;

    /// Canonical name, e.g. `sphincs-shake-128f-simple`.
    const NAME: &'static str;

    const N: usize;
    const FULL_HEIGHT: usize;
    const D: usize;
    const FORS_HEIGHT: usize;
    const FORS_TREES: usize;
    const WOTS_W: usize;

    const WOTS_LOGW: usize = log2(Self::WOTS_W);
    const WOTS_LEN1: usize = 8 * Self::N / Self::WOTS_LOGW;
    const WOTS_LEN2: usize = wots_len2(Self::WOTS_LEN1, Self::WOTS_W);
    const WOTS_LEN: usize = Self::WOTS_LEN1 + Self::WOTS_LEN2;
    const WOTS_BYTES: usize = Self::WOTS_LEN * Self::N;

    /// Height `h' = h / d` of a single hypertree layer.
    const TREE_HEIGHT: usize = Self::FULL_HEIGHT / Self::D;

    const FORS_MSG_BYTES: usize = (Self::FORS_HEIGHT * Self::FORS_TREES + 7) / 8;
    const FORS_BYTES: usize = (Self::FORS_HEIGHT + 1) * Self::FORS_TREES * Self::N;

    /// Signature size: `R`, the FORS signature, then one WOTS+ signature and one
    /// authentication path per layer.
    const BYTES: usize =
        Self::N + Self::FORS_BYTES + Self::D * Self::WOTS_BYTES + Self::FULL_HEIGHT * Self::N;
    const PK_BYTES: usize = 2 * Self::N;
    const SK_BYTES: usize = 2 * Self::N + Self::PK_BYTES;
    const SEED_BYTES: usize = 3 * Self::N;

    const TREE_BITS: usize = Self::TREE_HEIGHT * (Self::D - 1);
    const TREE_BYTES: usize = (Self::TREE_BITS + 7) / 8;
    const LEAF_BITS: usize = Self::TREE_HEIGHT;
    const LEAF_BYTES: usize = (Self::LEAF_BITS + 7) / 8;
    const DGST_BYTES: usize = Self::FORS_MSG_BYTES + Self::TREE_BYTES + Self::LEAF_BYTES;

    /// Evaluated by every key generation, signing and verification entry point; an
    /// inconsistent parameter set fails at compile time.
    const ASSERT_VALID: () = {
        assert!(
            Self::WOTS_W == 4 || Self::WOTS_W == 16 || Self::WOTS_W == 256,
            "WOTS_W must be 4, 16 or 256"
        );
        assert!(Self::N > 0 && (8 * Self::N) % Self::WOTS_LOGW == 0);
        assert!(Self::D >= 1 && Self::D <= 255, "D must be in 1..=255");
        assert!(Self::FULL_HEIGHT % Self::D == 0, "D must divide FULL_HEIGHT");
        assert!(Self::TREE_HEIGHT >= 1 && Self::TREE_HEIGHT < 32);
        assert!(Self::TREE_BITS <= 64, "tree index must fit in 64 bits");
        assert!(Self::FORS_HEIGHT >= 1 && Self::FORS_HEIGHT < 32);
        assert!(Self::FORS_TREES >= 1);
        assert!(
            (Self::FORS_TREES as u64) << Self::FORS_HEIGHT <= 1_u64 << 32,
            "FORS leaf indices must fit in 32 bits"
        );
    };
}

macro_rules! parameter_set {
    (
        $(#[$meta: meta])*
        $name: ident, $label: literal, $hasher: ty,
        n: $n: expr, h: $h: expr, d: $d: expr, a: $a: expr, k: $k: expr, w: $w: expr
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl ParameterSet for $name {
            type Hasher = $hasher;
            const NAME: &'static str = $label;
            const N: usize = $n;
            const FULL_HEIGHT: usize = $h;
            const D: usize = $d;
            const FORS_HEIGHT: usize = $a;
            const FORS_TREES: usize = $k;
            const WOTS_W: usize = $w;
        }
    };
}

#[cfg(feature = "shake")]
parameter_set! {
    /// SPHINCS+-SHAKE-128s-simple.
    Shake128s, "sphincs-shake-128s-simple", Shake256Hasher,
    n: 16, h: 63, d: 7, a: 12, k: 14, w: 16
}
#[cfg(feature = "shake")]
parameter_set! {
    /// SPHINCS+-SHAKE-128f-simple.
    Shake128f, "sphincs-shake-128f-simple", Shake256Hasher,
    n: 16, h: 66, d: 22, a: 6, k: 33, w: 16
}
#[cfg(feature = "shake")]
parameter_set! {
    /// SPHINCS+-SHAKE-192s-simple.
    Shake192s, "sphincs-shake-192s-simple", Shake256Hasher,
    n: 24, h: 63, d: 7, a: 14, k: 17, w: 16
}
#[cfg(feature = "shake")]
parameter_set! {
    /// SPHINCS+-SHAKE-192f-simple.
    Shake192f, "sphincs-shake-192f-simple", Shake256Hasher,
    n: 24, h: 66, d: 22, a: 8, k: 33, w: 16
}
#[cfg(feature = "shake")]
parameter_set! {
    /// SPHINCS+-SHAKE-256s-simple.
    Shake256s, "sphincs-shake-256s-simple", Shake256Hasher,
    n: 32, h: 64, d: 8, a: 14, k: 22, w: 16
}
#[cfg(feature = "shake")]
parameter_set! {
    /// SPHINCS+-SHAKE-256f-simple.
    Shake256f, "sphincs-shake-256f-simple", Shake256Hasher,
    n: 32, h: 68, d: 17, a: 9, k: 35, w: 16
}
#[cfg(feature = "shake")]
parameter_set! {
    /// A toy SHAKE set with a 64-leaf hypertree of two layers and five FORS trees of
    /// height 3. It offers no security and exists to exercise every code path quickly.
    ShakeToy, "sphincs-shake-toy-simple", Shake256Hasher,
    n: 16, h: 6, d: 2, a: 3, k: 5, w: 16
}

#[cfg(feature = "sha2")]
parameter_set! {
    /// SPHINCS+-SHA2-128s-simple.
    Sha2_128s, "sphincs-sha2-128s-simple", Sha2Hasher,
    n: 16, h: 63, d: 7, a: 12, k: 14, w: 16
}
#[cfg(feature = "sha2")]
parameter_set! {
    /// SPHINCS+-SHA2-128f-simple.
    Sha2_128f, "sphincs-sha2-128f-simple", Sha2Hasher,
    n: 16, h: 66, d: 22, a: 6, k: 33, w: 16
}
#[cfg(feature = "sha2")]
parameter_set! {
    /// SPHINCS+-SHA2-192s-simple.
    Sha2_192s, "sphincs-sha2-192s-simple", Sha2Hasher,
    n: 24, h: 63, d: 7, a: 14, k: 17, w: 16
}
#[cfg(feature = "sha2")]
parameter_set! {
    /// SPHINCS+-SHA2-192f-simple.
    Sha2_192f, "sphincs-sha2-192f-simple", Sha2Hasher,
    n: 24, h: 66, d: 22, a: 8, k: 33, w: 16
}
#[cfg(feature = "sha2")]
parameter_set! {
    /// SPHINCS+-SHA2-256s-simple.
    Sha2_256s, "sphincs-sha2-256s-simple", Sha2Hasher,
    n: 32, h: 64, d: 8, a: 14, k: 22, w: 16
}
#[cfg(feature = "sha2")]
parameter_set! {
    /// SPHINCS+-SHA2-256f-simple.
    Sha2_256f, "sphincs-sha2-256f-simple", Sha2Hasher,
    n: 32, h: 68, d: 17, a: 9, k: 35, w: 16
}
