//! Known-answer vectors from the SPHINCS+ round 3.1 reference implementation (PQClean).
//!
//! Each key pair is derived from the seed `00 01 02 .. (3n - 1)`, and the message below is
//! signed with `OptRand = PK.seed`. Signatures are pinned by their hash.

#![cfg(any(feature = "shake", feature = "sha2"))]

use sphincs_hb::params::ParameterSet;
use sphincs_hb::SphincsPlus;

const MESSAGE: &[u8] = b"my name is xb, from bupt.\0";

struct KnownAnswer {
    public_key: &'static str,
    randomizer: &'static str,
    signature_hash: &'static str,
}

fn sign_known_seed<P: ParameterSet>(expected: &KnownAnswer) -> Vec<u8> {
    let seed: Vec<u8> = (0..P::SEED_BYTES as u8).collect();
    let sp = SphincsPlus::<P>::new();
    let (pk, sk) = sp.keygen_from_seed(&seed).unwrap();
    assert_eq!(hex::encode(pk.as_ref()), expected.public_key);

    let signature = sp.sign_deterministic(MESSAGE, &sk).unwrap();
    assert_eq!(signature.as_ref().len(), P::BYTES);
    assert_eq!(hex::encode(signature.randomizer()), expected.randomizer);
    assert!(sp.verify(&signature, MESSAGE, &pk).is_ok());
    signature.as_ref().to_vec()
}

#[cfg(feature = "shake")]
#[test]
fn shake_128f_known_answer() {
    use sha3::{Digest, Sha3_256};
    use sphincs_hb::params::Shake128f;

    let expected = KnownAnswer {
        public_key: "202122232425262728292a2b2c2d2e2fa90e4715b9a925c332801767fd786371",
        randomizer: "506c3827b439c0f8beeffc0487cfc945",
        signature_hash: "fb59bbd0723838c5c782310d7928ede7ae238711336740291702d2fa4c389f0b",
    };
    let signature = sign_known_seed::<Shake128f>(&expected);
    assert_eq!(
        hex::encode(Sha3_256::digest(&signature)),
        expected.signature_hash
    );
}

#[cfg(feature = "sha2")]
#[test]
fn sha2_128f_known_answer() {
    use sha2::{Digest, Sha256};
    use sphincs_hb::params::Sha2_128f;

    let expected = KnownAnswer {
        public_key: "202122232425262728292a2b2c2d2e2f3b56e816847f000386aeec2e2bb9e1b5",
        randomizer: "056425e6a6fac1591e77f606f4489a49",
        signature_hash: "217cec0aa7247cdf5ca58ad48bd68082e0c62daf4a0db5fa136c0d307f627a5d",
    };
    let signature = sign_known_seed::<Sha2_128f>(&expected);
    assert_eq!(
        hex::encode(Sha256::digest(&signature)),
        expected.signature_hash
    );
}

#[cfg(feature = "sha2")]
#[test]
fn sha2_192f_known_answer() {
    use sha2::{Digest, Sha256};
    use sphincs_hb::params::Sha2_192f;

    let expected = KnownAnswer {
        public_key: "303132333435363738393a3b3c3d3e3f4041424344454647\
                     9236ccebbb3a90ac2452dd89de49dab1340ec02419a2870e",
        randomizer: "8ce6a7f6ac15f2802837157696fb2f0078b46743bc887b88",
        signature_hash: "f5cd4338b186305097cc49400562c10296a410b26bc90ee10bd0bf088ba81cfe",
    };
    let signature = sign_known_seed::<Sha2_192f>(&expected);
    assert_eq!(
        hex::encode(Sha256::digest(&signature)),
        expected.signature_hash
    );
}
