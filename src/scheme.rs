//! # Byte-buffer signature API
//!
//! The calling convention shared with other NIST signature implementations: keys, signatures
//! and signed messages are flat byte buffers sized by the constants of the parameter set.
//!
//! * [`SignatureScheme`] is implemented by [`SphincsPlus`] for every parameter set.
//! * [`Variant`] is the closed set of parameter sets compiled into the crate, selectable at
//!   runtime by name, e.g. `"sphincs-shake-128f-simple".parse::<Variant>()`.
//!
//! Input buffers must have their exact size and fail with [`Error::BadLength`]; output
//! buffers must be large enough and fail with [`Error::BufferTooSmall`]. Both are checked
//! before any hashing.

use crate::error::{Error, Result};
use crate::params::ParameterSet;
use crate::sphincs_plus::{
    SphincsPlus, SphincsPlusPublicKey, SphincsPlusSecretKey, SphincsPlusSignature,
};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "sha2")]
use crate::params::{Sha2_128f, Sha2_128s, Sha2_192f, Sha2_192s, Sha2_256f, Sha2_256s};
#[cfg(feature = "shake")]
use crate::params::{
    Shake128f, Shake128s, Shake192f, Shake192s, Shake256f, Shake256s, ShakeToy,
};

fn check_exact(expected: usize, buf: &[u8]) -> Result<()> {
    if buf.len() != expected {
        return Err(Error::BadLength(expected, buf.len()));
    }
    Ok(())
}

fn check_room(needed: usize, buf: &[u8]) -> Result<()> {
    if buf.len() < needed {
        return Err(Error::BufferTooSmall(needed, buf.len()));
    }
    Ok(())
}

pub trait SignatureScheme {
    const NAME: &'static str;
    const PUBLIC_KEY_BYTES: usize;
    const SECRET_KEY_BYTES: usize;
    const SIGNATURE_BYTES: usize;

    /// Generates a keypair into `pk` and `sk`.
    fn crypto_sign_keypair(pk: &mut [u8], sk: &mut [u8]) -> Result<()>;

    /// Writes the detached signature of `message` into `sig` and returns its length.
    fn crypto_sign_signature(sig: &mut [u8], message: &[u8], sk: &[u8]) -> Result<usize>;

    /// Verifies the detached signature `sig` of `message`.
    fn crypto_sign_verify(sig: &[u8], message: &[u8], pk: &[u8]) -> Result<()>;

    /// Writes `signature || message` into `signed_message` and returns its length.
    ///
    /// Nothing is written unless signing succeeds.
    fn crypto_sign(signed_message: &mut [u8], message: &[u8], sk: &[u8]) -> Result<usize> {
        let total = Self::SIGNATURE_BYTES + message.len();
        check_room(total, signed_message)?;
        check_exact(Self::SECRET_KEY_BYTES, sk)?;

        let (sig, body) = signed_message[..total].split_at_mut(Self::SIGNATURE_BYTES);
        Self::crypto_sign_signature(sig, message, sk)?;
        body.copy_from_slice(message);
        Ok(total)
    }

    /// Verifies `signed_message` and copies the message it carries into `message`,
    /// returning the message length.
    ///
    /// On any failure nothing of the signed message is released: `message` is zeroed.
    fn crypto_sign_open(message: &mut [u8], signed_message: &[u8], pk: &[u8]) -> Result<usize> {
        let opened = open_into::<Self>(message, signed_message, pk);
        if opened.is_err() {
            message.fill(0);
        }
        opened
    }
}

fn open_into<S: SignatureScheme + ?Sized>(
    message: &mut [u8],
    signed_message: &[u8],
    pk: &[u8],
) -> Result<usize> {
    check_exact(S::PUBLIC_KEY_BYTES, pk)?;
    if signed_message.len() < S::SIGNATURE_BYTES {
        return Err(Error::VerificationFailed);
    }
    let (sig, body) = signed_message.split_at(S::SIGNATURE_BYTES);
    check_room(body.len(), message)?;

    S::crypto_sign_verify(sig, body, pk)?;
    message[..body.len()].copy_from_slice(body);
    Ok(body.len())
}

impl<P: ParameterSet> SignatureScheme for SphincsPlus<P> {
    const NAME: &'static str = P::NAME;
    const PUBLIC_KEY_BYTES: usize = P::PK_BYTES;
    const SECRET_KEY_BYTES: usize = P::SK_BYTES;
    const SIGNATURE_BYTES: usize = P::BYTES;

    fn crypto_sign_keypair(pk: &mut [u8], sk: &mut [u8]) -> Result<()> {
        check_room(P::PK_BYTES, pk)?;
        check_room(P::SK_BYTES, sk)?;
        let (public_key, secret_key) = SphincsPlus::<P>::new().keygen()?;
        pk[..P::PK_BYTES].copy_from_slice(public_key.as_ref());
        sk[..P::SK_BYTES].copy_from_slice(secret_key.as_ref());
        Ok(())
    }

    fn crypto_sign_signature(sig: &mut [u8], message: &[u8], sk: &[u8]) -> Result<usize> {
        check_room(P::BYTES, sig)?;
        let secret_key = SphincsPlusSecretKey::<P>::try_from(sk)?;
        let signature = SphincsPlus::<P>::new().sign(message, &secret_key)?;
        sig[..P::BYTES].copy_from_slice(signature.as_ref());
        Ok(P::BYTES)
    }

    fn crypto_sign_verify(sig: &[u8], message: &[u8], pk: &[u8]) -> Result<()> {
        let public_key = SphincsPlusPublicKey::<P>::try_from(pk)?;
        let signature = SphincsPlusSignature::<P>::try_from(sig)?;
        SphincsPlus::<P>::new().verify(&signature, message, &public_key)
    }
}

/// The SPHINCS+ parameter sets compiled into the crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    #[cfg(feature = "shake")]
    Shake128s,
    #[cfg(feature = "shake")]
    Shake128f,
    #[cfg(feature = "shake")]
    Shake192s,
    #[cfg(feature = "shake")]
    Shake192f,
    #[cfg(feature = "shake")]
    Shake256s,
    #[cfg(feature = "shake")]
    Shake256f,
    #[cfg(feature = "shake")]
    ShakeToy,
    #[cfg(feature = "sha2")]
    Sha2_128s,
    #[cfg(feature = "sha2")]
    Sha2_128f,
    #[cfg(feature = "sha2")]
    Sha2_192s,
    #[cfg(feature = "sha2")]
    Sha2_192f,
    #[cfg(feature = "sha2")]
    Sha2_256s,
    #[cfg(feature = "sha2")]
    Sha2_256f,
}

/// Evaluates `$body` with `$p` bound to the parameter set type of `$variant`.
macro_rules! with_params {
    ($variant: expr, $p: ident => $body: expr) => {
        match $variant {
            #[cfg(feature = "shake")]
            Variant::Shake128s => {
                type $p = Shake128s;
                $body
            }
            #[cfg(feature = "shake")]
            Variant::Shake128f => {
                type $p = Shake128f;
                $body
            }
            #[cfg(feature = "shake")]
            Variant::Shake192s => {
                type $p = Shake192s;
                $body
            }
            #[cfg(feature = "shake")]
            Variant::Shake192f => {
                type $p = Shake192f;
                $body
            }
            #[cfg(feature = "shake")]
            Variant::Shake256s => {
                type $p = Shake256s;
                $body
            }
            #[cfg(feature = "shake")]
            Variant::Shake256f => {
                type $p = Shake256f;
                $body
            }
            #[cfg(feature = "shake")]
            Variant::ShakeToy => {
                type $p = ShakeToy;
                $body
            }
            #[cfg(feature = "sha2")]
            Variant::Sha2_128s => {
                type $p = Sha2_128s;
                $body
            }
            #[cfg(feature = "sha2")]
            Variant::Sha2_128f => {
                type $p = Sha2_128f;
                $body
            }
            #[cfg(feature = "sha2")]
            Variant::Sha2_192s => {
                type $p = Sha2_192s;
                $body
            }
            #[cfg(feature = "sha2")]
            Variant::Sha2_192f => {
                type $p = Sha2_192f;
                $body
            }
            #[cfg(feature = "sha2")]
            Variant::Sha2_256s => {
                type $p = Sha2_256s;
                $body
            }
            #[cfg(feature = "sha2")]
            Variant::Sha2_256f => {
                type $p = Sha2_256f;
                $body
            }
        }
    };
}

impl Variant {
    /// Every compiled-in parameter set.
    pub fn all() -> Vec<Variant> {
        #[allow(unused_mut)]
        let mut variants = Vec::new();
        #[cfg(feature = "shake")]
        variants.extend([
            Variant::Shake128s,
            Variant::Shake128f,
            Variant::Shake192s,
            Variant::Shake192f,
            Variant::Shake256s,
            Variant::Shake256f,
            Variant::ShakeToy,
        ]);
        #[cfg(feature = "sha2")]
        variants.extend([
            Variant::Sha2_128s,
            Variant::Sha2_128f,
            Variant::Sha2_192s,
            Variant::Sha2_192f,
            Variant::Sha2_256s,
            Variant::Sha2_256f,
        ]);
        variants
    }

    pub fn name(&self) -> &'static str {
        with_params!(self, P => P::NAME)
    }

    pub fn public_key_bytes(&self) -> usize {
        with_params!(self, P => P::PK_BYTES)
    }

    pub fn secret_key_bytes(&self) -> usize {
        with_params!(self, P => P::SK_BYTES)
    }

    pub fn signature_bytes(&self) -> usize {
        with_params!(self, P => P::BYTES)
    }

    pub fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> Result<()> {
        with_params!(self, P => SphincsPlus::<P>::crypto_sign_keypair(pk, sk))
    }

    pub fn sign(&self, sig: &mut [u8], message: &[u8], sk: &[u8]) -> Result<usize> {
        with_params!(self, P => {
            SphincsPlus::<P>::crypto_sign_signature(sig, message, sk)
        })
    }

    pub fn verify(&self, sig: &[u8], message: &[u8], pk: &[u8]) -> Result<()> {
        with_params!(self, P => SphincsPlus::<P>::crypto_sign_verify(sig, message, pk))
    }

    pub fn sign_attached(
        &self,
        signed_message: &mut [u8],
        message: &[u8],
        sk: &[u8],
    ) -> Result<usize> {
        with_params!(self, P => {
            SphincsPlus::<P>::crypto_sign(signed_message, message, sk)
        })
    }

    pub fn open(&self, message: &mut [u8], signed_message: &[u8], pk: &[u8]) -> Result<usize> {
        with_params!(self, P => {
            SphincsPlus::<P>::crypto_sign_open(message, signed_message, pk)
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Variant::all()
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::UnknownParameterSet(s.to_string()))
    }
}
