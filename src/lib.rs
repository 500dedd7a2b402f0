mod error;
mod utils;

pub mod adrs;
pub mod fors;
pub mod hash;
pub mod hypertree;
pub mod merkle;
pub mod params;
pub mod scheme;
pub mod sphincs_plus;
pub mod wots_plus;

pub use crate::error::{Error, Result};
pub use crate::params::ParameterSet;
pub use crate::scheme::{SignatureScheme, Variant};
pub use crate::sphincs_plus::{
    SphincsPlus, SphincsPlusPublicKey, SphincsPlusSecretKey, SphincsPlusSignature,
};
