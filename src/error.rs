use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid length: expected {0} bytes, found {1} bytes")]
    BadLength(usize, usize),
    #[error("Output buffer too small: needed {0} bytes, found {1} bytes")]
    BufferTooSmall(usize, usize),
    #[error("Signature verification failed")]
    VerificationFailed,
    #[error("Randomness source failure: {0}")]
    RandomnessFailure(String),
    #[error("Unknown parameter set '{0}'")]
    UnknownParameterSet(String),
}

impl From<rand::Error> for Error {
    fn from(e: rand::Error) -> Self {
        Error::RandomnessFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
