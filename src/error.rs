#[allow(unused)]
pub use anyhow::{anyhow, bail, ensure, Error};

#[derive(Debug, thiserror::Error)]
pub enum JoseError {
    #[error("Internal error: [{0}]")]
    InternalError(String),
    #[error("Malformed JSON header")]
    MalformedJson,
    #[error("Missing header type (\"typ\")")]
    MissingTyp,
    #[error("Header type is not \"JWT\"")]
    InvalidTyp,
    #[error("Missing header algorithm (\"alg\")")]
    MissingAlg,
    #[error("Unknown algorithm: [{0}]")]
    UnknownAlgorithm(String),
    #[error("Key family doesn't match the algorithm")]
    FamilyMismatch,
    #[error("Key is too weak")]
    KeyTooWeak,
    #[error("A private key is required to sign")]
    PrivateKeyRequired,
    #[error("Malformed token")]
    MalformedToken,
    #[error("Malformed claims")]
    MalformedClaims,
    #[error("Signature didn't verify")]
    SignatureMismatch,
    #[error("Claims rejected")]
    ClaimsRejected,
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("A passphrase is required to load that key")]
    PassphraseRequired,
}

impl From<&str> for JoseError {
    fn from(e: &str) -> JoseError {
        JoseError::InternalError(e.into())
    }
}

/// Return the `JoseError` kind carried by `err`, if any.
pub fn error_kind(err: &Error) -> Option<&JoseError> {
    err.downcast_ref::<JoseError>()
}
