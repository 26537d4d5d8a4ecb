use thiserror::Error;

/// Cryptographic failure modes surfaced at the crate boundary.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key encoding: {0}")]
    InvalidKey(String),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),
}
