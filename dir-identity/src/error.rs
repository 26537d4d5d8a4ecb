use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity key file not found at {0}")]
    NotFound(String),

    #[error("identity key file is corrupt: {0}")]
    Corrupt(String),

    #[error("incorrect passphrase")]
    IncorrectPassphrase,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] dir_crypto::CryptoError),
}
