use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("record has no signature to verify")]
    Unsigned,

    #[error("record name is not a verifiable http(s) authority: {0}")]
    NotVerifiableName(String),

    #[error("well-known document fetch failed: {0}")]
    FetchFailed(String),

    #[error("well-known document is malformed: {0}")]
    MalformedDocument(String),

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] dir_crypto::CryptoError),

    #[error("index error: {0}")]
    Index(#[from] dir_index::IndexError),
}
