use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("malformed record JSON: {0}")]
    Malformed(String),

    #[error("unsupported schema_version: {0}")]
    UnsupportedSchemaVersion(String),

    #[error("record exceeds max size ({actual} > {max} bytes)")]
    TooLarge { actual: usize, max: usize },

    #[error("invalid CID: {0}")]
    InvalidCid(String),
}
