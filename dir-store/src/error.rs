use thiserror::Error;

/// Store failure modes, transport-neutral. The service facade
/// maps these to RPC status codes at the boundary; nothing in this crate
/// knows about gRPC.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("malformed record: {0}")]
    InvalidArgument(String),

    #[error("record exceeds max size ({actual} > {max} bytes)")]
    ResourceExhausted { actual: u64, max: u64 },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage fault: {0}")]
    Internal(String),
}

impl From<dir_types::TypesError> for StoreError {
    fn from(e: dir_types::TypesError) -> Self {
        StoreError::InvalidArgument(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Internal(e.to_string())
    }
}
