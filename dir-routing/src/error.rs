use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("peer unavailable: {0}")]
    Unavailable(String),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<dir_types::TypesError> for RoutingError {
    fn from(e: dir_types::TypesError) -> Self {
        RoutingError::Internal(e.to_string())
    }
}
