use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("record not found: {0}")]
    NotFound(String),
}
