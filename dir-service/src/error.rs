//! Translates every crate's error enum into a `tonic::Status` at the RPC
//! boundary (spec.md §7's error-kind table) — this is the only place in
//! the workspace that materializes RPC status codes.

use tonic::{Code, Status};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] dir_store::StoreError),
    #[error(transparent)]
    Index(#[from] dir_index::IndexError),
    #[error(transparent)]
    Routing(#[from] dir_routing::RoutingError),
    #[error(transparent)]
    Verify(#[from] dir_verify::VerifyError),
    #[error(transparent)]
    Types(#[from] dir_types::TypesError),
    #[error("hash mismatch: requested {expected}, resolved content is {actual}")]
    HashMismatch { expected: String, actual: String },
    #[error("name resolution failed: {0}")]
    NameNotFound(String),
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        let code = match &err {
            ServiceError::Store(e) => store_code(e),
            ServiceError::Index(e) => index_code(e),
            ServiceError::Routing(e) => routing_code(e),
            ServiceError::Verify(e) => verify_code(e),
            ServiceError::Types(_) => Code::InvalidArgument,
            ServiceError::HashMismatch { .. } => Code::FailedPrecondition,
            ServiceError::NameNotFound(_) => Code::NotFound,
        };
        if code == Code::Internal {
            tracing::error!(error = %err, "internal service fault");
        }
        Status::new(code, err.to_string())
    }
}

fn store_code(e: &dir_store::StoreError) -> Code {
    match e {
        dir_store::StoreError::InvalidArgument(_) => Code::InvalidArgument,
        dir_store::StoreError::ResourceExhausted { .. } => Code::ResourceExhausted,
        dir_store::StoreError::NotFound(_) => Code::NotFound,
        dir_store::StoreError::Internal(_) => Code::Internal,
    }
}

fn index_code(e: &dir_index::IndexError) -> Code {
    match e {
        dir_index::IndexError::InvalidFilter(_) => Code::InvalidArgument,
        dir_index::IndexError::NotFound(_) => Code::NotFound,
        dir_index::IndexError::Database(_) => Code::Internal,
    }
}

fn routing_code(e: &dir_routing::RoutingError) -> Code {
    match e {
        dir_routing::RoutingError::Unavailable(_) => Code::Unavailable,
        dir_routing::RoutingError::NotFound(_) => Code::NotFound,
        dir_routing::RoutingError::InvalidArgument(_) => Code::InvalidArgument,
        dir_routing::RoutingError::Sled(_) => Code::Internal,
        dir_routing::RoutingError::Internal(_) => Code::Internal,
    }
}

fn verify_code(e: &dir_verify::VerifyError) -> Code {
    match e {
        dir_verify::VerifyError::Unsigned => Code::FailedPrecondition,
        dir_verify::VerifyError::NotVerifiableName(_) => Code::FailedPrecondition,
        dir_verify::VerifyError::InvalidKeyEncoding(_) => Code::InvalidArgument,
        dir_verify::VerifyError::FetchFailed(_) => Code::Unavailable,
        dir_verify::VerifyError::MalformedDocument(_) => Code::FailedPrecondition,
        dir_verify::VerifyError::Crypto(_) => Code::InvalidArgument,
        dir_verify::VerifyError::Index(_) => Code::Internal,
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
