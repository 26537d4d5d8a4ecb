//! Interchangeable storage backends:
//! the store is the sole authority on CID↔bytes mapping, and every backend
//! satisfies the same narrow contract so the two can be swapped without
//! touching `ContentStore`.

pub mod fs;
pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;

/// Raw byte-addressable backend keyed by CID string. Backends never see a
/// `Record` — canonicalization and CID computation happen in `ContentStore`
/// before bytes reach here.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
