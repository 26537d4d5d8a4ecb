//! In-process object-store-style backend. Stands in for an OCI-like remote
//! object store; useful for
//! tests and for deployments that front an external bucket through the
//! same narrow `StoreBackend` contract.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::StoreBackend;
use crate::error::StoreError;

#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.objects
            .write()
            .map_err(|_| StoreError::Internal("object-store lock poisoned".into()))?
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .objects
            .read()
            .map_err(|_| StoreError::Internal("object-store lock poisoned".into()))?
            .get(key)
            .cloned())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .objects
            .read()
            .map_err(|_| StoreError::Internal("object-store lock poisoned".into()))?
            .contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.objects
            .write()
            .map_err(|_| StoreError::Internal("object-store lock poisoned".into()))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_roundtrip() {
        let backend = MemoryBackend::new();
        backend.write("cid123", b"hello").await.unwrap();
        assert_eq!(backend.read("cid123").await.unwrap(), Some(b"hello".to_vec()));
    }
}
