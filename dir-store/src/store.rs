//! The content-addressed store. `ContentStore` is the sole authority on
//! CID↔bytes mapping; every other subsystem receives bytes from here,
//! never reconstructs them independently.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use dir_types::{compute_cid, decode_record, RecordCid, RecordRef};
use futures::{Stream, StreamExt};
use tracing::{debug, info};

use crate::backend::StoreBackend;
use crate::error::StoreError;

/// Hard cap on a pushed record's assembled size.
pub const MAX_RECORD_SIZE: u64 = 4 * 1024 * 1024;

/// Chunk size used when streaming bytes back out on `Pull`.
pub const PULL_CHUNK_SIZE: usize = 4 * 1024;

/// Metadata returned by `Lookup`, without streaming the body.
#[derive(Debug, Clone)]
pub struct ContentMeta {
    pub content_type: String,
    pub size: u64,
    pub digest: String,
    pub annotations: BTreeMap<String, String>,
}

pub struct ContentStore {
    backend: Arc<dyn StoreBackend>,
}

impl ContentStore {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Stream bytes in, bound the total size, decode+canonicalize, and
    /// write the canonical bytes under their CID. Idempotent: if the CID
    /// already exists this returns without touching the backend again;
    /// re-pushing identical content is not an error.
    pub async fn push<S, E>(&self, mut stream: S) -> Result<RecordCid, StoreError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StoreError::Internal(e.to_string()))?;
            if buf.len() as u64 + chunk.len() as u64 > MAX_RECORD_SIZE {
                return Err(StoreError::ResourceExhausted {
                    actual: buf.len() as u64 + chunk.len() as u64,
                    max: MAX_RECORD_SIZE,
                });
            }
            buf.extend_from_slice(&chunk);
        }
        self.push_bytes(&buf).await
    }

    /// Non-streaming entry point used by the CLI and tests, where the whole
    /// record is already resident in memory.
    pub async fn push_bytes(&self, bytes: &[u8]) -> Result<RecordCid, StoreError> {
        if bytes.len() as u64 > MAX_RECORD_SIZE {
            return Err(StoreError::ResourceExhausted {
                actual: bytes.len() as u64,
                max: MAX_RECORD_SIZE,
            });
        }
        let record = decode_record(bytes)?;
        let cid = compute_cid(&record)?;
        let canonical = dir_types::canonical::canonical_bytes(&serde_json::to_value(&record)
            .map_err(|e| StoreError::InvalidArgument(e.to_string()))?);

        let key = cid.to_string();
        if self.backend.exists(&key).await? {
            debug!(cid = %key, "push is idempotent, content already stored");
            return Ok(cid);
        }
        self.backend.write(&key, &canonical).await?;
        info!(cid = %key, size = canonical.len(), "pushed record");
        Ok(cid)
    }

    /// Stream canonical bytes back out in fixed-size chunks.
    pub async fn pull(&self, reference: &RecordRef) -> Result<impl Stream<Item = Result<Bytes, StoreError>>, StoreError> {
        let bytes = self.pull_bytes(reference).await?;

        let chunks: Vec<Result<Bytes, StoreError>> = bytes
            .chunks(PULL_CHUNK_SIZE)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(tokio_stream::iter(chunks))
    }

    /// Non-streaming convenience used by the CLI and index-population path.
    /// Re-hashes the bytes and checks them against `reference.cid` before
    /// returning, so a corrupted blob on disk surfaces as an `Internal`
    /// error rather than silently handing out the wrong content.
    pub async fn pull_bytes(&self, reference: &RecordRef) -> Result<Vec<u8>, StoreError> {
        let bytes = self
            .backend
            .read(&reference.cid)
            .await?
            .ok_or_else(|| StoreError::NotFound(reference.cid.clone()))?;
        let actual = dir_types::cid::cid_from_canonical_bytes(&bytes).to_string();
        if actual != reference.cid {
            return Err(StoreError::Internal(format!(
                "stored content under {} hashes to {actual}, refusing to serve it",
                reference.cid
            )));
        }
        Ok(bytes)
    }

    pub async fn lookup(&self, reference: &RecordRef) -> Result<ContentMeta, StoreError> {
        let bytes = self
            .backend
            .read(&reference.cid)
            .await?
            .ok_or_else(|| StoreError::NotFound(reference.cid.clone()))?;
        let digest = dir_crypto::sha256_hex(&bytes);
        Ok(ContentMeta {
            content_type: dir_types::cid::RECORD_CODEC.to_string(),
            size: bytes.len() as u64,
            digest,
            annotations: BTreeMap::new(),
        })
    }

    /// Idempotent: deleting an absent CID is not surfaced as an error.
    pub async fn delete(&self, reference: &RecordRef) -> Result<(), StoreError> {
        self.backend.delete(&reference.cid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;

    fn sample_record_bytes() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "name": "http://example.com/agents/a",
            "version": "v1.0.0",
            "schema_version": "v1alpha2",
            "created_at": "2024-01-01T00:00:00Z",
            "authors": ["alice"],
            "description": "test",
            "skills": [],
            "locators": [],
            "modules": [],
            "domains": [],
            "annotations": {}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn push_is_idempotent_and_does_not_rewrite() {
        let store = ContentStore::new(Arc::new(MemoryBackend::new()));
        let bytes = sample_record_bytes();
        let cid1 = store.push_bytes(&bytes).await.unwrap();
        let cid2 = store.push_bytes(&bytes).await.unwrap();
        assert_eq!(cid1, cid2);
    }

    #[tokio::test]
    async fn push_then_pull_roundtrips() {
        let store = ContentStore::new(Arc::new(MemoryBackend::new()));
        let bytes = sample_record_bytes();
        let cid = store.push_bytes(&bytes).await.unwrap();
        let reference = RecordRef::new(cid.to_string());
        let pulled = store.pull_bytes(&reference).await.unwrap();
        let decoded = decode_record(&pulled).unwrap();
        assert_eq!(decoded.name, "http://example.com/agents/a");
    }

    #[tokio::test]
    async fn oversized_push_is_rejected() {
        let store = ContentStore::new(Arc::new(MemoryBackend::new()));
        let huge = vec![b'a'; (MAX_RECORD_SIZE + 1) as usize];
        let err = store.push_bytes(&huge).await.unwrap_err();
        assert!(matches!(err, StoreError::ResourceExhausted { .. }));
    }

    #[tokio::test]
    async fn pull_missing_is_not_found() {
        let store = ContentStore::new(Arc::new(MemoryBackend::new()));
        let reference = RecordRef::new("bafyreimissing".to_string());
        let err = store.pull_bytes(&reference).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = ContentStore::new(Arc::new(MemoryBackend::new()));
        let reference = RecordRef::new("bafyreimissing".to_string());
        store.delete(&reference).await.unwrap();
        store.delete(&reference).await.unwrap();
    }
}
