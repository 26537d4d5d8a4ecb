//! Local-filesystem backend. Blobs land under `store/<cid-derived-path>`
//! split into two hex prefix
//! directories to keep any one directory from holding an unbounded number
//! of entries.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::StoreBackend;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = dir_crypto::sha256_hex(key.as_bytes());
        self.root.join(&digest[0..2]).join(&digest[2..4]).join(key)
    }

    async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for FsBackend {
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        Self::ensure_parent(&path).await?;

        // Atomic write: write to a sibling temp file, then rename, so a
        // crash mid-write never leaves a partial blob under the real key.
        let tmp_path = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        backend.write("cid123", b"hello").await.unwrap();
        assert_eq!(backend.read("cid123").await.unwrap(), Some(b"hello".to_vec()));
        assert!(backend.exists("cid123").await.unwrap());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        backend.delete("missing").await.unwrap();
        backend.write("cid123", b"hello").await.unwrap();
        backend.delete("cid123").await.unwrap();
        backend.delete("cid123").await.unwrap();
        assert_eq!(backend.read("cid123").await.unwrap(), None);
    }
}
