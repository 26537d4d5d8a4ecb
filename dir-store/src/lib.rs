//! Content-addressable blob store: chunked streaming
//! ingest/egress over either of two interchangeable backends, with CID
//! computation and idempotent writes delegated to `dir-types`.

pub mod backend;
pub mod error;
pub mod store;

pub use backend::{fs::FsBackend, memory::MemoryBackend, StoreBackend};
pub use error::StoreError;
pub use store::{ContentMeta, ContentStore, MAX_RECORD_SIZE, PULL_CHUNK_SIZE};
