//! Local label index and Kademlia-style DHT peer routing (spec.md §4.4,
//! §4.5): `Publish`/`List`/`Unpublish` over a local key-value store,
//! provider announcements with a mandatory fraud-check before caching a
//! remote peer's labels, the republish and remote-label-cleanup background
//! loops, and the peer RPC surface ([`transport::PeerTransport`]) those
//! loops and [`host::RoutingHost`] are built against.

pub mod announce;
pub mod cache;
pub mod error;
pub mod host;
pub mod local;
pub mod peer;
pub mod router;
pub mod transport;

pub use cache::{RemoteLabelCache, RemoteLabelEntry, DEFAULT_MIN_MATCH_SCORE, PROVIDER_RECORD_TTL_SECS};
pub use error::RoutingError;
pub use host::{RoutingHost, NAMESPACES};
pub use local::LocalLabelStore;
pub use peer::{DhtNode, PeerId};
pub use router::KademliaRouter;
pub use transport::{ListItem, ListRequest, PeerMetadata, PeerTransport, MAX_HOP_BUDGET, MAX_PULL_SIZE};
