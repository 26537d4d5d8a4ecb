//! Peer identity: the stable Ed25519 keypair every DHT node persists to
//! disk (`identity.key` under the configured data directory) and uses to
//! sign peer-protocol handshakes.
//!
//! This crate intentionally carries only what the directory's routing layer
//! needs. Zero-knowledge citizen onboarding, DID documents, guardian-based
//! recovery, and wallet machinery have no counterpart here and are not
//! ported — see `DESIGN.md`.

pub mod error;
pub mod keystore;

pub use error::IdentityError;
pub use keystore::{PeerIdentity, PeerKeystore};
