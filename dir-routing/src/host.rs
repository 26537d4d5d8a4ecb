//! Wires the routing table, local label index, remote-label cache and peer
//! transport into the long-lived object the service facade holds: the
//! single place `Publish`/`Unpublish`/`Search`/the republish loop/the
//! cleanup loop all go through.
//!
//! Constructed bottom-up per spec.md §9's "cyclic ownership hazards" note:
//! build the router, then the local store and cache, then hand a narrow
//! [`PeerTransport`] in from outside. Nothing here reaches back into the
//! transport's own construction.

use std::sync::Arc;

use dir_types::Record;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::announce::{extract_labels, handle_announcement, provide};
use crate::cache::{
    now_unix, RemoteLabelCache, DEFAULT_MIN_MATCH_SCORE, LABEL_REPUBLISH_INTERVAL_SECS,
    REMOTE_LABEL_CLEANUP_INTERVAL_SECS,
};
use crate::error::RoutingError;
use crate::local::LocalLabelStore;
use crate::peer::PeerId;
use crate::router::KademliaRouter;
use crate::transport::PeerTransport;

/// Namespaces a query term may name, matching the label prefixes
/// `LocalLabelStore`/`announce::extract_labels` write under.
pub const NAMESPACES: [&str; 4] = ["skills", "domains", "locators", "features"];

pub struct RoutingHost {
    local_id: PeerId,
    router: Arc<RwLock<KademliaRouter>>,
    local: LocalLabelStore,
    remote_cache: Arc<RemoteLabelCache>,
    transport: Arc<dyn PeerTransport>,
}

impl RoutingHost {
    pub fn new(
        local_id: PeerId,
        k_bucket_size: usize,
        local: LocalLabelStore,
        transport: Arc<dyn PeerTransport>,
    ) -> Self {
        Self {
            local_id,
            router: Arc::new(RwLock::new(KademliaRouter::new(local_id, k_bucket_size))),
            local,
            remote_cache: Arc::new(RemoteLabelCache::new()),
            transport,
        }
    }

    pub fn local_id(&self) -> PeerId {
        self.local_id
    }

    pub fn router(&self) -> &Arc<RwLock<KademliaRouter>> {
        &self.router
    }

    pub fn remote_cache(&self) -> &Arc<RemoteLabelCache> {
        &self.remote_cache
    }

    /// Local write, then (only if the routing table has a peer) a provider
    /// announcement. Idempotent per `LocalLabelStore::publish`.
    pub async fn publish(&self, cid: &str, record: &Record) -> Result<bool, RoutingError> {
        let wrote = self.local.publish(cid, record)?;
        provide(self.transport.as_ref(), &self.router, cid).await;
        Ok(wrote)
    }

    pub fn unpublish(&self, cid: &str, record: &Record) -> Result<bool, RoutingError> {
        self.local.unpublish(cid, record)
    }

    pub fn list_local(&self, terms: &[(&str, &str)]) -> Result<Vec<String>, RoutingError> {
        self.local.list(terms)
    }

    /// Current per-namespace label counts, for the facade's published-label
    /// gauge (spec.md §4.4 "per-label counter").
    pub fn label_counts(&self) -> Result<std::collections::HashMap<String, i64>, RoutingError> {
        self.local.label_counts()
    }

    /// Handle an inbound provider announcement, after the mandatory
    /// fraud-check (Lookup then Pull against the announcer).
    pub async fn receive_announcement(
        &self,
        decode: impl Fn(&[u8]) -> Option<Record>,
        peer: &str,
        cid: &str,
    ) {
        handle_announcement(self.transport.as_ref(), &self.remote_cache, decode, peer, cid).await;
    }

    /// `Search(queries, limit, minMatchScore)` over the remote-label cache.
    pub fn search_remote(
        &self,
        queries: &[String],
        limit: usize,
        min_match_score: usize,
    ) -> Vec<(String, String, Vec<String>, usize)> {
        let self_peer = self.local_id.to_string();
        self.remote_cache.search(
            &self_peer,
            queries,
            limit,
            min_match_score.max(DEFAULT_MIN_MATCH_SCORE),
        )
    }

    /// Re-extract and re-cache labels for a record this node already holds
    /// under its own peer id, so `search_remote` can also surface local
    /// content the same way it surfaces a peer's. Only used when a caller
    /// explicitly wants locally-held content represented in the cache
    /// (the default facade path answers local queries via `list_local`
    /// instead and never calls this).
    pub fn mirror_local_into_cache(&self, cid: &str, record: &Record) {
        let labels = extract_labels(record);
        self.remote_cache.insert(cid, &self.local_id.to_string(), labels, now_unix());
    }

    /// Spawn the republish and cleanup background loops. Both wake on
    /// either their tick or `shutdown`, never sleeping unconditionally.
    pub fn spawn_background_loops(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Vec<tokio::task::JoinHandle<()>> {
        let republish_host = Arc::clone(self);
        let mut republish_shutdown = shutdown.clone();
        let republish = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(LABEL_REPUBLISH_INTERVAL_SECS));
            ticker.tick().await; // first tick fires immediately; skip it
            info!("republish loop started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match republish_host.local.list(&[]) {
                            Ok(cids) => {
                                for cid in cids {
                                    provide(republish_host.transport.as_ref(), &republish_host.router, &cid).await;
                                }
                            }
                            Err(e) => warn!(error = %e, "republish loop: failed to list local records, skipping this tick"),
                        }
                    }
                    _ = republish_shutdown.changed() => {
                        if *republish_shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("republish loop stopped");
        });

        let cleanup_cache = Arc::clone(&self.remote_cache);
        let cleanup = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(REMOTE_LABEL_CLEANUP_INTERVAL_SECS));
            ticker.tick().await;
            info!("remote-label cleanup loop started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = cleanup_cache.cleanup(now_unix());
                        if evicted > 0 {
                            info!(evicted, "cleaned up stale remote-label cache entries");
                        }
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("remote-label cleanup loop stopped");
        });

        vec![republish, cleanup]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalLabelStore;
    use crate::transport::{ListItem, ListRequest, PeerMetadata};
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Utc;
    use std::collections::BTreeMap;

    struct NoopTransport;

    #[async_trait]
    impl PeerTransport for NoopTransport {
        async fn lookup(&self, _peer: &str, _cid: &str) -> Result<PeerMetadata, RoutingError> {
            Err(RoutingError::Unavailable("no peers in test".into()))
        }
        async fn pull(&self, _peer: &str, _cid: &str) -> Result<Bytes, RoutingError> {
            Err(RoutingError::Unavailable("no peers in test".into()))
        }
        async fn list(&self, _peer: &str, _request: ListRequest) -> Result<Vec<ListItem>, RoutingError> {
            Ok(vec![])
        }
    }

    fn record() -> Record {
        Record {
            name: "n".into(),
            version: "v1.0.0".into(),
            schema_version: "v1alpha2".into(),
            created_at: Utc::now(),
            authors: vec![],
            description: "".into(),
            skills: vec![],
            locators: vec![],
            modules: vec![],
            domains: vec![],
            signature: None,
            annotations: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn publish_with_no_peers_does_not_call_transport() {
        let host = RoutingHost::new(
            PeerId([0u8; 32]),
            20,
            LocalLabelStore::open_in_memory().unwrap(),
            Arc::new(NoopTransport),
        );
        assert!(host.publish("cid1", &record()).await.unwrap());
    }

    #[tokio::test]
    async fn search_remote_excludes_local_mirror() {
        let host = RoutingHost::new(
            PeerId([0u8; 32]),
            20,
            LocalLabelStore::open_in_memory().unwrap(),
            Arc::new(NoopTransport),
        );
        host.mirror_local_into_cache("cid1", &record());
        assert!(host.search_remote(&["/skills/x".to_string()], 10, 1).is_empty());
    }
}
