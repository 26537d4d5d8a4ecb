//! Peer-facing RPC surface. `dir-proto`/`dir-service` implement
//! [`PeerTransport`] over the wire; `dir-routing` only depends on the
//! trait, so the fraud-check and republish logic can be unit-tested
//! without a network.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::RoutingError;

#[derive(Debug, Clone)]
pub struct PeerMetadata {
    pub content_type: String,
    pub size: u64,
}

/// A single item of a cross-peer `List` response stream.
#[derive(Debug, Clone)]
pub struct ListItem {
    pub cid: String,
    pub namespace: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub terms: Vec<(String, String)>,
    pub max_hops: u8,
}

pub const MAX_HOP_BUDGET: u8 = 20;
pub const MAX_PULL_SIZE: u64 = 4 * 1024 * 1024;

#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn lookup(&self, peer: &str, cid: &str) -> Result<PeerMetadata, RoutingError>;

    async fn pull(&self, peer: &str, cid: &str) -> Result<Bytes, RoutingError>;

    async fn list(&self, peer: &str, request: ListRequest) -> Result<Vec<ListItem>, RoutingError>;
}

/// Decrement a forwarded `List` request's hop budget; `None` means drop it
/// Receivers decrement before forwarding and drop at zero.
pub fn decrement_hops(request: &ListRequest) -> Option<ListRequest> {
    if request.max_hops == 0 {
        return None;
    }
    Some(ListRequest { terms: request.terms.clone(), max_hops: request.max_hops - 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_budget_drops_at_zero() {
        let request = ListRequest { terms: vec![], max_hops: 0 };
        assert!(decrement_hops(&request).is_none());
    }

    #[test]
    fn hop_budget_decrements() {
        let request = ListRequest { terms: vec![], max_hops: 5 };
        let next = decrement_hops(&request).unwrap();
        assert_eq!(next.max_hops, 4);
    }
}
