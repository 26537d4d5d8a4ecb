//! Kademlia routing table: k-buckets indexed by XOR-distance bit, each
//! holding at most `k` peers, oldest-contacted evicted first when full.

use std::collections::HashMap;

use crate::peer::{DhtNode, PeerId};

const NUM_BUCKETS: usize = 257;

#[derive(Debug, Clone)]
struct BucketEntry {
    node: DhtNode,
    last_contact: u64,
}

#[derive(Debug)]
pub struct KademliaRouter {
    local_id: PeerId,
    k: usize,
    buckets: Vec<Vec<BucketEntry>>,
}

impl KademliaRouter {
    pub fn new(local_id: PeerId, k: usize) -> Self {
        Self { local_id, k, buckets: (0..NUM_BUCKETS).map(|_| Vec::new()).collect() }
    }

    pub fn local_id(&self) -> PeerId {
        self.local_id
    }

    fn bucket_index(&self, peer_id: &PeerId) -> usize {
        self.local_id.distance(peer_id) as usize
    }

    /// Insert or refresh a peer. Returns `false` if the bucket was full of
    /// live peers and the new node was dropped (the caller may still choose
    /// to ping the bucket's least-recently-seen entry and retry).
    pub fn add_node(&mut self, node: DhtNode, now: u64) -> Result<bool, &'static str> {
        if node.peer_id == self.local_id {
            return Err("cannot add local node to routing table");
        }
        let idx = self.bucket_index(&node.peer_id);
        let bucket = &mut self.buckets[idx];

        if let Some(entry) = bucket.iter_mut().find(|e| e.node.peer_id == node.peer_id) {
            entry.last_contact = now;
            entry.node = node;
            return Ok(true);
        }

        if bucket.len() < self.k {
            bucket.push(BucketEntry { node, last_contact: now });
            return Ok(true);
        }

        Ok(false)
    }

    pub fn remove_node(&mut self, peer_id: &PeerId) {
        let idx = self.bucket_index(peer_id);
        self.buckets[idx].retain(|e| e.node.peer_id != *peer_id);
    }

    /// The `count` peers closest to `target`, ordered nearest-first. Used
    /// both for iterative lookups and for picking republish/gossip targets.
    pub fn closest_peers(&self, target: &PeerId, count: usize) -> Vec<DhtNode> {
        let mut all: Vec<(u32, DhtNode)> = self
            .buckets
            .iter()
            .flatten()
            .map(|e| (target.distance(&e.node.peer_id), e.node.clone()))
            .collect();
        all.sort_by_key(|(d, _)| *d);
        all.into_iter().take(count).map(|(_, n)| n).collect()
    }

    pub fn peer_count(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }

    pub fn all_peers(&self) -> Vec<DhtNode> {
        self.buckets.iter().flatten().map(|e| e.node.clone()).collect()
    }
}

/// Tracks per-peer failed-ping counts so a caller can decide when to evict
/// an unresponsive entry instead of refusing new peers outright.
#[derive(Debug, Default)]
pub struct FailureTracker {
    failures: HashMap<PeerId, u32>,
}

impl FailureTracker {
    pub const MAX_FAILURES: u32 = 3;

    pub fn record_failure(&mut self, peer_id: PeerId) -> u32 {
        let count = self.failures.entry(peer_id).or_insert(0);
        *count += 1;
        *count
    }

    pub fn clear(&mut self, peer_id: &PeerId) {
        self.failures.remove(peer_id);
    }

    pub fn is_dead(&self, peer_id: &PeerId) -> bool {
        self.failures.get(peer_id).copied().unwrap_or(0) >= Self::MAX_FAILURES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(byte: u8) -> DhtNode {
        let mut id = [0u8; 32];
        id[31] = byte;
        DhtNode { peer_id: PeerId(id), address: format!("127.0.0.1:{}", 9000 + byte as u16) }
    }

    #[test]
    fn rejects_local_node() {
        let mut router = KademliaRouter::new(PeerId([0u8; 32]), 20);
        assert!(router.add_node(node(0), 1).is_err());
    }

    #[test]
    fn closest_peers_orders_by_distance() {
        let mut router = KademliaRouter::new(PeerId([0u8; 32]), 20);
        router.add_node(node(8), 1).unwrap();
        router.add_node(node(1), 1).unwrap();
        router.add_node(node(4), 1).unwrap();

        let closest = router.closest_peers(&PeerId([0u8; 32]), 2);
        assert_eq!(closest.len(), 2);
        assert_eq!(closest[0].address, node(1).address);
    }

    #[test]
    fn bucket_full_drops_new_entry() {
        let mut router = KademliaRouter::new(PeerId([0u8; 32]), 1);
        // node(2) and node(3) share the same highest set bit position, so
        // they land in the same bucket relative to the all-zero local id.
        let a = node(2);
        let b = node(3);
        assert!(router.add_node(a, 1).unwrap());
        assert!(!router.add_node(b, 2).unwrap());
        assert_eq!(router.peer_count(), 1);
    }
}
