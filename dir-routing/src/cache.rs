//! Remote-label cache: enhanced label entries learned from provider
//! announcements (`/<namespace>/<label>/<cid>/<peer>` → `{timestamp,
//! lastSeen}`), plus the search-over-cache scoring rule.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

pub const PROVIDER_RECORD_TTL_SECS: u64 = 48 * 3600;
pub const LABEL_REPUBLISH_INTERVAL_SECS: u64 = 36 * 3600;
pub const REMOTE_LABEL_CLEANUP_INTERVAL_SECS: u64 = 48 * 3600;
pub const DEFAULT_MIN_MATCH_SCORE: usize = 1;

pub fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[derive(Debug, Clone)]
pub struct RemoteLabelEntry {
    pub namespace: String,
    pub label: String,
    pub cid: String,
    pub peer: String,
    pub timestamp: u64,
    pub last_seen: u64,
}

/// Keyed by `(cid, peer)` since that's the unit a fraud-checked pull writes
/// and the cleanup loop evicts; a cid advertised by several peers has one
/// entry per peer, each carrying its own label set.
#[derive(Debug, Default)]
struct CacheRecord {
    labels: Vec<(String, String)>,
    timestamp: u64,
    last_seen: u64,
}

#[derive(Debug, Default)]
pub struct RemoteLabelCache {
    entries: RwLock<HashMap<(String, String), CacheRecord>>,
}

impl RemoteLabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, cid: &str, peer: &str) -> bool {
        self.entries.read().contains_key(&(cid.to_string(), peer.to_string()))
    }

    /// Refresh `lastSeen` only, for an announcement the cache already
    /// holds. No re-pull happens on a refresh.
    pub fn touch(&self, cid: &str, peer: &str, now: u64) -> bool {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(&(cid.to_string(), peer.to_string())) {
            entry.last_seen = now;
            true
        } else {
            false
        }
    }

    /// Insert the label set extracted from a freshly pulled record, after
    /// the caller has completed the mandatory fraud-check (Lookup + Pull).
    pub fn insert(&self, cid: &str, peer: &str, labels: Vec<(String, String)>, now: u64) {
        self.entries.write().insert(
            (cid.to_string(), peer.to_string()),
            CacheRecord { labels, timestamp: now, last_seen: now },
        );
    }

    /// Remove entries whose `lastSeen + ProviderRecordTTL < now`.
    pub fn cleanup(&self, now: u64) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, v| v.last_seen + PROVIDER_RECORD_TTL_SECS >= now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Match score: the number of distinct queries that match
    /// at least one of a record's cached labels. `self_peer` is excluded
    /// from the search since it names locally published records instead.
    pub fn search(
        &self,
        self_peer: &str,
        queries: &[String],
        limit: usize,
        min_match_score: usize,
    ) -> Vec<(String, String, Vec<String>, usize)> {
        let mut deduped: Vec<String> = Vec::new();
        for q in queries {
            if !deduped.contains(q) {
                deduped.push(q.clone());
            }
        }
        let threshold = min_match_score.max(DEFAULT_MIN_MATCH_SCORE);

        let entries = self.entries.read();
        let mut results: Vec<(String, String, Vec<String>, usize)> = Vec::new();
        for ((cid, peer), record) in entries.iter() {
            if peer == self_peer {
                continue;
            }
            let labels: Vec<String> =
                record.labels.iter().map(|(ns, label)| format!("/{ns}/{label}")).collect();
            let matching: Vec<String> =
                deduped.iter().filter(|q| labels.iter().any(|l| l == *q)).cloned().collect();
            if matching.len() >= threshold {
                results.push((cid.clone(), peer.clone(), matching, 0));
            }
        }
        for r in &mut results {
            r.3 = r.2.len();
        }
        results.sort_by(|a, b| b.3.cmp(&a.3));
        results.truncate(limit);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_refreshes_without_rewriting_labels() {
        let cache = RemoteLabelCache::new();
        cache.insert("cid1", "peerA", vec![("skills".into(), "nlp".into())], 100);
        assert!(cache.touch("cid1", "peerA", 200));
        assert!(!cache.touch("cid2", "peerA", 200));
    }

    #[test]
    fn cleanup_evicts_stale_entries() {
        let cache = RemoteLabelCache::new();
        cache.insert("cid1", "peerA", vec![], 0);
        let evicted = cache.cleanup(PROVIDER_RECORD_TTL_SECS + 1);
        assert_eq!(evicted, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn search_scores_by_distinct_matching_queries() {
        let cache = RemoteLabelCache::new();
        cache.insert(
            "cid1",
            "peerA",
            vec![("skills".into(), "nlp".into()), ("domains".into(), "healthcare".into())],
            0,
        );
        let results = cache.search("self", &["/skills/nlp".to_string(), "/domains/healthcare".to_string()], 10, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].3, 2);
    }

    #[test]
    fn search_excludes_self_peer() {
        let cache = RemoteLabelCache::new();
        cache.insert("cid1", "self", vec![("skills".into(), "nlp".into())], 0);
        let results = cache.search("self", &["/skills/nlp".to_string()], 10, 1);
        assert!(results.is_empty());
    }
}
