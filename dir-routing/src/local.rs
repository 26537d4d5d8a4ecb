//! Local label index: a key-value projection over all locally-held records,
//! used to answer label queries without touching the relational index.
//! Backed by `sled` so label writes are crash-consistent without a
//! hand-rolled write-ahead log.

use std::collections::HashMap;

use dir_types::Record;
use tracing::{debug, info};

use crate::error::RoutingError;

/// `Publish`/`Unpublish` extract one label per entry in these fields,
/// prefixed with the namespace below.
fn labels_for(record: &Record) -> Vec<(&'static str, String)> {
    let mut labels = Vec::new();
    for skill in &record.skills {
        labels.push(("skills", skill.name.clone()));
    }
    for domain in &record.domains {
        labels.push(("domains", domain.name.clone()));
    }
    for locator in &record.locators {
        labels.push(("locators", locator.locator_type.clone()));
    }
    for module in &record.modules {
        labels.push(("features", module.name.clone()));
    }
    labels
}

fn label_key(namespace: &str, label: &str, cid: &str) -> Vec<u8> {
    format!("/{namespace}/{label}/{cid}").into_bytes()
}

fn counter_key(namespace: &str, label: &str) -> Vec<u8> {
    format!("/counters/{namespace}/{label}").into_bytes()
}

fn record_key(cid: &str) -> Vec<u8> {
    format!("/records/{cid}").into_bytes()
}

pub struct LocalLabelStore {
    db: sled::Db,
}

impl LocalLabelStore {
    pub fn open(path: &std::path::Path) -> Result<Self, RoutingError> {
        Ok(Self { db: sled::open(path)? })
    }

    pub fn open_in_memory() -> Result<Self, RoutingError> {
        Ok(Self { db: sled::Config::new().temporary(true).open()? })
    }

    fn bump_counter(&self, namespace: &str, label: &str, delta: i64) -> Result<(), RoutingError> {
        let key = counter_key(namespace, label);
        self.db.update_and_fetch(key, |old| {
            let current = old
                .and_then(|bytes| bytes.try_into().ok())
                .map(i64::from_le_bytes)
                .unwrap_or(0);
            let next = (current + delta).max(0);
            Some(next.to_le_bytes().to_vec())
        })?;
        Ok(())
    }

    fn read_counter(&self, namespace: &str, label: &str) -> Result<i64, RoutingError> {
        let key = counter_key(namespace, label);
        Ok(self
            .db
            .get(key)?
            .and_then(|bytes| bytes.as_ref().try_into().ok())
            .map(i64::from_le_bytes)
            .unwrap_or(0))
    }

    /// Idempotent: if `/records/<cid>` already exists, returns without
    /// touching the database again.
    pub fn publish(&self, cid: &str, record: &Record) -> Result<bool, RoutingError> {
        let rk = record_key(cid);
        if self.db.contains_key(&rk)? {
            debug!(cid, "publish is a no-op, record already published");
            return Ok(false);
        }

        let mut batch = sled::Batch::default();
        batch.insert(rk, &[][..]);
        for (namespace, label) in labels_for(record) {
            batch.insert(label_key(namespace, &label, cid), &[][..]);
        }
        self.db.apply_batch(batch)?;

        for (namespace, label) in labels_for(record) {
            self.bump_counter(namespace, &label, 1)?;
        }

        info!(cid, "published record to local label index");
        Ok(true)
    }

    pub fn unpublish(&self, cid: &str, record: &Record) -> Result<bool, RoutingError> {
        let rk = record_key(cid);
        if !self.db.contains_key(&rk)? {
            return Ok(false);
        }

        let mut batch = sled::Batch::default();
        batch.remove(rk);
        for (namespace, label) in labels_for(record) {
            batch.remove(label_key(namespace, &label, cid));
        }
        self.db.apply_batch(batch)?;

        for (namespace, label) in labels_for(record) {
            self.bump_counter(namespace, &label, -1)?;
        }

        info!(cid, "unpublished record from local label index");
        Ok(true)
    }

    pub fn is_published(&self, cid: &str) -> Result<bool, RoutingError> {
        Ok(self.db.contains_key(record_key(cid))?)
    }

    /// Resolve every `(namespace, label)` query term against the label
    /// index: the cheapest (lowest-count) term is scanned, and the rest are
    /// applied as an AND filter over each candidate CID.
    pub fn list(&self, terms: &[(&str, &str)]) -> Result<Vec<String>, RoutingError> {
        if terms.is_empty() {
            return self.all_published_cids();
        }

        let mut counts: Vec<(usize, &str, &str)> = Vec::with_capacity(terms.len());
        for &(namespace, label) in terms {
            let count = self.read_counter(namespace, label)? as usize;
            counts.push((count, namespace, label));
        }
        counts.sort_by_key(|(count, _, _)| *count);
        let (scan_namespace, scan_label) = (counts[0].1, counts[0].2);
        let remaining = &counts[1..];

        let prefix = format!("/{scan_namespace}/{scan_label}/");
        let mut candidates = Vec::new();
        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let key_str = String::from_utf8_lossy(&key);
            if let Some(cid) = key_str.rsplit('/').next() {
                candidates.push(cid.to_string());
            }
        }

        if remaining.is_empty() {
            return Ok(candidates);
        }

        let mut matched = Vec::new();
        'candidate: for cid in candidates {
            for &(_, namespace, label) in remaining {
                let key = label_key(namespace, label, &cid);
                if !self.db.contains_key(&key)? {
                    continue 'candidate;
                }
            }
            matched.push(cid);
        }
        Ok(matched)
    }

    fn all_published_cids(&self) -> Result<Vec<String>, RoutingError> {
        let mut out = Vec::new();
        for item in self.db.scan_prefix(b"/records/") {
            let (key, _) = item?;
            let key_str = String::from_utf8_lossy(&key);
            if let Some(cid) = key_str.strip_prefix("/records/") {
                out.push(cid.to_string());
            }
        }
        Ok(out)
    }

    pub fn label_counts(&self) -> Result<HashMap<String, i64>, RoutingError> {
        let mut out = HashMap::new();
        for item in self.db.scan_prefix(b"/counters/") {
            let (key, value) = item?;
            let key_str = String::from_utf8_lossy(&key).to_string();
            if let Ok(bytes) = value.as_ref().try_into() {
                out.insert(key_str, i64::from_le_bytes(bytes));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dir_types::{Domain, Locator, Skill};
    use std::collections::BTreeMap;

    fn record(skill_name: &str, domain_name: &str) -> Record {
        Record {
            name: "n".into(),
            version: "v1.0.0".into(),
            schema_version: "v1alpha2".into(),
            created_at: Utc::now(),
            authors: vec![],
            description: "".into(),
            skills: vec![Skill { id: 1, name: skill_name.into(), annotations: BTreeMap::new() }],
            locators: vec![Locator {
                locator_type: "docker_image".into(),
                url: "x".into(),
                size: None,
                digest: None,
                annotations: BTreeMap::new(),
            }],
            modules: vec![],
            domains: vec![Domain { id: 1, name: domain_name.into() }],
            signature: None,
            annotations: BTreeMap::new(),
        }
    }

    #[test]
    fn publish_is_idempotent() {
        let store = LocalLabelStore::open_in_memory().unwrap();
        let rec = record("nlp", "healthcare");
        assert!(store.publish("cid1", &rec).unwrap());
        assert!(!store.publish("cid1", &rec).unwrap());
        assert_eq!(store.label_counts().unwrap().get("/counters/skills/nlp"), Some(&1));
    }

    #[test]
    fn unpublish_removes_labels_and_decrements_counters() {
        let store = LocalLabelStore::open_in_memory().unwrap();
        let rec = record("nlp", "healthcare");
        store.publish("cid1", &rec).unwrap();
        assert!(store.unpublish("cid1", &rec).unwrap());
        assert!(!store.is_published("cid1").unwrap());
        assert_eq!(store.list(&[("skills", "nlp")]).unwrap().len(), 0);
    }

    #[test]
    fn list_ands_multiple_terms() {
        let store = LocalLabelStore::open_in_memory().unwrap();
        store.publish("cid1", &record("nlp", "healthcare")).unwrap();
        store.publish("cid2", &record("nlp", "finance")).unwrap();

        let matches = store.list(&[("skills", "nlp"), ("domains", "healthcare")]).unwrap();
        assert_eq!(matches, vec!["cid1".to_string()]);
    }

    #[test]
    fn list_with_no_terms_returns_all_published() {
        let store = LocalLabelStore::open_in_memory().unwrap();
        store.publish("cid1", &record("nlp", "healthcare")).unwrap();
        store.publish("cid2", &record("vision", "finance")).unwrap();
        let mut all = store.list(&[]).unwrap();
        all.sort();
        assert_eq!(all, vec!["cid1".to_string(), "cid2".to_string()]);
    }
}
