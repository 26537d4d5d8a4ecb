//! The `RecordData` contract: one set of getters every schema adapter
//! implements directly. No adapter performs a lossy "convert-then-discard"
//! step; a field absent from a version's wire format simply returns `None`
//! or an empty collection, never a fabricated placeholder like `size: 0`
//! or an empty timestamp string.

use chrono::{DateTime, Utc};

use crate::record::{Domain, Locator, Module, Record, Signature, Skill};

/// Read-only view over a decoded record, independent of its wire schema
/// version. Every subsystem beyond decode (index, routing, verification)
/// programs against this trait, never against a concrete wire type.
pub trait RecordData {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn schema_version(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn authors(&self) -> &[String];
    fn description(&self) -> &str;
    fn skills(&self) -> &[Skill];
    fn locators(&self) -> &[Locator];
    fn modules(&self) -> &[Module];
    fn domains(&self) -> &[Domain];
    fn signature(&self) -> Option<&Signature>;
    fn annotations(&self) -> &std::collections::BTreeMap<String, String>;

    /// Materialize the canonical record used by the store/index/routing
    /// layers, by copying through the getters above.
    fn to_canonical(&self) -> Record {
        Record {
            name: self.name().to_string(),
            version: self.version().to_string(),
            schema_version: self.schema_version().to_string(),
            created_at: self.created_at(),
            authors: self.authors().to_vec(),
            description: self.description().to_string(),
            skills: self.skills().to_vec(),
            locators: self.locators().to_vec(),
            modules: self.modules().to_vec(),
            domains: self.domains().to_vec(),
            signature: self.signature().cloned(),
            annotations: self.annotations().clone(),
        }
    }
}

impl RecordData for Record {
    fn name(&self) -> &str {
        &self.name
    }
    fn version(&self) -> &str {
        &self.version
    }
    fn schema_version(&self) -> &str {
        &self.schema_version
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn authors(&self) -> &[String] {
        &self.authors
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn skills(&self) -> &[Skill] {
        &self.skills
    }
    fn locators(&self) -> &[Locator] {
        &self.locators
    }
    fn modules(&self) -> &[Module] {
        &self.modules
    }
    fn domains(&self) -> &[Domain] {
        &self.domains
    }
    fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }
    fn annotations(&self) -> &std::collections::BTreeMap<String, String> {
        &self.annotations
    }
}
