//! The `v1alpha1` "agent" wire schema: the leaner, earlier record shape.
//! Skills and locators carry fewer optional fields than `v1alpha2`; those
//! fields are simply absent from this struct rather than defaulted, and the
//! `RecordData` impl below surfaces that absence as `None`/empty rather
//! than synthesizing a placeholder.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Domain, Locator, Module, Signature, Skill};
use crate::record_data::RecordData;

/// `v1alpha1` reuses the canonical `Skill`/`Locator`/`Module` shapes
/// directly: the fields `v1alpha1` lacks (`annotations`, locator `size`/
/// `digest`) are `Option`/`#[serde(default)]` on those types already, so a
/// `v1alpha1` document simply omits them rather than needing a bespoke
/// leaner struct per field. `extensions` is this schema's name for what
/// `v1alpha2` calls `modules`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentV1Alpha1 {
    pub name: String,
    pub version: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub locators: Vec<Locator>,
    #[serde(default)]
    pub extensions: Vec<Module>,
    pub signature: Option<Signature>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl RecordData for AgentV1Alpha1 {
    fn name(&self) -> &str {
        &self.name
    }
    fn version(&self) -> &str {
        &self.version
    }
    fn schema_version(&self) -> &str {
        "v1alpha1"
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
        &self.extensions
    }
    fn domains(&self) -> &[Domain] {
        // v1alpha1 has no domains sequence at all; absent, not defaulted.
        &[]
    }
    fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }
    fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_canonical_leaves_missing_fields_empty_not_defaulted() {
        let agent = AgentV1Alpha1 {
            name: "http://example.com/agents/a".into(),
            version: "v1.0.0".into(),
            created_at: Utc::now(),
            authors: vec!["alice".into()],
            description: "".into(),
            skills: vec![Skill { id: 1, name: "text".into(), annotations: BTreeMap::new() }],
            locators: vec![Locator {
                locator_type: "docker_image".into(),
                url: "x".into(),
                size: None,
                digest: None,
                annotations: BTreeMap::new(),
            }],
            extensions: vec![],
            signature: None,
            annotations: BTreeMap::new(),
        };
        let record = agent.to_canonical();
        assert_eq!(record.locators[0].size, None);
        assert_eq!(record.locators[0].digest, None);
        assert!(record.domains.is_empty());
    }
}
