//! The `v1alpha2` "record" wire schema: the full field set, including
//! per-skill/locator/module annotations and the `domains` sequence that
//! `v1alpha1` lacks entirely.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Domain, Locator, Module, Signature, Skill};
use crate::record_data::RecordData;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordV1Alpha2 {
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
    pub modules: Vec<Module>,
    #[serde(default)]
    pub domains: Vec<Domain>,
    pub signature: Option<Signature>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl RecordData for RecordV1Alpha2 {
    fn name(&self) -> &str {
        &self.name
    }
    fn version(&self) -> &str {
        &self.version
    }
    fn schema_version(&self) -> &str {
        "v1alpha2"
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
    fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }
}

/// The OASF on-wire schema (e.g. `schema_version: "0.8.0"`), which carries
/// the same field set as `v1alpha2` under the `oasf.agntcy.org` naming
/// convention, with an explicit `schema_version` field instead of the
/// `v1alphaN` tag. Test fixtures (`oasf_0.8.0_record_test.json`) use this
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OasfRecord {
    pub name: String,
    pub version: String,
    pub schema_version: String,
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
    pub modules: Vec<Module>,
    #[serde(default)]
    pub domains: Vec<Domain>,
    pub signature: Option<Signature>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl RecordData for OasfRecord {
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
    fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }
}
