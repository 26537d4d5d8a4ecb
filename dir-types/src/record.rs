//! The canonical record shape. This is the in-memory representation every
//! subsystem downstream of decode (search index, routing, verification)
//! consumes, regardless of which wire schema version the bytes were pushed
//! as.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locator {
    #[serde(rename = "type")]
    pub locator_type: String,
    pub url: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Eq for Locator {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub signed_at: DateTime<Utc>,
    pub algorithm: String,
    pub signature: String,
    pub certificate: Option<String>,
    pub content_type: String,
    pub content_bundle: Option<String>,
}

/// The canonical record, assembled from any supported wire schema via
/// `RecordData` (see `record_data.rs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub version: String,
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub authors: Vec<String>,
    pub description: String,
    pub skills: Vec<Skill>,
    pub locators: Vec<Locator>,
    pub modules: Vec<Module>,
    pub domains: Vec<Domain>,
    pub signature: Option<Signature>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Record {
    /// Equality ignoring annotation *order* (both sides are `BTreeMap`s so
    /// ordering is already normalized) but not annotation values.
    pub fn semantically_eq(&self, other: &Record) -> bool {
        self == other
    }
}

/// The unique reference to a stored record, used everywhere a record is
/// named on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub cid: String,
}

impl RecordRef {
    pub fn new(cid: impl Into<String>) -> Self {
        Self { cid: cid.into() }
    }
}
