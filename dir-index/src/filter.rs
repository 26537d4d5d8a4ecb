//! Query language: wildcard string filters backed directly
//! by SQLite's `GLOB` operator (which already implements `*`/`?`/`[set]`/
//! `[^set]` shell-glob semantics, so no hand-rolled matcher is needed),
//! comparison-operator-prefixed ordered filters, and integer `IN` filters.
//! Multiple values within one field are OR'd; fields are AND'd together.

use std::cmp::Ordering;

use crate::error::IndexError;

/// A parsed `[op]value` ordered-filter term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone)]
pub struct ComparisonTerm {
    pub op: CompareOp,
    pub value: String,
}

impl ComparisonTerm {
    /// Parse a term such as `>=v3.0.0`. No recognized prefix means exact
    /// equality.
    pub fn parse(raw: &str) -> Self {
        for (prefix, op) in [
            (">=", CompareOp::Gte),
            ("<=", CompareOp::Lte),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
            ("=", CompareOp::Eq),
        ] {
            if let Some(rest) = raw.strip_prefix(prefix) {
                return Self { op, value: rest.to_string() };
            }
        }
        Self { op: CompareOp::Eq, value: raw.to_string() }
    }
}

/// Compare two version strings: semver-aware when both sides parse as
/// semver, lexicographic otherwise. A leading `v` is
/// stripped before the semver attempt since the corpus's versions use the
/// `vMAJOR.MINOR.PATCH` convention that `semver::Version` does not accept
/// directly.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let strip = |s: &str| s.strip_prefix('v').unwrap_or(s).to_string();
    match (semver::Version::parse(&strip(a)), semver::Version::parse(&strip(b))) {
        (Ok(va), Ok(vb)) => va.cmp(&vb),
        _ => a.cmp(b),
    }
}

/// Apply a parsed comparison term against a candidate value using
/// `compare_versions`-style semantics (shared by `versions` and
/// `schema_versions`, since OASF schema versions are also dotted triples).
pub fn matches_comparison(term: &ComparisonTerm, candidate: &str) -> bool {
    let ordering = compare_versions(candidate, &term.value);
    match term.op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
    }
}

/// Timestamps compare as RFC-3339 strings; since every timestamp here is
/// normalized to UTC, lexicographic string order already matches
/// chronological order.
pub fn matches_timestamp(term: &ComparisonTerm, candidate: &str) -> bool {
    let ordering = candidate.cmp(&term.value);
    match term.op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
    }
}

/// The full filter bundle accepted by `GetRecords`/`GetRecordCIDs`.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub names: Vec<String>,
    pub skill_names: Vec<String>,
    pub locator_types: Vec<String>,
    pub locator_urls: Vec<String>,
    pub module_names: Vec<String>,
    pub domain_names: Vec<String>,
    pub authors: Vec<String>,

    pub versions: Vec<String>,
    pub schema_versions: Vec<String>,
    pub created_ats: Vec<String>,

    pub skill_ids: Vec<i64>,
    pub module_ids: Vec<i64>,
    pub domain_ids: Vec<i64>,

    pub verified: Option<bool>,

    pub limit: i64,
    pub offset: i64,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self { limit: 100, ..Default::default() }
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.limit < 0 || self.offset < 0 {
            return Err(IndexError::InvalidFilter("limit/offset must be non-negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comparison_prefixes() {
        assert_eq!(ComparisonTerm::parse(">=v3.0.0").op, CompareOp::Gte);
        assert_eq!(ComparisonTerm::parse("<=v3.0.0").op, CompareOp::Lte);
        assert_eq!(ComparisonTerm::parse(">v3.0.0").op, CompareOp::Gt);
        assert_eq!(ComparisonTerm::parse("<v3.0.0").op, CompareOp::Lt);
        assert_eq!(ComparisonTerm::parse("v3.0.0").op, CompareOp::Eq);
    }

    #[test]
    fn semver_aware_comparison() {
        let term = ComparisonTerm::parse(">=v3.0.0");
        assert!(matches_comparison(&term, "v4.0.0"));
        assert!(matches_comparison(&term, "v3.0.0"));
        assert!(!matches_comparison(&term, "v2.9.0"));
    }

    #[test]
    fn falls_back_to_lexicographic_for_non_semver() {
        let term = ComparisonTerm::parse(">=release-3");
        assert!(matches_comparison(&term, "release-4"));
        assert!(!matches_comparison(&term, "release-2"));
    }
}
