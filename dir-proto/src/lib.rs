//! Generated gRPC message and service types for the directory facade
//! (spec.md §4.7), plus conversions to and from the Rust-native types
//! `dir-index` and `dir-routing` already work in.

pub mod dir {
    pub mod v1 {
        tonic::include_proto!("dir.v1");
    }
}

pub use dir::v1::*;

impl From<SearchRequest> for dir_index::SearchFilter {
    fn from(req: SearchRequest) -> Self {
        dir_index::SearchFilter {
            names: req.names,
            skill_names: req.skill_names,
            locator_types: req.locator_types,
            locator_urls: req.locator_urls,
            module_names: req.module_names,
            domain_names: req.domain_names,
            authors: req.authors,
            versions: req.versions,
            schema_versions: req.schema_versions,
            created_ats: req.created_ats,
            skill_ids: req.skill_ids,
            module_ids: req.module_ids,
            domain_ids: req.domain_ids,
            verified: req.verified,
            limit: if req.limit > 0 { req.limit } else { 100 },
            offset: req.offset,
        }
    }
}

impl From<dir_index::RecordSummary> for RecordSummary {
    fn from(row: dir_index::RecordSummary) -> Self {
        RecordSummary {
            cid: row.cid,
            name: row.name,
            version: row.version,
            schema_version: row.schema_version,
            oasf_created_at: row.oasf_created_at,
            created_at: row.created_at,
        }
    }
}

impl From<String> for RecordRef {
    fn from(cid: String) -> Self {
        RecordRef { cid }
    }
}
