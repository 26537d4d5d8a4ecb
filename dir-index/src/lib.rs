//! SQLite-backed relational search index: a projection of
//! pushed records kept in sync by `dir-service`, queried through
//! [`search`] and [`search_cids`].

pub mod error;
pub mod filter;
pub mod populate;
pub mod schema;
pub mod search;
pub mod verification;

#[cfg(test)]
pub mod test_support;

pub use error::IndexError;
pub use filter::{CompareOp, ComparisonTerm, SearchFilter};
pub use populate::{delete_record, populate_record};
pub use schema::init_schema;
pub use search::{search, search_cids, RecordSummary};
pub use verification::{
    get_name_verification, get_signature_verification, records_needing_name_verification,
    upsert_name_verification, upsert_signature_verification, NameVerificationRow,
    SignatureVerificationRow, VerificationStatus,
};
