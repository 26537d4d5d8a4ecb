//! Signature verification cache and `.well-known` name-ownership
//! verification (spec.md §4.6). The verification *rows* live in
//! `dir-index`'s `search.db`; this crate owns the logic that computes and
//! refreshes them.

pub mod error;
pub mod naming;
pub mod signature;
pub mod worker;

pub use error::VerifyError;
pub use naming::{is_verifiable_name, verify_name, WELL_KNOWN_FETCH_TIMEOUT};
pub use signature::{verify_and_cache, VerificationOutcome};
pub use worker::{RecordSource, DEFAULT_SWEEP_INTERVAL, DEFAULT_VERIFICATION_TTL};
