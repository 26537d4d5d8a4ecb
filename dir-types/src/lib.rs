//! The record model: schema-version adapters behind one `RecordData`
//! contract, canonical JSON serialization, and CID computation.
//!
//! Every other crate in the workspace consumes records only through
//! `RecordData`, never through a specific wire schema.

pub mod canonical;
pub mod cid;
pub mod decode;
pub mod error;
pub mod event;
pub mod record;
pub mod record_data;
pub mod v1alpha1;
pub mod v1alpha2;

pub use canonical::canonicalize_value;
pub use cid::{compute_cid, RecordCid};
pub use decode::decode_record;
pub use error::TypesError;
pub use event::RecordEvent;
pub use record::{Domain, Locator, Module, Record, RecordRef, Signature, Skill};
pub use record_data::RecordData;
