//! Content identifier computation: SHA-256 of the canonical bytes, wrapped
//! in a multihash, wrapped in a CIDv1 tagged with the record's codec.

use cid::Cid;
use multihash::Multihash;
use std::str::FromStr;

use crate::canonical::canonical_bytes;
use crate::error::TypesError;
use crate::record::Record;

/// SHA2-256 multicodec code, per the multiformats table.
const SHA2_256_CODE: u64 = 0x12;
/// dag-json multicodec code — the codec this crate tags every record CID
/// with, since canonical records are normalized JSON.
pub const RECORD_CODEC: u64 = 0x0129;

/// A content identifier over canonical record bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordCid(Cid);

impl RecordCid {
    pub fn into_inner(self) -> Cid {
        self.0
    }

    pub fn as_cid(&self) -> &Cid {
        &self.0
    }
}

impl std::fmt::Display for RecordCid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordCid {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cid::try_from(s)
            .map(RecordCid)
            .map_err(|e| TypesError::InvalidCid(e.to_string()))
    }
}

/// Hash arbitrary already-canonicalized bytes into a CID. Exposed so the
/// store can verify a pulled blob's digest without re-decoding the record.
pub fn cid_from_canonical_bytes(bytes: &[u8]) -> RecordCid {
    let digest = dir_crypto::sha256(bytes);
    let mh = Multihash::<64>::wrap(SHA2_256_CODE, &digest).expect("32-byte digest fits a 64-byte multihash");
    RecordCid(Cid::new_v1(RECORD_CODEC, mh))
}

/// Compute the CID of a record: canonicalize its JSON payload, then hash.
pub fn compute_cid(record: &Record) -> Result<RecordCid, TypesError> {
    let value = serde_json::to_value(record).map_err(|e| TypesError::Malformed(e.to_string()))?;
    let bytes = canonical_bytes(&value);
    Ok(cid_from_canonical_bytes(&bytes))
}
