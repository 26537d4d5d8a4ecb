//! Schema-version dispatch: sniff `schema_version` from the raw JSON and
//! deserialize through the matching adapter, then materialize the
//! canonical `Record`.

use crate::error::TypesError;
use crate::record::Record;
use crate::record_data::RecordData;
use crate::v1alpha1::AgentV1Alpha1;
use crate::v1alpha2::{OasfRecord, RecordV1Alpha2};

/// Decode a pushed record's bytes into the canonical `Record` shape,
/// dispatching on the wire `schema_version` tag.
pub fn decode_record(bytes: &[u8]) -> Result<Record, TypesError> {
    let probe: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| TypesError::Malformed(e.to_string()))?;
    let schema_version = probe
        .get("schema_version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| TypesError::Malformed("missing schema_version field".to_string()))?;

    match schema_version {
        "v1alpha1" => {
            let agent: AgentV1Alpha1 =
                serde_json::from_value(probe).map_err(|e| TypesError::Malformed(e.to_string()))?;
            Ok(agent.to_canonical())
        }
        "v1alpha2" => {
            let record: RecordV1Alpha2 =
                serde_json::from_value(probe).map_err(|e| TypesError::Malformed(e.to_string()))?;
            Ok(record.to_canonical())
        }
        other => {
            // Any other non-empty schema_version is treated as an OASF
            // record (e.g. "0.3.0", "0.8.0") carrying the full v1alpha2
            // field set under its own version tag.
            if other.is_empty() {
                return Err(TypesError::UnsupportedSchemaVersion(other.to_string()));
            }
            let record: OasfRecord =
                serde_json::from_value(probe).map_err(|e| TypesError::Malformed(e.to_string()))?;
            Ok(record.to_canonical())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_oasf_schema_version() {
        let json = serde_json::json!({
            "name": "http://example.com/agents/a",
            "version": "v4.0.0",
            "schema_version": "0.8.0",
            "created_at": "2024-01-01T00:00:00Z",
            "authors": ["alice"],
            "description": "test",
            "skills": [{"id": 10201, "name": "text-completion"}],
            "locators": [{"type": "docker_image", "url": "docker.io/x"}],
            "modules": [],
            "domains": [],
            "annotations": {}
        });
        let record = decode_record(&serde_json::to_vec(&json).unwrap()).unwrap();
        assert_eq!(record.schema_version, "0.8.0");
        assert_eq!(record.skills[0].id, 10201);
    }

    #[test]
    fn missing_schema_version_is_malformed() {
        let json = serde_json::json!({"name": "x"});
        let err = decode_record(&serde_json::to_vec(&json).unwrap()).unwrap_err();
        assert!(matches!(err, TypesError::Malformed(_)));
    }
}
