//! Row-level access to the two verification caches.
//! `dir-verify` owns the verification logic; this module only knows how to
//! read and write the rows, since both caches live in the same `search.db`
//! as the rest of the projection.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::error::IndexError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    Verified,
    Failed,
}

impl VerificationStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "verified" => Self::Verified,
            _ => Self::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignatureVerificationRow {
    pub record_cid: String,
    pub signature_digest: String,
    pub status: VerificationStatus,
    pub error_message: Option<String>,
    pub signer_type: Option<String>,
    pub signer_issuer: Option<String>,
    pub signer_subject: Option<String>,
    pub signer_public_key: Option<String>,
}

#[allow(clippy::too_many_arguments)]
pub async fn upsert_signature_verification(pool: &SqlitePool, row: &SignatureVerificationRow) -> Result<(), IndexError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO signature_verifications
            (record_cid, signature_digest, status, error_message, signer_type, signer_issuer, signer_subject, signer_public_key, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
        ON CONFLICT(record_cid, signature_digest) DO UPDATE SET
            status = excluded.status,
            error_message = excluded.error_message,
            signer_type = excluded.signer_type,
            signer_issuer = excluded.signer_issuer,
            signer_subject = excluded.signer_subject,
            signer_public_key = excluded.signer_public_key,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&row.record_cid)
    .bind(&row.signature_digest)
    .bind(row.status.as_str())
    .bind(&row.error_message)
    .bind(&row.signer_type)
    .bind(&row.signer_issuer)
    .bind(&row.signer_subject)
    .bind(&row.signer_public_key)
    .bind(&now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_signature_verification(
    pool: &SqlitePool,
    record_cid: &str,
    signature_digest: &str,
) -> Result<Option<(SignatureVerificationRow, String)>, IndexError> {
    let row = sqlx::query(
        "SELECT * FROM signature_verifications WHERE record_cid = ?1 AND signature_digest = ?2",
    )
    .bind(record_cid)
    .bind(signature_digest)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| {
        (
            SignatureVerificationRow {
                record_cid: r.get("record_cid"),
                signature_digest: r.get("signature_digest"),
                status: VerificationStatus::parse(&r.get::<String, _>("status")),
                error_message: r.get("error_message"),
                signer_type: r.get("signer_type"),
                signer_issuer: r.get("signer_issuer"),
                signer_subject: r.get("signer_subject"),
                signer_public_key: r.get("signer_public_key"),
            },
            r.get::<String, _>("updated_at"),
        )
    }))
}

#[derive(Debug, Clone)]
pub struct NameVerificationRow {
    pub record_cid: String,
    pub method: String,
    pub key_id: Option<String>,
    pub status: VerificationStatus,
    pub error: Option<String>,
}

pub async fn upsert_name_verification(pool: &SqlitePool, row: &NameVerificationRow) -> Result<(), IndexError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO name_verifications (record_cid, method, key_id, status, error, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        ON CONFLICT(record_cid) DO UPDATE SET
            method = excluded.method,
            key_id = excluded.key_id,
            status = excluded.status,
            error = excluded.error,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&row.record_cid)
    .bind(&row.method)
    .bind(&row.key_id)
    .bind(row.status.as_str())
    .bind(&row.error)
    .bind(&now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_name_verification(pool: &SqlitePool, record_cid: &str) -> Result<Option<NameVerificationRow>, IndexError> {
    let row = sqlx::query("SELECT * FROM name_verifications WHERE record_cid = ?1")
        .bind(record_cid)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| NameVerificationRow {
        record_cid: r.get("record_cid"),
        method: r.get("method"),
        key_id: r.get("key_id"),
        status: VerificationStatus::parse(&r.get::<String, _>("status")),
        error: r.get("error"),
    }))
}

/// Signed records (`signed = true`) with a verifiable (`http(s)://`) name
/// whose name verification is absent or older than `ttl`.
pub async fn records_needing_name_verification(
    pool: &SqlitePool,
    ttl: chrono::Duration,
) -> Result<Vec<String>, IndexError> {
    let cutoff = (Utc::now() - ttl).to_rfc3339();
    let rows = sqlx::query(
        r#"
        SELECT r.cid AS cid FROM records r
        LEFT JOIN name_verifications nv ON nv.record_cid = r.cid
        WHERE r.signed = 1
          AND (r.name GLOB 'http://*' OR r.name GLOB 'https://*')
          AND (nv.record_cid IS NULL OR nv.updated_at < ?1)
        "#,
    )
    .bind(&cutoff)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.get::<String, _>("cid")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::populate::populate_record;
    use crate::schema::init_schema;
    use crate::test_support::test_pool;
    use dir_types::Record;
    use std::collections::BTreeMap;

    fn signed_record(name: &str) -> Record {
        Record {
            name: name.into(),
            version: "v1.0.0".into(),
            schema_version: "v1alpha2".into(),
            created_at: Utc::now(),
            authors: vec![],
            description: "".into(),
            skills: vec![],
            locators: vec![],
            modules: vec![],
            domains: vec![],
            signature: Some(dir_types::Signature {
                signed_at: Utc::now(),
                algorithm: "ecdsa-p256".into(),
                signature: "sig".into(),
                certificate: None,
                content_type: "application/json".into(),
                content_bundle: None,
            }),
            annotations: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn records_needing_verification_excludes_already_verified() {
        let pool = test_pool().await;
        init_schema(&pool).await.unwrap();
        populate_record(&pool, "cid1", &signed_record("http://example.com/a")).await.unwrap();

        let needing = records_needing_name_verification(&pool, chrono::Duration::hours(24)).await.unwrap();
        assert_eq!(needing, vec!["cid1".to_string()]);

        upsert_name_verification(
            &pool,
            &NameVerificationRow {
                record_cid: "cid1".into(),
                method: "wellknown".into(),
                key_id: Some("key-1".into()),
                status: VerificationStatus::Verified,
                error: None,
            },
        )
        .await
        .unwrap();

        let needing = records_needing_name_verification(&pool, chrono::Duration::hours(24)).await.unwrap();
        assert!(needing.is_empty());
    }

    #[tokio::test]
    async fn signature_verification_roundtrips() {
        let pool = test_pool().await;
        init_schema(&pool).await.unwrap();
        populate_record(&pool, "cid1", &signed_record("not-a-url")).await.unwrap();

        upsert_signature_verification(
            &pool,
            &SignatureVerificationRow {
                record_cid: "cid1".into(),
                signature_digest: "digest1".into(),
                status: VerificationStatus::Verified,
                error_message: None,
                signer_type: Some("ecdsa-p256".into()),
                signer_issuer: None,
                signer_subject: None,
                signer_public_key: Some("pk".into()),
            },
        )
        .await
        .unwrap();

        let (row, _) = get_signature_verification(&pool, "cid1", "digest1").await.unwrap().unwrap();
        assert_eq!(row.status, VerificationStatus::Verified);
    }
}
