//! Signature verification: re-hash the canonical record (with the
//! `signature` field itself excluded, since that's what was signed before
//! the signature was attached), validate against a public key, and cache
//! the outcome keyed by `(record_cid, signature_digest)`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dir_crypto::verify::SignatureAlgorithm;
use dir_index::{upsert_signature_verification, SignatureVerificationRow, VerificationStatus};
use dir_types::Record;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::VerifyError;

/// The bytes a signature was computed over: the canonical form of the
/// record with `signature` cleared, matching the order signing happens in
/// (hash the unsigned content, then attach the signature).
fn signing_payload(record: &Record) -> Vec<u8> {
    let mut unsigned = record.clone();
    unsigned.signature = None;
    let value = serde_json::to_value(&unsigned).expect("Record always serializes");
    dir_types::canonical::canonical_bytes(&value)
}

pub struct VerificationOutcome {
    pub status: VerificationStatus,
    pub error_message: Option<String>,
}

/// Compute (or recompute) a signature verification and persist the result.
/// `public_key_der_or_raw` is the key to check against: DER
/// SubjectPublicKeyInfo for `ecdsa-p256`, raw 32 bytes for `ed25519`. When
/// `None`, the record's attached `certificate` field is used if present.
pub async fn verify_and_cache(
    pool: &SqlitePool,
    cid: &str,
    record: &Record,
    public_key: Option<&[u8]>,
) -> Result<VerificationOutcome, VerifyError> {
    let signature = record.signature.as_ref().ok_or(VerifyError::Unsigned)?;
    let signature_digest = dir_crypto::sha256_hex(signature.signature.as_bytes());

    let outcome = (|| -> Result<(), String> {
        let algorithm = SignatureAlgorithm::parse(&signature.algorithm).map_err(|e| e.to_string())?;

        let key_bytes = match public_key {
            Some(k) => k.to_vec(),
            None => {
                let cert = signature
                    .certificate
                    .as_ref()
                    .ok_or_else(|| "no public key supplied and record carries no certificate".to_string())?;
                BASE64.decode(cert).map_err(|e| format!("certificate is not valid base64: {e}"))?
            }
        };

        let sig_bytes = BASE64
            .decode(&signature.signature)
            .map_err(|e| format!("signature is not valid base64: {e}"))?;

        let payload = signing_payload(record);
        let ok = dir_crypto::verify::verify(algorithm, &key_bytes, &payload, &sig_bytes)
            .map_err(|e| e.to_string())?;
        if ok {
            Ok(())
        } else {
            Err("signature does not match the provided public key".to_string())
        }
    })();

    let (status, error_message) = match &outcome {
        Ok(()) => (VerificationStatus::Verified, None),
        Err(e) => (VerificationStatus::Failed, Some(e.clone())),
    };

    upsert_signature_verification(
        pool,
        &SignatureVerificationRow {
            record_cid: cid.to_string(),
            signature_digest,
            status: status.clone(),
            error_message: error_message.clone(),
            signer_type: Some(signature.algorithm.clone()),
            signer_issuer: None,
            signer_subject: None,
            signer_public_key: public_key.map(BASE64.encode),
        },
    )
    .await?;

    info!(cid, status = ?status, "signature verification cached");
    Ok(VerificationOutcome { status, error_message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dir_index::schema::init_schema;
    use dir_types::Signature;
    use p256::ecdsa::{signature::Signer, Signature as P256Signature, SigningKey};
    use p256::pkcs8::EncodePublicKey;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::collections::BTreeMap;

    async fn test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite always connects")
    }

    fn unsigned_record() -> Record {
        Record {
            name: "http://example.com/agents/a".into(),
            version: "v1.0.0".into(),
            schema_version: "v1alpha2".into(),
            created_at: Utc::now(),
            authors: vec!["alice".into()],
            description: "".into(),
            skills: vec![],
            locators: vec![],
            modules: vec![],
            domains: vec![],
            signature: None,
            annotations: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn valid_ecdsa_signature_verifies() {
        let pool = test_pool().await;
        init_schema(&pool).await.unwrap();

        let signing = SigningKey::random(&mut rand::rngs::OsRng);
        let public_der = signing.verifying_key().to_public_key_der().unwrap();

        let mut record = unsigned_record();
        let payload = signing_payload(&record);
        let sig: P256Signature = signing.sign(&payload);

        record.signature = Some(Signature {
            signed_at: Utc::now(),
            algorithm: "ecdsa-p256".into(),
            signature: BASE64.encode(sig.to_der().as_bytes()),
            certificate: None,
            content_type: "application/json".into(),
            content_bundle: None,
        });

        let outcome = verify_and_cache(&pool, "cid1", &record, Some(public_der.as_bytes())).await.unwrap();
        assert_eq!(outcome.status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn tampered_payload_fails_verification() {
        let pool = test_pool().await;
        init_schema(&pool).await.unwrap();

        let signing = SigningKey::random(&mut rand::rngs::OsRng);
        let public_der = signing.verifying_key().to_public_key_der().unwrap();

        let mut record = unsigned_record();
        let payload = signing_payload(&record);
        let sig: P256Signature = signing.sign(&payload);
        record.signature = Some(Signature {
            signed_at: Utc::now(),
            algorithm: "ecdsa-p256".into(),
            signature: BASE64.encode(sig.to_der().as_bytes()),
            certificate: None,
            content_type: "application/json".into(),
            content_bundle: None,
        });
        record.description = "tampered after signing".into();

        let outcome = verify_and_cache(&pool, "cid1", &record, Some(public_der.as_bytes())).await.unwrap();
        assert_eq!(outcome.status, VerificationStatus::Failed);
    }

    #[tokio::test]
    async fn unsigned_record_is_rejected() {
        let pool = test_pool().await;
        init_schema(&pool).await.unwrap();
        let err = verify_and_cache(&pool, "cid1", &unsigned_record(), None).await.unwrap_err();
        assert!(matches!(err, VerifyError::Unsigned));
    }
}
