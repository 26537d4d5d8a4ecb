//! Name-ownership verification: a record whose `name` is an `http(s)://`
//! URL is checked against the well-known document served by its authority
//! (spec.md §4.6, §6 "Well-known document").

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dir_index::{upsert_name_verification, NameVerificationRow, VerificationStatus};
use dir_types::Record;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::VerifyError;

/// Upper bound on the well-known-document fetch, composed with whatever
/// deadline the caller's context already carries.
pub const WELL_KNOWN_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct WellKnownDocument {
    #[allow(dead_code)]
    version: u32,
    keys: Vec<WellKnownKey>,
}

#[derive(Debug, Deserialize)]
struct WellKnownKey {
    id: Option<String>,
    #[serde(rename = "type")]
    key_type: String,
    #[serde(rename = "publicKey")]
    public_key: String,
}

fn well_known_url(name: &str) -> Result<String, VerifyError> {
    let parsed = url::Url::parse(name).map_err(|e| VerifyError::NotVerifiableName(e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(VerifyError::NotVerifiableName(name.to_string()));
    }
    let authority = parsed
        .host_str()
        .ok_or_else(|| VerifyError::NotVerifiableName(name.to_string()))?;
    let authority = match parsed.port() {
        Some(port) => format!("{authority}:{port}"),
        None => authority.to_string(),
    };
    Ok(format!("{}://{}/.well-known/oasf.json", parsed.scheme(), authority))
}

async fn fetch_well_known(client: &reqwest::Client, name: &str) -> Result<WellKnownDocument, VerifyError> {
    let url = well_known_url(name)?;
    let response = client
        .get(&url)
        .timeout(WELL_KNOWN_FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| VerifyError::FetchFailed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(VerifyError::FetchFailed(format!("{} returned {}", url, response.status())));
    }
    response
        .json::<WellKnownDocument>()
        .await
        .map_err(|e| VerifyError::MalformedDocument(e.to_string()))
}

/// Verify name ownership: fetch the well-known document for `record.name`'s
/// authority, and check whether any of its keys matches the public key
/// attached to the record's signature. Writes one cache row per record.
pub async fn verify_name(
    client: &reqwest::Client,
    pool: &SqlitePool,
    cid: &str,
    record: &Record,
) -> Result<NameVerificationRow, VerifyError> {
    let document = fetch_well_known(client, &record.name).await?;

    let signature = record.signature.as_ref();
    let signature_cert = signature.and_then(|s| s.certificate.as_deref());

    let mut last_error = "record has no attached signature certificate to match".to_string();
    let mut matched: Option<&WellKnownKey> = None;

    if let Some(cert_b64) = signature_cert {
        for key in &document.keys {
            match BASE64.decode(&key.public_key) {
                Ok(decoded) => {
                    let cert_decoded = BASE64.decode(cert_b64).unwrap_or_default();
                    if decoded == cert_decoded {
                        matched = Some(key);
                        break;
                    }
                }
                Err(e) => last_error = format!("well-known key {:?} is not valid base64: {e}", key.id),
            }
        }
        if matched.is_none() {
            last_error = "no well-known key matches the record's attached signature".to_string();
        }
    }

    let row = match matched {
        Some(key) => NameVerificationRow {
            record_cid: cid.to_string(),
            method: "wellknown".to_string(),
            key_id: key.id.clone(),
            status: VerificationStatus::Verified,
            error: None,
        },
        None => NameVerificationRow {
            record_cid: cid.to_string(),
            method: "wellknown".to_string(),
            key_id: None,
            status: VerificationStatus::Failed,
            error: Some(last_error),
        },
    };

    upsert_name_verification(pool, &row).await?;
    info!(cid, status = ?row.status, "name verification cached");
    Ok(row)
}

/// `true` iff `name` is a candidate for name verification at all (an
/// `http(s)://` URL). Non-candidates never get a verification row.
pub fn is_verifiable_name(name: &str) -> bool {
    name.starts_with("http://") || name.starts_with("https://")
}
