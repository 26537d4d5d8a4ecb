//! `Sign` RPC: attach an ECDSA P-256 signature to a stored record and
//! re-push it, and re-run cached signature verification on demand.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use dir_proto::dir::v1::sign_server::Sign;
use dir_proto::dir::v1::{SignRequest, SignResponse, VerifySignatureRequest, VerifySignatureResponse};
use dir_types::{RecordEvent, Signature};
use tonic::{Request, Response, Status};

use crate::error::ServiceError;
use crate::state::AppState;

pub struct SignService {
    state: AppState,
}

impl SignService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl Sign for SignService {
    async fn sign(&self, request: Request<SignRequest>) -> Result<Response<SignResponse>, Status> {
        let req = request.into_inner();
        let reference = dir_types::RecordRef::new(req.cid.clone());
        let bytes = self.state.store.pull_bytes(&reference).await.map_err(|e| match e {
            dir_store::StoreError::NotFound(cid) => {
                Status::failed_precondition(format!("cannot sign: record not found: {cid}"))
            }
            other => Status::from(ServiceError::from(other)),
        })?;
        let mut record = dir_types::decode_record(&bytes).map_err(ServiceError::from)?;

        let key_der = tokio::fs::read(&req.key_path)
            .await
            .map_err(|e| Status::invalid_argument(format!("cannot read key at {}: {e}", req.key_path)))?;

        let unsigned = {
            let mut r = record.clone();
            r.signature = None;
            let value = serde_json::to_value(&r).expect("Record always serializes");
            dir_types::canonical::canonical_bytes(&value)
        };
        let signature_der = dir_crypto::verify::sign_ecdsa_p256(&key_der, &unsigned)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        let public_der = dir_crypto::verify::ecdsa_p256_public_key_der(&key_der)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        record.signature = Some(Signature {
            signed_at: Utc::now(),
            algorithm: "ecdsa-p256".to_string(),
            signature: BASE64.encode(signature_der),
            certificate: Some(BASE64.encode(public_der)),
            content_type: "application/json".to_string(),
            content_bundle: None,
        });

        let signed_bytes =
            serde_json::to_vec(&record).map_err(|e| Status::internal(format!("failed to serialize signed record: {e}")))?;
        let new_cid = self.state.store.push_bytes(&signed_bytes).await.map_err(ServiceError::from)?;
        dir_index::populate_record(&self.state.index, &new_cid.to_string(), &record)
            .await
            .map_err(ServiceError::from)?;
        self.state.events.publish(RecordEvent::RecordSigned { cid: new_cid.to_string() });
        crate::metrics::record_rpc("Sign", "Sign", "unary", 0);

        Ok(Response::new(SignResponse { cid: new_cid.to_string() }))
    }

    async fn verify(&self, request: Request<VerifySignatureRequest>) -> Result<Response<VerifySignatureResponse>, Status> {
        let cid = request.into_inner().cid;
        let reference = dir_types::RecordRef::new(cid.clone());
        let bytes = self.state.store.pull_bytes(&reference).await.map_err(ServiceError::from)?;
        let record = dir_types::decode_record(&bytes).map_err(ServiceError::from)?;

        let outcome = dir_verify::verify_and_cache(&self.state.index, &cid, &record, None)
            .await
            .map_err(ServiceError::from)?;
        crate::metrics::record_rpc("Sign", "Verify", "unary", 0);

        Ok(Response::new(VerifySignatureResponse {
            verified: outcome.status == dir_index::VerificationStatus::Verified,
            error: outcome.error_message.unwrap_or_default(),
        }))
    }
}
