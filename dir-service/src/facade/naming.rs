//! `Naming` RPC: on-demand and cached well-known name-ownership checks.

use dir_proto::dir::v1::naming_server::Naming;
use dir_proto::dir::v1::{NamingVerifyRequest, NamingVerifyResponse};
use tonic::{Code, Request, Response, Status};

use crate::error::ServiceError;
use crate::state::AppState;

pub struct NamingService {
    state: AppState,
}

impl NamingService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl Naming for NamingService {
    /// Forces a fresh fetch of the well-known document and re-verifies.
    async fn verify(&self, request: Request<NamingVerifyRequest>) -> Result<Response<NamingVerifyResponse>, Status> {
        let cid = request.into_inner().cid;
        let reference = dir_types::RecordRef::new(cid.clone());
        let bytes = self.state.store.pull_bytes(&reference).await.map_err(ServiceError::from)?;
        let record = dir_types::decode_record(&bytes).map_err(ServiceError::from)?;

        let row = dir_verify::verify_name(&self.state.http_client, &self.state.index, &cid, &record)
            .await
            .map_err(ServiceError::from)?;
        crate::metrics::record_rpc("Naming", "Verify", "unary", 0);

        Ok(Response::new(NamingVerifyResponse {
            verified: row.status == dir_index::VerificationStatus::Verified,
            method: row.method,
            key_id: row.key_id.unwrap_or_default(),
            error: row.error.unwrap_or_default(),
        }))
    }

    /// Returns the last cached verification without re-fetching anything.
    async fn check(&self, request: Request<NamingVerifyRequest>) -> Result<Response<NamingVerifyResponse>, Status> {
        let cid = request.into_inner().cid;
        let row = dir_index::get_name_verification(&self.state.index, &cid).await.map_err(ServiceError::from)?;

        match row {
            Some(row) => {
                crate::metrics::record_rpc("Naming", "Check", "unary", 0);
                Ok(Response::new(NamingVerifyResponse {
                    verified: row.status == dir_index::VerificationStatus::Verified,
                    method: row.method,
                    key_id: row.key_id.unwrap_or_default(),
                    error: row.error.unwrap_or_default(),
                }))
            }
            None => {
                crate::metrics::record_rpc("Naming", "Check", "unary", Code::NotFound as i32);
                Err(Status::not_found(format!("no cached name verification for {cid}")))
            }
        }
    }
}
