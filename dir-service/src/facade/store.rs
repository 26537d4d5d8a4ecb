//! `Store` RPC: streamed push/pull over `dir-store`, kept in sync with
//! `dir-index`'s relational projection.

use std::pin::Pin;

use dir_proto::dir::v1::store_server::Store;
use dir_proto::dir::v1::{DeleteResponse, LookupRequest, LookupResponse, PullChunk, PushChunk, PushResponse, RecordRef};
use dir_types::{decode_record, RecordEvent};
use futures::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};

use crate::error::ServiceError;
use crate::state::AppState;

pub struct StoreService {
    state: AppState,
}

impl StoreService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

type PullStream = Pin<Box<dyn Stream<Item = Result<PullChunk, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl Store for StoreService {
    async fn push(&self, request: Request<Streaming<PushChunk>>) -> Result<Response<PushResponse>, Status> {
        let mut stream = request.into_inner();
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?.data);
        }

        let record = decode_record(&buf).map_err(ServiceError::from)?;
        let cid = self.state.store.push_bytes(&buf).await.map_err(ServiceError::from)?;
        dir_index::populate_record(&self.state.index, &cid.to_string(), &record)
            .await
            .map_err(ServiceError::from)?;
        self.state.events.publish(RecordEvent::RecordPushed { cid: cid.to_string() });
        crate::metrics::record_rpc("Store", "Push", "client_streaming", 0);

        Ok(Response::new(PushResponse { cid: cid.to_string() }))
    }

    type PullStream = PullStream;

    async fn pull(&self, request: Request<RecordRef>) -> Result<Response<Self::PullStream>, Status> {
        let reference = dir_types::RecordRef::new(request.into_inner().cid);
        let stream = self.state.store.pull(&reference).await.map_err(ServiceError::from)?;
        crate::metrics::record_rpc("Store", "Pull", "server_streaming", 0);
        let mapped = stream.map(|chunk| {
            chunk
                .map(|bytes| PullChunk { data: bytes.to_vec() })
                .map_err(|e| Status::from(ServiceError::from(e)))
        });
        Ok(Response::new(Box::pin(mapped)))
    }

    async fn lookup(&self, request: Request<LookupRequest>) -> Result<Response<LookupResponse>, Status> {
        let reference = dir_types::RecordRef::new(request.into_inner().cid);
        let meta = self.state.store.lookup(&reference).await.map_err(ServiceError::from)?;
        crate::metrics::record_rpc("Store", "Lookup", "unary", 0);
        Ok(Response::new(LookupResponse {
            content_type: meta.content_type,
            size: meta.size,
            digest: meta.digest,
            annotations: meta.annotations.into_iter().collect(),
        }))
    }

    async fn delete(&self, request: Request<RecordRef>) -> Result<Response<DeleteResponse>, Status> {
        let cid = request.into_inner().cid;
        let reference = dir_types::RecordRef::new(cid.clone());
        self.state.store.delete(&reference).await.map_err(ServiceError::from)?;
        dir_index::delete_record(&self.state.index, &cid).await.map_err(ServiceError::from)?;
        self.state.events.publish(RecordEvent::RecordDeleted { cid });
        crate::metrics::record_rpc("Store", "Delete", "unary", 0);
        Ok(Response::new(DeleteResponse {}))
    }
}
