//! `Search` RPC: projects `SearchRequest` into `dir_index::SearchFilter`
//! and streams results back.

use std::pin::Pin;

use dir_proto::dir::v1::search_server::Search;
use dir_proto::dir::v1::{RecordRef, RecordSummary, SearchRequest};
use dir_index::SearchFilter;
use futures::Stream;
use tonic::{Request, Response, Status};

use crate::error::ServiceError;
use crate::state::AppState;

pub struct SearchService {
    state: AppState,
}

impl SearchService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

type SummaryStream = Pin<Box<dyn Stream<Item = Result<RecordSummary, Status>> + Send + 'static>>;
type CidStream = Pin<Box<dyn Stream<Item = Result<RecordRef, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl Search for SearchService {
    type GetRecordsStream = SummaryStream;
    type GetRecordCidsStream = CidStream;

    async fn get_records(&self, request: Request<SearchRequest>) -> Result<Response<Self::GetRecordsStream>, Status> {
        let filter: SearchFilter = request.into_inner().into();
        filter.validate().map_err(ServiceError::from)?;
        let rows = dir_index::search(&self.state.index, &filter).await.map_err(ServiceError::from)?;
        crate::metrics::record_rpc("Search", "GetRecords", "server_streaming", 0);
        let items: Vec<Result<RecordSummary, Status>> = rows.into_iter().map(|r| Ok(r.into())).collect();
        Ok(Response::new(Box::pin(futures::stream::iter(items))))
    }

    async fn get_record_cids(&self, request: Request<SearchRequest>) -> Result<Response<Self::GetRecordCidsStream>, Status> {
        let filter: SearchFilter = request.into_inner().into();
        filter.validate().map_err(ServiceError::from)?;
        let cids = dir_index::search_cids(&self.state.index, &filter).await.map_err(ServiceError::from)?;
        crate::metrics::record_rpc("Search", "GetRecordCids", "server_streaming", 0);
        let items: Vec<Result<RecordRef, Status>> = cids.into_iter().map(|cid| Ok(RecordRef { cid })).collect();
        Ok(Response::new(Box::pin(futures::stream::iter(items))))
    }
}
