//! `Routing` RPC: publish/unpublish a locally-held CID and answer
//! cross-peer term queries, forwarding with a decremented hop budget to
//! this node's own known peers (spec.md §4.5).

use std::pin::Pin;

use dir_proto::dir::v1::routing_server::Routing;
use dir_proto::dir::v1::{
    ListPeersRequest, ListPeersResponse, ListQueryItem, ListQueryRequest, PublishRequest, PublishResponse,
    RecordRef, UnpublishResponse,
};
use dir_routing::{ListRequest, PeerTransport};
use dir_types::RecordEvent;
use futures::Stream;
use tonic::{Request, Response, Status};

use crate::error::ServiceError;
use crate::state::AppState;

pub struct RoutingService {
    state: AppState,
}

impl RoutingService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

type PeersStream = Pin<Box<dyn Stream<Item = Result<ListPeersResponse, Status>> + Send + 'static>>;
type QueryStream = Pin<Box<dyn Stream<Item = Result<ListQueryItem, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl Routing for RoutingService {
    async fn publish(&self, request: Request<PublishRequest>) -> Result<Response<PublishResponse>, Status> {
        let req = request.into_inner();
        let reference = dir_types::RecordRef::new(req.cid.clone());
        let bytes = self.state.store.pull_bytes(&reference).await.map_err(ServiceError::from)?;
        let record = dir_types::decode_record(&bytes).map_err(ServiceError::from)?;

        self.state.routing.publish(&req.cid, &record).await.map_err(ServiceError::from)?;
        self.state.events.publish(RecordEvent::RecordPublished { cid: req.cid });
        report_label_gauges(&self.state);
        crate::metrics::record_rpc("Routing", "Publish", "unary", 0);
        Ok(Response::new(PublishResponse {}))
    }

    async fn unpublish(&self, request: Request<RecordRef>) -> Result<Response<UnpublishResponse>, Status> {
        let cid = request.into_inner().cid;
        let reference = dir_types::RecordRef::new(cid.clone());
        let bytes = self.state.store.pull_bytes(&reference).await.map_err(ServiceError::from)?;
        let record = dir_types::decode_record(&bytes).map_err(ServiceError::from)?;

        self.state.routing.unpublish(&cid, &record).map_err(ServiceError::from)?;
        self.state.events.publish(RecordEvent::RecordUnpublished { cid });
        report_label_gauges(&self.state);
        crate::metrics::record_rpc("Routing", "Unpublish", "unary", 0);
        Ok(Response::new(UnpublishResponse {}))
    }

    type ListPeersStream = PeersStream;

    async fn list_peers(&self, request: Request<ListPeersRequest>) -> Result<Response<Self::ListPeersStream>, Status> {
        let req = request.into_inner();
        let limit = if req.limit > 0 { req.limit as usize } else { 20 };
        let min_score = if req.min_match_score > 0 { req.min_match_score as usize } else { 1 };

        let matches = self.state.routing.search_remote(&[req.cid.clone()], limit, min_score);
        crate::metrics::record_rpc("Routing", "ListPeers", "server_streaming", 0);
        let items: Vec<Result<ListPeersResponse, Status>> = matches
            .into_iter()
            .map(|(cid, peer, queries, score)| {
                Ok(ListPeersResponse { cid, peer, matching_queries: queries, score: score as i32 })
            })
            .collect();
        Ok(Response::new(Box::pin(futures::stream::iter(items))))
    }

    type ListQueryStream = QueryStream;

    async fn list_query(&self, request: Request<ListQueryRequest>) -> Result<Response<Self::ListQueryStream>, Status> {
        let req = request.into_inner();
        let terms: Vec<(&str, &str)> = req.terms.iter().map(|t| (t.namespace.as_str(), t.label.as_str())).collect();

        let mut items = Vec::new();
        let local_matches = self.state.routing.list_local(&terms).map_err(ServiceError::from)?;
        for cid in local_matches {
            for term in &req.terms {
                items.push(ListQueryItem { cid: cid.clone(), namespace: term.namespace.clone(), label: term.label.clone() });
            }
        }

        if req.max_hops > 0 {
            let forward = ListRequest {
                terms: req.terms.iter().map(|t| (t.namespace.clone(), t.label.clone())).collect(),
                max_hops: (req.max_hops - 1).min(u8::MAX as u32) as u8,
            };
            let peers = self.state.routing.router().read().all_peers();
            for peer in peers {
                if let Ok(remote_items) = forward_to_peer(&self.state, &peer.address, &forward).await {
                    for item in remote_items {
                        items.push(ListQueryItem { cid: item.cid, namespace: item.namespace, label: item.label });
                    }
                }
            }
        }

        crate::metrics::record_rpc("Routing", "ListQuery", "server_streaming", 0);
        let results: Vec<Result<ListQueryItem, Status>> = items.into_iter().map(Ok).collect();
        Ok(Response::new(Box::pin(futures::stream::iter(results))))
    }
}

/// Sums `RoutingHost::label_counts()` per namespace and republishes the
/// gauges (spec.md §4.4 "per-label counter"). Best-effort: a datastore
/// read failure here must never fail the publish/unpublish it follows.
fn report_label_gauges(state: &AppState) {
    let Ok(counts) = state.routing.label_counts() else { return };
    for namespace in ["skills", "domains", "locators", "features"] {
        let prefix = format!("/counters/{namespace}/");
        let total: i64 = counts.iter().filter(|(k, _)| k.starts_with(&prefix)).map(|(_, v)| *v).sum();
        crate::metrics::set_label_gauge(namespace, total as f64);
    }
}

async fn forward_to_peer(
    state: &AppState,
    peer: &str,
    request: &ListRequest,
) -> Result<Vec<dir_routing::ListItem>, dir_routing::RoutingError> {
    state.transport.list(peer, request.clone()).await
}
