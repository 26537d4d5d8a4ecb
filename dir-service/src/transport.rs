//! [`PeerTransport`] implemented over `tonic` clients dialed per call.
//! `dir-routing` only sees the trait; this is the one place that turns a
//! `peer` string (a `host:port` address) into an actual network call.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dir_proto::dir::v1::routing_client::RoutingClient;
use dir_proto::dir::v1::store_client::StoreClient;
use dir_proto::dir::v1::{ListQueryRequest, LookupRequest, RecordRef as ProtoRecordRef, Term};
use dir_routing::{ListItem, ListRequest, PeerMetadata, PeerTransport, RoutingError, MAX_PULL_SIZE};
use futures::StreamExt;
use tonic::transport::Endpoint;

pub struct TonicPeerTransport {
    request_timeout: Duration,
}

impl TonicPeerTransport {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    fn endpoint(&self, peer: &str) -> Result<Endpoint, RoutingError> {
        let uri = format!("http://{peer}");
        Endpoint::from_shared(uri)
            .map(|e| e.timeout(self.request_timeout))
            .map_err(|e| RoutingError::InvalidArgument(format!("bad peer address {peer}: {e}")))
    }
}

#[async_trait]
impl PeerTransport for TonicPeerTransport {
    async fn lookup(&self, peer: &str, cid: &str) -> Result<PeerMetadata, RoutingError> {
        let endpoint = self.endpoint(peer)?;
        let mut client = StoreClient::connect(endpoint)
            .await
            .map_err(|e| RoutingError::Unavailable(format!("dial {peer}: {e}")))?;
        let response = client
            .lookup(LookupRequest { cid: cid.to_string() })
            .await
            .map_err(|e| RoutingError::Unavailable(format!("lookup against {peer}: {e}")))?
            .into_inner();
        Ok(PeerMetadata { content_type: response.content_type, size: response.size })
    }

    async fn pull(&self, peer: &str, cid: &str) -> Result<Bytes, RoutingError> {
        let endpoint = self.endpoint(peer)?;
        let mut client = StoreClient::connect(endpoint)
            .await
            .map_err(|e| RoutingError::Unavailable(format!("dial {peer}: {e}")))?;
        let mut stream = client
            .pull(ProtoRecordRef { cid: cid.to_string() })
            .await
            .map_err(|e| RoutingError::Unavailable(format!("pull against {peer}: {e}")))?
            .into_inner();

        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| RoutingError::Unavailable(format!("pull stream from {peer}: {e}")))?;
            if buf.len() as u64 + chunk.data.len() as u64 > MAX_PULL_SIZE {
                return Err(RoutingError::InvalidArgument(format!(
                    "pull from {peer} exceeds max pull size ({MAX_PULL_SIZE} bytes), discarding"
                )));
            }
            buf.extend_from_slice(&chunk.data);
        }
        Ok(Bytes::from(buf))
    }

    async fn list(&self, peer: &str, request: ListRequest) -> Result<Vec<ListItem>, RoutingError> {
        let endpoint = self.endpoint(peer)?;
        let mut client = RoutingClient::connect(endpoint)
            .await
            .map_err(|e| RoutingError::Unavailable(format!("dial {peer}: {e}")))?;

        let terms = request
            .terms
            .iter()
            .map(|(namespace, label)| Term { namespace: namespace.clone(), label: label.clone() })
            .collect();
        let mut stream = client
            .list_query(ListQueryRequest { terms, max_hops: request.max_hops as u32 })
            .await
            .map_err(|e| RoutingError::Unavailable(format!("list_query against {peer}: {e}")))?
            .into_inner();

        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            let item = item.map_err(|e| RoutingError::Unavailable(format!("list_query stream from {peer}: {e}")))?;
            items.push(ListItem { cid: item.cid, namespace: item.namespace, label: item.label });
        }
        Ok(items)
    }
}
