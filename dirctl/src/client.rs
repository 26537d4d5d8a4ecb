//! Thin connection helpers: each subcommand dials only the service it
//! needs, rather than this crate holding one multiplexed client struct.

use dir_proto::dir::v1::events_client::EventsClient;
use dir_proto::dir::v1::naming_client::NamingClient;
use dir_proto::dir::v1::routing_client::RoutingClient;
use dir_proto::dir::v1::search_client::SearchClient;
use dir_proto::dir::v1::sign_client::SignClient;
use dir_proto::dir::v1::store_client::StoreClient;
use tonic::transport::Channel;

async fn endpoint(server: &str) -> anyhow::Result<Channel> {
    let uri = format!("http://{server}");
    Ok(tonic::transport::Endpoint::from_shared(uri)?.connect().await?)
}

pub async fn store(server: &str) -> anyhow::Result<StoreClient<Channel>> {
    Ok(StoreClient::new(endpoint(server).await?))
}

pub async fn search(server: &str) -> anyhow::Result<SearchClient<Channel>> {
    Ok(SearchClient::new(endpoint(server).await?))
}

pub async fn routing(server: &str) -> anyhow::Result<RoutingClient<Channel>> {
    Ok(RoutingClient::new(endpoint(server).await?))
}

pub async fn sign(server: &str) -> anyhow::Result<SignClient<Channel>> {
    Ok(SignClient::new(endpoint(server).await?))
}

pub async fn naming(server: &str) -> anyhow::Result<NamingClient<Channel>> {
    Ok(NamingClient::new(endpoint(server).await?))
}

#[allow(dead_code)]
pub async fn events(server: &str) -> anyhow::Result<EventsClient<Channel>> {
    Ok(EventsClient::new(endpoint(server).await?))
}
