//! The Agent Directory gRPC service facade: wires `dir-store`, `dir-index`,
//! `dir-routing`, and `dir-verify` behind the `tonic`-generated service
//! traits from `dir-proto`, and runs the ambient stack (config, metrics,
//! background loops) around them.

pub mod config;
pub mod error;
pub mod events;
pub mod facade;
pub mod metrics;
pub mod state;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use dir_identity::{PeerIdentity, PeerKeystore};
use dir_routing::{LocalLabelStore, PeerId, RoutingHost};
use dir_store::backend::fs::FsBackend;
use dir_store::ContentStore;
use dir_types::Record;
use dir_verify::RecordSource;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::watch;
use tonic::transport::Server;
use tracing::info;

use crate::config::DirConfig;
use crate::state::AppState;

struct StoreRecordSource {
    store: Arc<ContentStore>,
}

#[async_trait::async_trait]
impl RecordSource for StoreRecordSource {
    async fn load(&self, cid: &str) -> Option<Record> {
        let reference = dir_types::RecordRef::new(cid.to_string());
        let bytes = self.store.pull_bytes(&reference).await.ok()?;
        dir_types::decode_record(&bytes).ok()
    }
}

/// Build every long-lived subsystem from `config`, spawn the background
/// loops, and serve both the gRPC facade and the Prometheus endpoint until
/// `shutdown` fires.
pub async fn run(cfg: DirConfig, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&cfg.data_dir).await?;

    let db_path = cfg.data_dir.join("search.db");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await?;
    dir_index::init_schema(&pool).await?;

    let backend = Arc::new(FsBackend::new(cfg.data_dir.join("store")));
    let store = Arc::new(ContentStore::new(backend));

    let keystore = PeerKeystore::new(cfg.data_dir.join("identity.key"));
    let identity = Arc::new(keystore.load_or_generate(&cfg.identity_passphrase).await?);

    let local_labels = LocalLabelStore::open(&cfg.data_dir.join("labels"))?;
    let transport: Arc<dyn dir_routing::PeerTransport> =
        Arc::new(crate::transport::TonicPeerTransport::new(Duration::from_secs(cfg.peer_request_timeout_secs)));

    let local_id = PeerId::from_public_key(&identity.keypair().public_key().to_bytes());
    let routing = Arc::new(RoutingHost::new(local_id, cfg.k_bucket_size, local_labels, Arc::clone(&transport)));

    let http_client = reqwest::Client::new();
    let shared_config = crate::config::shared(cfg.clone());

    let state = AppState {
        store: Arc::clone(&store),
        index: pool.clone(),
        routing: Arc::clone(&routing),
        transport,
        events: events::EventBus::new(),
        config: shared_config,
        http_client: http_client.clone(),
        identity,
    };

    let mut handles = routing.spawn_background_loops(shutdown.clone());
    handles.push(dir_verify::worker::spawn(
        pool.clone(),
        http_client,
        Arc::new(StoreRecordSource { store }),
        chrono::Duration::hours(cfg.name_verification_ttl_hours),
        Duration::from_secs(3600),
        shutdown.clone(),
    ));

    let grpc_addr = cfg.listen_addr.parse()?;
    let metrics_addr = cfg.metrics_addr.parse()?;

    let grpc_server = Server::builder()
        .layer(tower_http::trace::TraceLayer::new_for_grpc())
        .add_service(dir_proto::dir::v1::store_server::StoreServer::new(facade::store::StoreService::new(state.clone())))
        .add_service(dir_proto::dir::v1::search_server::SearchServer::new(facade::search::SearchService::new(
            state.clone(),
        )))
        .add_service(dir_proto::dir::v1::routing_server::RoutingServer::new(facade::routing::RoutingService::new(
            state.clone(),
        )))
        .add_service(dir_proto::dir::v1::sign_server::SignServer::new(facade::sign::SignService::new(state.clone())))
        .add_service(dir_proto::dir::v1::naming_server::NamingServer::new(facade::naming::NamingService::new(
            state.clone(),
        )))
        .add_service(dir_proto::dir::v1::events_server::EventsServer::new(facade::events::EventsService::new(state)))
        .serve_with_shutdown(grpc_addr, wait_for_shutdown(shutdown.clone()));

    let metrics_router = metrics::build_router();
    let metrics_listener = tokio::net::TcpListener::bind(metrics_addr).await?;
    let metrics_server = axum::serve(metrics_listener, metrics_router).with_graceful_shutdown(wait_for_shutdown(shutdown.clone()));

    info!(grpc = %grpc_addr, metrics = %metrics_addr, "directory service listening");

    let (grpc_result, metrics_result) = tokio::join!(grpc_server, metrics_server);
    grpc_result?;
    metrics_result?;

    for handle in handles {
        handle.abort();
    }
    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
