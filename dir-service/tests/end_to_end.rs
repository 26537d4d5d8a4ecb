//! Workspace-level end-to-end scenarios: a full `dird` facade (every
//! subsystem wired exactly as `dir_service::run` wires them) served over a
//! Unix socket, driven by real `dir-proto` clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dir_identity::PeerKeystore;
use dir_index::SearchFilter;
use dir_proto::dir::v1::naming_client::NamingClient;
use dir_proto::dir::v1::routing_client::RoutingClient;
use dir_proto::dir::v1::search_client::SearchClient;
use dir_proto::dir::v1::sign_client::SignClient;
use dir_proto::dir::v1::store_client::StoreClient;
use dir_proto::dir::v1::{LookupRequest, PushChunk, RecordRef, SearchRequest};
use dir_routing::{ListItem, ListRequest, PeerId, PeerMetadata, PeerTransport, RoutingError, RoutingHost};
use dir_service::events::EventBus;
use dir_service::facade;
use dir_service::state::AppState;
use dir_store::backend::fs::FsBackend;
use dir_store::ContentStore;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use tokio::net::{UnixListener, UnixStream};
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::{Channel, Endpoint, Server, Uri};

struct UnreachableTransport;

#[async_trait]
impl PeerTransport for UnreachableTransport {
    async fn lookup(&self, peer: &str, _cid: &str) -> Result<PeerMetadata, RoutingError> {
        Err(RoutingError::Unavailable(format!("no transport to {peer} in tests")))
    }
    async fn pull(&self, peer: &str, _cid: &str) -> Result<Bytes, RoutingError> {
        Err(RoutingError::Unavailable(format!("no transport to {peer} in tests")))
    }
    async fn list(&self, peer: &str, _request: ListRequest) -> Result<Vec<ListItem>, RoutingError> {
        Err(RoutingError::Unavailable(format!("no transport to {peer} in tests")))
    }
}

/// Builds every subsystem exactly the way `dir_service::run` does, minus
/// the background loops and metrics endpoint (irrelevant to these
/// scenarios), and serves the gRPC facade over a Unix socket under `dir`.
async fn spawn_server(dir: &Path) -> PathBuf {
    let db_path = dir.join("search.db");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .expect("open search db");
    dir_index::init_schema(&pool).await.expect("init schema");

    let backend = Arc::new(FsBackend::new(dir.join("store")));
    let store = Arc::new(ContentStore::new(backend));

    let keystore = PeerKeystore::new(dir.join("identity.key"));
    let identity = Arc::new(keystore.load_or_generate("").await.expect("load identity"));

    let local_labels = dir_routing::LocalLabelStore::open_in_memory().expect("open label store");
    let transport: Arc<dyn PeerTransport> = Arc::new(UnreachableTransport);
    let local_id = PeerId::from_public_key(&identity.keypair().public_key().to_bytes());
    let routing = Arc::new(RoutingHost::new(local_id, 20, local_labels, Arc::clone(&transport)));

    let state = AppState {
        store,
        index: pool,
        routing,
        transport,
        events: EventBus::new(),
        config: dir_service::config::shared(dir_service::config::DirConfig::default()),
        http_client: reqwest::Client::new(),
        identity,
    };

    let socket_path = dir.join("dird.sock");
    let listener = UnixListener::bind(&socket_path).expect("bind uds");
    let incoming = UnixListenerStream::new(listener);

    let server = Server::builder()
        .add_service(dir_proto::dir::v1::store_server::StoreServer::new(facade::store::StoreService::new(state.clone())))
        .add_service(dir_proto::dir::v1::search_server::SearchServer::new(facade::search::SearchService::new(state.clone())))
        .add_service(dir_proto::dir::v1::routing_server::RoutingServer::new(facade::routing::RoutingService::new(
            state.clone(),
        )))
        .add_service(dir_proto::dir::v1::sign_server::SignServer::new(facade::sign::SignService::new(state.clone())))
        .add_service(dir_proto::dir::v1::naming_server::NamingServer::new(facade::naming::NamingService::new(
            state.clone(),
        )))
        .add_service(dir_proto::dir::v1::events_server::EventsServer::new(facade::events::EventsService::new(state)))
        .serve_with_incoming(incoming);

    tokio::spawn(server);
    socket_path
}

async fn connect(socket_path: PathBuf) -> Channel {
    Endpoint::try_from("http://[::]:50051")
        .unwrap()
        .connect_with_connector(tower::service_fn(move |_: Uri| {
            let socket_path = socket_path.clone();
            async move { UnixStream::connect(socket_path).await }
        }))
        .await
        .expect("connect over uds")
}

fn oasf_fixture(version: &str, created_at: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "name": "http://H/p",
        "version": version,
        "schema_version": "0.8.0",
        "created_at": created_at,
        "authors": ["alice"],
        "description": "test agent",
        "skills": [
            {"id": 10201, "name": "text-completion"},
            {"id": 10702, "name": "image-generation"}
        ],
        "locators": [{"type": "docker_image", "url": "docker.io/example/agent"}],
        "modules": [],
        "domains": [],
        "annotations": {}
    }))
    .unwrap()
}

fn generate_ecdsa_p256_pkcs8_der() -> Vec<u8> {
    use p256::ecdsa::SigningKey;
    use p256::pkcs8::EncodePrivateKey;

    let signing = SigningKey::random(&mut rand::rngs::OsRng);
    signing.to_pkcs8_der().unwrap().as_bytes().to_vec()
}

async fn push(channel: Channel, bytes: Vec<u8>) -> String {
    let mut client = StoreClient::new(channel);
    client.push(tokio_stream::once(PushChunk { data: bytes })).await.unwrap().into_inner().cid
}

#[tokio::test]
async fn push_pull_roundtrips_identically() {
    let tmp = TempDir::new().unwrap();
    let socket = spawn_server(tmp.path()).await;
    let bytes = oasf_fixture("v4.0.0", "2024-01-01T00:00:00Z");

    let cid = push(connect(socket.clone()).await, bytes.clone()).await;

    let mut store = StoreClient::new(connect(socket).await);
    let mut stream = store.pull(RecordRef { cid: cid.clone() }).await.unwrap().into_inner();
    let mut pulled = Vec::new();
    use tokio_stream::StreamExt;
    while let Some(chunk) = stream.next().await {
        pulled.extend_from_slice(&chunk.unwrap().data);
    }

    let original = dir_types::decode_record(&bytes).unwrap();
    let roundtripped = dir_types::decode_record(&pulled).unwrap();
    assert!(original.semantically_eq(&roundtripped));
}

#[tokio::test]
async fn duplicate_push_returns_identical_cid_and_does_not_duplicate_index_rows() {
    let tmp = TempDir::new().unwrap();
    let socket = spawn_server(tmp.path()).await;
    let bytes = oasf_fixture("v4.0.0", "2024-01-01T00:00:00Z");

    let cid1 = push(connect(socket.clone()).await, bytes.clone()).await;
    let cid2 = push(connect(socket.clone()).await, bytes).await;
    assert_eq!(cid1, cid2);

    let mut search = SearchClient::new(connect(socket).await);
    let mut stream = search
        .get_record_cids(SearchRequest { names: vec!["http://H/p".to_string()], limit: 100, ..Default::default() })
        .await
        .unwrap()
        .into_inner();
    let mut cids = Vec::new();
    use tokio_stream::StreamExt;
    while let Some(r) = stream.next().await {
        cids.push(r.unwrap().cid);
    }
    assert_eq!(cids.len(), 1);
}

#[tokio::test]
async fn search_by_skill_id_and_negated_version_glob() {
    let tmp = TempDir::new().unwrap();
    let socket = spawn_server(tmp.path()).await;
    let bytes = oasf_fixture("v4.0.0", "2024-01-01T00:00:00Z");
    push(connect(socket.clone()).await, bytes).await;

    use tokio_stream::StreamExt;

    let mut search = SearchClient::new(connect(socket.clone()).await);
    let mut hit = search
        .get_record_cids(SearchRequest { skill_ids: vec![10201], limit: 100, ..Default::default() })
        .await
        .unwrap()
        .into_inner();
    assert!(hit.next().await.is_some());

    let mut miss = search
        .get_record_cids(SearchRequest { skill_ids: vec![99999], limit: 100, ..Default::default() })
        .await
        .unwrap()
        .into_inner();
    assert!(miss.next().await.is_none());

    let mut negated = search
        .get_record_cids(SearchRequest { versions: vec!["v[^4].0.0".to_string()], limit: 100, ..Default::default() })
        .await
        .unwrap()
        .into_inner();
    assert!(negated.next().await.is_none());
}

#[tokio::test]
async fn version_latest_created_at_wins_and_pinned_version_still_resolves() {
    let tmp = TempDir::new().unwrap();
    let socket = spawn_server(tmp.path()).await;

    push(connect(socket.clone()).await, oasf_fixture("v4.0.0", "2024-01-01T00:00:00Z")).await;
    let cid_v5 = push(connect(socket.clone()).await, oasf_fixture("v5.0.0", "2024-06-01T00:00:00Z")).await;

    use tokio_stream::StreamExt;
    let mut search = SearchClient::new(connect(socket.clone()).await);
    let mut stream = search
        .get_records(SearchRequest { names: vec!["http://H/p".to_string()], limit: 100, ..Default::default() })
        .await
        .unwrap()
        .into_inner();
    let mut rows = Vec::new();
    while let Some(row) = stream.next().await {
        rows.push(row.unwrap());
    }
    rows.sort_by(|a, b| b.oasf_created_at.cmp(&a.oasf_created_at));
    assert_eq!(rows[0].cid, cid_v5);
    assert_eq!(rows[0].version, "v5.0.0");

    let mut pinned = search
        .get_records(SearchRequest {
            names: vec!["http://H/p".to_string()],
            versions: vec!["v4.0.0".to_string()],
            limit: 100,
            ..Default::default()
        })
        .await
        .unwrap()
        .into_inner();
    let row = pinned.next().await.unwrap().unwrap();
    assert_eq!(row.version, "v4.0.0");
}

#[tokio::test]
async fn delete_cascades_out_of_the_search_index() {
    let tmp = TempDir::new().unwrap();
    let socket = spawn_server(tmp.path()).await;
    let cid = push(connect(socket.clone()).await, oasf_fixture("v4.0.0", "2024-01-01T00:00:00Z")).await;

    let mut store = StoreClient::new(connect(socket.clone()).await);
    store.delete(RecordRef { cid: cid.clone() }).await.unwrap();

    let lookup_err = store.lookup(LookupRequest { cid: cid.clone() }).await.unwrap_err();
    assert_eq!(lookup_err.code(), tonic::Code::NotFound);

    let pool = connect_index(&tmp).await;
    let filter = SearchFilter::new();
    let rows = dir_index::search(&pool, &filter).await.unwrap();
    assert!(rows.iter().all(|r| r.cid != cid));
}

async fn connect_index(tmp: &TempDir) -> sqlx::SqlitePool {
    let db_path = tmp.path().join("search.db");
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .unwrap()
}

#[tokio::test]
async fn publish_and_unpublish_round_trip_without_error() {
    let tmp = TempDir::new().unwrap();
    let socket = spawn_server(tmp.path()).await;
    let cid = push(connect(socket.clone()).await, oasf_fixture("v4.0.0", "2024-01-01T00:00:00Z")).await;

    let mut routing = RoutingClient::new(connect(socket.clone()).await);
    routing
        .publish(dir_proto::dir::v1::PublishRequest { cid: cid.clone(), network: false })
        .await
        .unwrap();
    routing.unpublish(RecordRef { cid: cid.clone() }).await.unwrap();
}

#[tokio::test]
async fn sign_then_verify_reports_verified() {
    let tmp = TempDir::new().unwrap();
    let socket = spawn_server(tmp.path()).await;
    let cid = push(connect(socket.clone()).await, oasf_fixture("v4.0.0", "2024-01-01T00:00:00Z")).await;

    let key_path = tmp.path().join("signing.key");
    let key_der = generate_ecdsa_p256_pkcs8_der();
    tokio::fs::write(&key_path, &key_der).await.unwrap();

    let mut sign = SignClient::new(connect(socket.clone()).await);
    let signed = sign
        .sign(dir_proto::dir::v1::SignRequest { cid, key_path: key_path.display().to_string() })
        .await
        .unwrap()
        .into_inner();

    let verified = sign
        .verify(dir_proto::dir::v1::VerifySignatureRequest { cid: signed.cid })
        .await
        .unwrap()
        .into_inner();
    assert!(verified.verified);
}

#[tokio::test]
async fn naming_check_without_prior_verification_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let socket = spawn_server(tmp.path()).await;
    let cid = push(connect(socket.clone()).await, oasf_fixture("v4.0.0", "2024-01-01T00:00:00Z")).await;

    let mut naming = NamingClient::new(connect(socket).await);
    let err = naming
        .check(dir_proto::dir::v1::NamingVerifyRequest { cid })
        .await
        .unwrap_err();
    assert_eq!(err.code(), tonic::Code::NotFound);
}
