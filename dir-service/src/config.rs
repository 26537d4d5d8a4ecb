//! Process-wide configuration: a YAML file layered with `DIR_`-prefixed
//! environment variables (the same layering `zhtp` uses over its own
//! `config = "0.14"` dependency), held as a singleton behind
//! `Arc<RwLock<DirConfig>>` per spec.md §5/§9 "Global state".

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Bootstrap peer address, as given in the config file or `--bootstrap` flag.
pub type BootstrapPeer = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirConfig {
    /// Directory holding the content store's blobs, the search index's
    /// `search.db`, the local label store's sled database, and the peer
    /// identity keyfile.
    pub data_dir: PathBuf,

    /// Address the gRPC facade listens on.
    pub listen_addr: String,
    /// Address the Prometheus `/metrics` endpoint listens on.
    pub metrics_addr: String,

    /// Schema document URL used for `--disable-api-validation`-gated
    /// strict-mode schema checks (spec.md §6).
    pub schema_url: String,
    /// When true, pushed records are validated against `schema_url` before
    /// being accepted.
    pub strict: bool,
    /// When true, skips API-level payload validation entirely (debug only).
    pub disable_api_validation: bool,

    /// Peers dialed at startup to seed the routing table.
    pub bootstrap_peers: Vec<BootstrapPeer>,
    /// Kademlia k-bucket size.
    pub k_bucket_size: usize,

    /// How long a cached remote-peer label entry survives without
    /// republication before `dir-routing`'s cleanup loop evicts it.
    pub provider_record_ttl_secs: u64,
    /// How often a signed, name-verifiable record gets re-checked against
    /// its well-known document.
    pub name_verification_ttl_hours: i64,

    /// Passphrase protecting the on-disk peer identity keyfile. Empty
    /// string means the keyfile is still wrapped, just with no real
    /// secret (see `dir-identity::keystore`).
    pub identity_passphrase: String,

    /// Request deadline applied to outbound peer RPCs (`Lookup`/`Pull`/`List`).
    pub peer_request_timeout_secs: u64,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            listen_addr: "0.0.0.0:8080".to_string(),
            metrics_addr: "0.0.0.0:9090".to_string(),
            schema_url: "https://schema.oasf.outshift.com/0.8.0/objects/agent".to_string(),
            strict: false,
            disable_api_validation: false,
            bootstrap_peers: Vec::new(),
            k_bucket_size: 20,
            provider_record_ttl_secs: 36 * 3600,
            name_verification_ttl_hours: 24,
            identity_passphrase: String::new(),
            peer_request_timeout_secs: 10,
        }
    }
}

/// Load configuration from an optional YAML file overlaid with `DIR_`
/// environment variables, e.g. `DIR_LISTEN_ADDR=0.0.0.0:9000`.
pub fn load(config_path: Option<&std::path::Path>) -> Result<DirConfig, config::ConfigError> {
    let mut builder = config::Config::builder().add_source(config::Config::try_from(&DirConfig::default())?);

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path).required(false));
    }

    builder = builder.add_source(config::Environment::with_prefix("DIR").separator("__"));

    builder.build()?.try_deserialize()
}

/// Process-wide configuration handle, shared by every subsystem.
pub type SharedConfig = Arc<RwLock<DirConfig>>;

pub fn shared(config: DirConfig) -> SharedConfig {
    Arc::new(RwLock::new(config))
}
