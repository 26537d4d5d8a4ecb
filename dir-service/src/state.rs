//! The facade's process-wide state: everything a handler needs, bundled
//! once at startup and cloned (cheaply, behind `Arc`) into every RPC.

use std::sync::Arc;

use dir_identity::PeerIdentity;
use dir_routing::{PeerTransport, RoutingHost};
use dir_store::ContentStore;
use sqlx::SqlitePool;

use crate::config::SharedConfig;
use crate::events::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContentStore>,
    pub index: SqlitePool,
    pub routing: Arc<RoutingHost>,
    pub transport: Arc<dyn PeerTransport>,
    pub events: EventBus,
    pub config: SharedConfig,
    pub http_client: reqwest::Client,
    pub identity: Arc<PeerIdentity>,
}
