//! Prometheus `/metrics` endpoint, separate from the gRPC listener
//! (spec.md §6 "Metrics endpoint"). Grounded on `estuary-flow`'s
//! `dekaf::metrics_server`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Counter names recorded by the per-RPC interceptor in `facade`.
pub const RPC_CALLS_TOTAL: &str = "dir_rpc_calls_total";

pub fn build_router() -> Router<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install prometheus recorder");

    Router::new().route("/metrics", get(render)).with_state(handle)
}

async fn render(State(handle): State<PrometheusHandle>) -> (StatusCode, String) {
    (StatusCode::OK, handle.render())
}

/// Record one RPC outcome, labeled per spec.md §6 ("service", "method",
/// "type", "status_code").
pub fn record_rpc(service: &'static str, method: &'static str, rpc_type: &'static str, status_code: i32) {
    metrics::counter!(
        RPC_CALLS_TOTAL,
        "service" => service,
        "method" => method,
        "type" => rpc_type,
        "status_code" => status_code.to_string(),
    )
    .increment(1);
}

/// Publish/unpublish gauges, one per namespace (spec.md §4.4 "per-label
/// metrics").
pub fn set_label_gauge(namespace: &'static str, count: f64) {
    metrics::gauge!("dir_published_labels", "namespace" => namespace).set(count);
}
