//! `dird`: the directory service binary. Loads configuration, wires up
//! logging, and runs the gRPC facade until a shutdown signal arrives.

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dird", author, version, about = "Agent Directory service")]
struct Args {
    /// YAML configuration file, layered under `DIR_`-prefixed environment
    /// variables.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let cfg = dir_service::config::load(args.config.as_deref())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    dir_service::run(cfg, shutdown_rx).await
}
