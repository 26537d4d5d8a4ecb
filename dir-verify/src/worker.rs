//! Background re-verification: periodically asks the index for signed
//! records with a verifiable name whose verification is absent or stale,
//! and re-runs [`crate::naming::verify_name`] for each.

use std::sync::Arc;
use std::time::Duration;

use dir_index::records_needing_name_verification;
use dir_types::Record;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::{info, warn};

/// How often the worker wakes to check for records needing re-verification.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
/// Default TTL after which a cached verification is considered stale.
pub const DEFAULT_VERIFICATION_TTL: chrono::Duration = chrono::Duration::hours(24);

/// Supplies the decoded record for a CID the worker needs to re-verify.
/// Implemented by `dir-service` over the content store; kept as a trait
/// here so this crate's loop can be unit-tested without a store.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    async fn load(&self, cid: &str) -> Option<Record>;
}

/// Spawn the background worker. Wakes on either the sweep tick or
/// `shutdown`; never sleeps unconditionally.
pub fn spawn(
    pool: SqlitePool,
    client: reqwest::Client,
    source: Arc<dyn RecordSource>,
    ttl: chrono::Duration,
    sweep_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await;
        info!("name re-verification worker started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = sweep(&pool, &client, source.as_ref(), ttl).await {
                        warn!(error = %e, "name re-verification sweep failed, will retry next tick");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("name re-verification worker stopped");
    })
}

async fn sweep(
    pool: &SqlitePool,
    client: &reqwest::Client,
    source: &dyn RecordSource,
    ttl: chrono::Duration,
) -> Result<(), dir_index::IndexError> {
    let cids = records_needing_name_verification(pool, ttl).await?;
    for cid in cids {
        let Some(record) = source.load(&cid).await else {
            warn!(cid, "skipping re-verification: record no longer in store");
            continue;
        };
        if let Err(e) = crate::naming::verify_name(client, pool, &cid, &record).await {
            warn!(cid, error = %e, "re-verification attempt failed, leaving previous status in place");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dir_index::schema::init_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    struct EmptySource;

    #[async_trait::async_trait]
    impl RecordSource for EmptySource {
        async fn load(&self, _cid: &str) -> Option<Record> {
            None
        }
    }

    #[tokio::test]
    async fn sweep_with_no_candidates_is_a_no_op() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        let client = reqwest::Client::new();
        sweep(&pool, &client, &EmptySource, DEFAULT_VERIFICATION_TTL).await.unwrap();
    }
}
