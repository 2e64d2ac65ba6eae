//! Periodic deletion of expired transients.
//!
//! Expired rows are already invisible to reads; this keeps the table from
//! growing with report payloads nobody will ask for again.

use std::time::Duration;

use charitable_db::repositories::TransientRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the purge loop every `interval` until `cancel` is triggered.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Transient purge job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Transient purge job stopping");
                break;
            }
            _ = ticker.tick() => {
                match TransientRepo::purge_expired(&pool).await {
                    Ok(0) => tracing::debug!("Transient purge: nothing expired"),
                    Ok(deleted) => tracing::info!(deleted, "Transient purge: removed expired rows"),
                    Err(e) => tracing::error!(error = %e, "Transient purge failed"),
                }
            }
        }
    }
}
