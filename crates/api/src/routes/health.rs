use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use charitable_db::install::REQUIRED_TABLES;
use charitable_db::repositories::ReportRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Report tables the database is missing. Empty when unreachable.
    pub missing_tables: Vec<&'static str>,
    pub report_caching: bool,
}

async fn missing_tables(state: &AppState) -> Result<Vec<&'static str>, sqlx::Error> {
    let mut missing = Vec::new();
    for table in REQUIRED_TABLES {
        if !ReportRepo::table_exists(&state.pool, table).await? {
            missing.push(table);
        }
    }
    Ok(missing)
}

/// GET /health
///
/// `ok` only when the database answers and every report table exists.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db_healthy, missing) = match charitable_db::health_check(&state.pool).await {
        Ok(()) => match missing_tables(&state).await {
            Ok(missing) => (true, missing),
            Err(e) => {
                tracing::warn!(error = %e, "Table check failed");
                (false, Vec::new())
            }
        },
        Err(_) => (false, Vec::new()),
    };

    let status = if db_healthy && missing.is_empty() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        missing_tables: missing,
        report_caching: state.config.report_caching_enabled(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
