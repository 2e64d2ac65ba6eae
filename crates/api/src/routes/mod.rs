pub mod health;
pub mod reports;
pub mod themes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree served under the default request timeout.
///
/// ```text
/// /ajax                     admin AJAX report actions (POST, form body)
/// /reports/nonce            nonces for the caller (GET)
/// /reports/args/{kind}      last args for a report tab (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(reports::router())
}

/// `/api/v1` routes that run under the export timeout.
///
/// ```text
/// /reports/download         CSV / print export (POST, form body)
/// ```
pub fn export_routes() -> Router<AppState> {
    reports::export_router()
}
