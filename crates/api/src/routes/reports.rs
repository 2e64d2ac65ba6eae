//! Route definitions for the reporting endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{reports_ajax, reports_download};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ajax", post(reports_ajax::dispatch))
        .route("/reports/nonce", get(reports_ajax::nonces))
        .route("/reports/args/{kind}", get(reports_ajax::cached_args))
}

pub fn export_router() -> Router<AppState> {
    Router::new().route("/reports/download", post(reports_download::download))
}
