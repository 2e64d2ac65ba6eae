use std::sync::Arc;

use charitable_core::cache::{ReportCache, TransientStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is a pool handle or behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: charitable_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Backend for report args and cached report payloads.
    pub transients: Arc<dyn TransientStore>,
}

impl AppState {
    pub fn report_cache(&self) -> ReportCache {
        ReportCache::new(
            Arc::clone(&self.transients),
            self.config.report_caching_enabled(),
        )
    }
}
