//! Postgres-backed [`TransientStore`].

use std::time::Duration;

use async_trait::async_trait;
use charitable_core::cache::TransientStore;
use charitable_core::error::CoreError;
use serde_json::Value;
use sqlx::PgPool;

use crate::repositories::TransientRepo;

#[derive(Debug, Clone)]
pub struct PgTransientStore {
    pool: PgPool,
}

impl PgTransientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn internal(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("transient store: {e}"))
}

#[async_trait]
impl TransientStore for PgTransientStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        Ok(TransientRepo::find_live(&self.pool, key)
            .await
            .map_err(internal)?
            .map(|row| row.value))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CoreError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        TransientRepo::upsert(&self.pool, key, &value, ttl_secs)
            .await
            .map_err(internal)
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        TransientRepo::delete(&self.pool, key)
            .await
            .map(|_| ())
            .map_err(internal)
    }
}
