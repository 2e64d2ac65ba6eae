//! Repository for the `transients` table.

use sqlx::PgPool;

use crate::models::transient::TransientRow;

pub struct TransientRepo;

impl TransientRepo {
    /// Fetch an unexpired entry.
    pub async fn find_live(pool: &PgPool, key: &str) -> Result<Option<TransientRow>, sqlx::Error> {
        sqlx::query_as::<_, TransientRow>(
            "SELECT transient_key, value, expires_at FROM transients \
             WHERE transient_key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    /// Insert or replace an entry expiring `ttl_secs` from now.
    pub async fn upsert(
        pool: &PgPool,
        key: &str,
        value: &serde_json::Value,
        ttl_secs: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO transients (transient_key, value, expires_at) \
             VALUES ($1, $2, now() + make_interval(secs => $3)) \
             ON CONFLICT (transient_key) DO UPDATE \
             SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .bind(ttl_secs as f64)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transients WHERE transient_key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every expired entry, returning the number removed.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transients WHERE expires_at <= now()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
