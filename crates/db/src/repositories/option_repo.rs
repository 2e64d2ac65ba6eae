//! Repository for the `options` table.

use sqlx::PgPool;

use crate::models::option::OptionRow;

const COLUMNS: &str = "option_name, option_value, updated_at";

pub struct OptionRepo;

impl OptionRepo {
    pub async fn find(pool: &PgPool, name: &str) -> Result<Option<OptionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM options WHERE option_name = $1");
        sqlx::query_as::<_, OptionRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// The stored value, or `None` if the option was never set.
    pub async fn get(pool: &PgPool, name: &str) -> Result<Option<serde_json::Value>, sqlx::Error> {
        Ok(Self::find(pool, name).await?.map(|row| row.option_value))
    }

    pub async fn exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM options WHERE option_name = $1)")
                .bind(name)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Insert or replace an option.
    pub async fn set(
        pool: &PgPool,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<OptionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO options (option_name, option_value) \
             VALUES ($1, $2) \
             ON CONFLICT (option_name) DO UPDATE \
             SET option_value = EXCLUDED.option_value, updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OptionRow>(&query)
            .bind(name)
            .bind(value)
            .fetch_one(pool)
            .await
    }

    /// Insert only when absent. Returns `true` if a row was written.
    pub async fn add(
        pool: &PgPool,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO options (option_name, option_value) VALUES ($1, $2) \
             ON CONFLICT (option_name) DO NOTHING",
        )
        .bind(name)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
