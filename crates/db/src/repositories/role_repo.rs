//! Repository for the `roles` table.

use sqlx::PgPool;

use crate::models::role::Role;

const COLUMNS: &str = "name, capabilities, updated_at";

pub struct RoleRepo;

impl RoleRepo {
    /// Create or overwrite a role's capability list.
    pub async fn upsert(
        pool: &PgPool,
        name: &str,
        capabilities: &[String],
    ) -> Result<Role, sqlx::Error> {
        let query = format!(
            "INSERT INTO roles (name, capabilities) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE \
             SET capabilities = EXCLUDED.capabilities, updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .bind(capabilities)
            .fetch_one(pool)
            .await
    }
}
