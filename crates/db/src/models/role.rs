use charitable_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub name: String,
    pub capabilities: Vec<String>,
    pub updated_at: Timestamp,
}
