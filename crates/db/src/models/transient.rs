use charitable_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `transients` table.
#[derive(Debug, Clone, FromRow)]
pub struct TransientRow {
    pub transient_key: String,
    pub value: serde_json::Value,
    pub expires_at: Timestamp,
}
