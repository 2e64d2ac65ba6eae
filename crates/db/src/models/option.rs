//! Stored option documents.

use charitable_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `options` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OptionRow {
    pub option_name: String,
    pub option_value: serde_json::Value,
    pub updated_at: Timestamp,
}
