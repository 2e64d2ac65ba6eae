//! Startup installer.
//!
//! Runs after migrations on every start. Each step is idempotent: roles are
//! upserted, settings are seeded only on first activation, and the add-on
//! cleanup only touches settings when something needs removing.

use charitable_core::roles::ROLE_CAPABILITIES;
use charitable_core::settings::{
    CharitableSettings, ACTIVATED_OPTION, ACTIVE_ADDONS_OPTION, SETTINGS_OPTION, UPGRADE_LOG_OPTION,
};
use charitable_core::types::Timestamp;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::repositories::{OptionRepo, ReportRepo, RoleRepo};

/// Tables the reporting layer reads from.
pub const REQUIRED_TABLES: [&str; 5] = [
    "donors",
    "donor_meta",
    "campaign_donations",
    "donation_activities",
    "campaign_activities",
];

/// Add-on whose gateway settings are removed when it is not active.
pub const SQUARE_ADDON: &str = "charitable-square";
const SQUARE_GATEWAY: &str = "square";

/// What a run of the installer changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub roles_registered: usize,
    pub missing_tables: Vec<String>,
    pub upgrade_logged: bool,
    pub settings_seeded: bool,
    pub gateway_settings_removed: bool,
}

pub struct Installer<'a> {
    pool: &'a PgPool,
    version: &'a str,
}

impl<'a> Installer<'a> {
    pub fn new(pool: &'a PgPool, version: &'a str) -> Self {
        Self { pool, version }
    }

    pub async fn run(&self, now: Timestamp) -> Result<InstallReport, sqlx::Error> {
        let report = InstallReport {
            roles_registered: self.register_roles().await?,
            missing_tables: self.verify_tables().await?,
            upgrade_logged: self.log_upgrade(now).await?,
            settings_seeded: self.seed_settings(now).await?,
            gateway_settings_removed: self.cleanup_inactive_addons().await?,
        };
        tracing::info!(
            version = self.version,
            roles = report.roles_registered,
            settings_seeded = report.settings_seeded,
            upgrade_logged = report.upgrade_logged,
            "Installer finished"
        );
        Ok(report)
    }

    async fn register_roles(&self) -> Result<usize, sqlx::Error> {
        for (role, caps) in ROLE_CAPABILITIES {
            let caps: Vec<String> = caps.iter().map(|c| c.to_string()).collect();
            RoleRepo::upsert(self.pool, role, &caps).await?;
        }
        Ok(ROLE_CAPABILITIES.len())
    }

    async fn verify_tables(&self) -> Result<Vec<String>, sqlx::Error> {
        let mut missing = Vec::new();
        for table in REQUIRED_TABLES {
            if !ReportRepo::table_exists(self.pool, table).await? {
                tracing::warn!(table, "Required table is missing");
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }

    /// Append this version to the upgrade log unless already present.
    async fn log_upgrade(&self, now: Timestamp) -> Result<bool, sqlx::Error> {
        let mut log = match OptionRepo::get(self.pool, UPGRADE_LOG_OPTION).await? {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        };
        if log.iter().any(|e| e["version"] == self.version) {
            return Ok(false);
        }
        log.push(json!({ "version": self.version, "time": now.to_rfc3339() }));
        OptionRepo::set(self.pool, UPGRADE_LOG_OPTION, &Value::Array(log)).await?;
        Ok(true)
    }

    /// Write default settings on first activation only.
    async fn seed_settings(&self, now: Timestamp) -> Result<bool, sqlx::Error> {
        if OptionRepo::exists(self.pool, ACTIVATED_OPTION).await? {
            return Ok(false);
        }
        let defaults = serde_json::to_value(CharitableSettings::default())
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        OptionRepo::add(self.pool, SETTINGS_OPTION, &defaults).await?;
        OptionRepo::set(self.pool, ACTIVATED_OPTION, &json!([now.to_rfc3339()])).await?;
        tracing::info!("Seeded default settings");
        Ok(true)
    }

    /// Drop Square gateway settings when the Square add-on is not active.
    async fn cleanup_inactive_addons(&self) -> Result<bool, sqlx::Error> {
        let active = OptionRepo::get(self.pool, ACTIVE_ADDONS_OPTION).await?;
        if addon_is_active(active.as_ref(), SQUARE_ADDON) {
            return Ok(false);
        }

        let stored = OptionRepo::get(self.pool, SETTINGS_OPTION).await?;
        if stored.is_none() {
            return Ok(false);
        }
        let mut settings = CharitableSettings::from_value(stored);
        if !settings.remove_gateway(SQUARE_GATEWAY) {
            return Ok(false);
        }
        let value = serde_json::to_value(&settings).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        OptionRepo::set(self.pool, SETTINGS_OPTION, &value).await?;
        tracing::info!(addon = SQUARE_ADDON, "Removed settings for inactive add-on gateway");
        Ok(true)
    }
}

/// `charitable_active_addons` holds an array of add-on slugs.
pub fn addon_is_active(active_addons: Option<&Value>, addon: &str) -> bool {
    active_addons
        .and_then(Value::as_array)
        .is_some_and(|list| list.iter().any(|a| a.as_str() == Some(addon)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addon_detection() {
        let active = json!(["charitable-square", "charitable-recurring"]);
        assert!(addon_is_active(Some(&active), SQUARE_ADDON));
        assert!(!addon_is_active(Some(&json!(["charitable-recurring"])), SQUARE_ADDON));
        assert!(!addon_is_active(Some(&json!({"charitable-square": true})), SQUARE_ADDON));
        assert!(!addon_is_active(None, SQUARE_ADDON));
    }
}
