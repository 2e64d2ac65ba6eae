//! Plugin settings stored in the `charitable_settings` option.
//!
//! Unknown keys (gateway-specific blocks such as `gateways_square`) are kept
//! in [`CharitableSettings::extra`] so a read-modify-write round trip never
//! drops them.

use serde::{Deserialize, Serialize};

use crate::money::{currency_symbol, CurrencyFormat, SymbolPosition};

/// Option name holding the settings document.
pub const SETTINGS_OPTION: &str = "charitable_settings";

/// Option name holding the first-activation timestamp list.
pub const ACTIVATED_OPTION: &str = "charitable_activated";

/// Option name holding the list of versions the install/upgrade ran for.
pub const UPGRADE_LOG_OPTION: &str = "charitable_upgrade_log";

/// Option name listing the slugs of active add-ons.
pub const ACTIVE_ADDONS_OPTION: &str = "charitable_active_addons";

/// Gateway enabled on a fresh install.
pub const DEFAULT_GATEWAY: &str = "offline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharitableSettings {
    pub currency: String,
    pub country: String,
    pub default_gateway: String,
    pub active_gateways: Vec<String>,
    pub donation_form_display: String,
    pub currency_format: SymbolPosition,
    pub decimal_separator: String,
    pub thousands_separator: String,
    pub decimal_count: usize,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for CharitableSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            country: "US".to_string(),
            default_gateway: DEFAULT_GATEWAY.to_string(),
            active_gateways: vec![DEFAULT_GATEWAY.to_string()],
            donation_form_display: "separate_page".to_string(),
            currency_format: SymbolPosition::Left,
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
            decimal_count: 2,
            extra: serde_json::Map::new(),
        }
    }
}

impl CharitableSettings {
    /// Parse a stored settings value, falling back to defaults for anything
    /// missing or malformed.
    pub fn from_value(value: Option<serde_json::Value>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat {
            symbol: currency_symbol(&self.currency),
            position: self.currency_format,
            decimal_separator: self.decimal_separator.clone(),
            thousands_separator: self.thousands_separator.clone(),
            decimal_count: self.decimal_count,
        }
    }

    /// Remove a gateway's settings block and deactivate it.
    ///
    /// Falls back to [`DEFAULT_GATEWAY`] when the removed gateway was the
    /// default. Returns `true` if anything changed.
    pub fn remove_gateway(&mut self, gateway: &str) -> bool {
        let key = format!("gateways_{gateway}");
        let mut changed = self.extra.remove(&key).is_some();

        let before = self.active_gateways.len();
        self.active_gateways.retain(|g| g != gateway);
        changed |= self.active_gateways.len() != before;

        if self.default_gateway == gateway {
            self.default_gateway = DEFAULT_GATEWAY.to_string();
            if !self.active_gateways.iter().any(|g| g == DEFAULT_GATEWAY) {
                self.active_gateways.push(DEFAULT_GATEWAY.to_string());
            }
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_value_gives_defaults() {
        let settings = CharitableSettings::from_value(None);
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.active_gateways, vec!["offline".to_string()]);
        assert_eq!(settings.currency_format().format(5.0), "$5.00");
    }

    #[test]
    fn partial_value_keeps_unknown_keys() {
        let value = json!({
            "currency": "GBP",
            "gateways_square": { "mode": "live" }
        });
        let settings = CharitableSettings::from_value(Some(value));
        assert_eq!(settings.currency, "GBP");
        assert_eq!(settings.decimal_count, 2);
        assert!(settings.extra.contains_key("gateways_square"));

        let round_trip = serde_json::to_value(&settings).unwrap();
        assert_eq!(round_trip["gateways_square"]["mode"], "live");
    }

    #[test]
    fn remove_gateway_resets_default() {
        let mut settings = CharitableSettings {
            default_gateway: "square".into(),
            active_gateways: vec!["square".into()],
            ..Default::default()
        };
        settings
            .extra
            .insert("gateways_square".into(), json!({ "mode": "test" }));

        assert!(settings.remove_gateway("square"));
        assert_eq!(settings.default_gateway, "offline");
        assert_eq!(settings.active_gateways, vec!["offline".to_string()]);
        assert!(!settings.extra.contains_key("gateways_square"));
        assert!(!settings.remove_gateway("square"));
    }
}
