use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// secrets, which must be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Timeout for CSV/print export routes in seconds (default: `600`).
    pub export_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// HMAC key for request nonces. Falls back to the JWT secret.
    pub nonce_secret: String,
    /// Debug mode. Disables report payload caching.
    pub debug: bool,
    /// Set when `CHARITABLE_REPORTS_NO_CACHE` is present.
    pub reports_no_cache: bool,
    /// Donor table page size (default: `10`).
    pub reports_per_page: u32,
    /// Page count above which pagination collapses into ellipses (default: `5`).
    pub pagination_dot_threshold: u32,
    /// Interval of the expired-transient purge in seconds (default: `3600`).
    pub transient_purge_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `EXPORT_TIMEOUT_SECS`           | `600`                   |
    /// | `NONCE_SECRET`                  | `JWT_SECRET`            |
    /// | `CHARITABLE_DEBUG`              | `false`                 |
    /// | `CHARITABLE_REPORTS_NO_CACHE`   | unset                   |
    /// | `REPORTS_PER_PAGE`              | `10`                    |
    /// | `PAGINATION_DOT_THRESHOLD`      | `5`                     |
    /// | `TRANSIENT_PURGE_INTERVAL_SECS` | `3600`                  |
    ///
    /// # Panics
    ///
    /// Panics on malformed numeric values or a missing `JWT_SECRET`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let export_timeout_secs: u64 = std::env::var("EXPORT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("EXPORT_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        let nonce_secret = std::env::var("NONCE_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| jwt.secret.clone());

        let debug = std::env::var("CHARITABLE_DEBUG")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let reports_no_cache = std::env::var_os("CHARITABLE_REPORTS_NO_CACHE").is_some();

        let reports_per_page: u32 = std::env::var("REPORTS_PER_PAGE")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("REPORTS_PER_PAGE must be a valid u32");

        let pagination_dot_threshold: u32 = std::env::var("PAGINATION_DOT_THRESHOLD")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("PAGINATION_DOT_THRESHOLD must be a valid u32");

        let transient_purge_interval_secs: u64 = std::env::var("TRANSIENT_PURGE_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("TRANSIENT_PURGE_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            export_timeout_secs,
            jwt,
            nonce_secret,
            debug,
            reports_no_cache,
            reports_per_page: reports_per_page.max(1),
            pagination_dot_threshold,
            transient_purge_interval_secs: transient_purge_interval_secs.max(1),
        }
    }

    /// Report payloads are cached unless debug mode or the no-cache switch is on.
    pub fn report_caching_enabled(&self) -> bool {
        !self.debug && !self.reports_no_cache
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("false"));
    }
}
