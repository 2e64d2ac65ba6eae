//! Transient-backed report caching.
//!
//! Two things are cached: the resolved filter args per report tab (so the
//! admin UI keeps its filters across tabs) and computed report payloads keyed
//! by a hash of those args. Cache failures are logged and otherwise ignored;
//! a broken cache backend never fails a report.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::nonce::hex_encode;
use crate::report_args::{ReportArgs, ReportType};

pub const HOUR: Duration = Duration::from_secs(60 * 60);
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime of a cached report payload.
pub const REPORT_CACHE_TTL: Duration = HOUR;

const REPORT_KEY_PREFIX: &str = "charitable_report_";

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Expiring key-value store.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Fetch a live value. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError>;

    /// Insert or replace a value (last writer wins).
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CoreError>;

    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}

/// Process-local store, used in tests and when no database store is wired.
#[derive(Debug, Default)]
pub struct MemoryTransientStore {
    entries: RwLock<HashMap<String, (Value, Instant)>>,
}

impl MemoryTransientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        before - entries.len()
    }
}

#[async_trait]
impl TransientStore for MemoryTransientStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CoreError> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Args transients
// ---------------------------------------------------------------------------

/// Which report tab a set of cached args belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgsKind {
    Overview,
    Activity,
    Donor,
    Advanced,
    Dashboard,
}

impl ArgsKind {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "overview" => Some(Self::Overview),
            "activity" => Some(Self::Activity),
            "donor" | "donors" => Some(Self::Donor),
            "advanced" => Some(Self::Advanced),
            "dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }

    pub fn for_report(report_type: ReportType) -> Self {
        match report_type {
            ReportType::Overview => Self::Overview,
            ReportType::Activity => Self::Activity,
            ReportType::DonorsTop | ReportType::DonorsRecurring | ReportType::DonorsFirstTime => {
                Self::Donor
            }
            ReportType::Lybunt | ReportType::Sybunt => Self::Advanced,
            ReportType::Dashboard => Self::Dashboard,
        }
    }

    pub fn transient_key(self) -> &'static str {
        match self {
            Self::Overview => "charitable-report-overview-args",
            Self::Activity => "charitable-report-activity-args",
            Self::Donor => "charitable-report-donor-args",
            Self::Advanced => "charitable-report-advanced-args",
            Self::Dashboard => "wpch_dashboard_data_args",
        }
    }

    pub fn ttl(self) -> Duration {
        match self {
            Self::Overview | Self::Activity | Self::Donor => HOUR,
            Self::Advanced | Self::Dashboard => DAY,
        }
    }
}

// ---------------------------------------------------------------------------
// Report cache
// ---------------------------------------------------------------------------

/// Transient key for a report payload computed with `args`.
pub fn report_key(args: &ReportArgs) -> String {
    let digest = Sha256::digest(args.cache_fingerprint().as_bytes());
    format!("{REPORT_KEY_PREFIX}{}", &hex_encode(&digest)[..32])
}

#[derive(Clone)]
pub struct ReportCache {
    store: Arc<dyn TransientStore>,
    enabled: bool,
}

impl ReportCache {
    /// `enabled = false` bypasses payload caching. Args transients are
    /// always written.
    pub fn new(store: Arc<dyn TransientStore>, enabled: bool) -> Self {
        Self { store, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get_cached_report<T: DeserializeOwned>(&self, args: &ReportArgs) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let key = report_key(args);
        match self.store.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(report) => {
                    tracing::debug!(key = %key, "Report cache hit");
                    Some(report)
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding unreadable cached report");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Report cache read failed");
                None
            }
        }
    }

    pub async fn set_cached_report<T: Serialize>(&self, args: &ReportArgs, report: &T) {
        if !self.enabled {
            return;
        }
        let key = report_key(args);
        let value = match serde_json::to_value(report) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Report not serializable, skipping cache");
                return;
            }
        };
        if let Err(e) = self.store.set(&key, value, REPORT_CACHE_TTL).await {
            tracing::warn!(key = %key, error = %e, "Report cache write failed");
        }
    }

    /// Return the cached report for `args`, or compute, cache, and return it.
    pub async fn maybe_cache_report<T, E, F, Fut>(
        &self,
        args: &ReportArgs,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get_cached_report(args).await {
            return Ok(cached);
        }
        let report = compute().await?;
        self.set_cached_report(args, &report).await;
        Ok(report)
    }

    /// Remember the args a report tab was last rendered with.
    pub async fn save_args(&self, kind: ArgsKind, args: &ReportArgs) {
        let value = match serde_json::to_value(args) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Report args not serializable");
                return;
            }
        };
        if let Err(e) = self.store.set(kind.transient_key(), value, kind.ttl()).await {
            tracing::warn!(key = kind.transient_key(), error = %e, "Saving report args failed");
        }
    }

    pub async fn load_args(&self, kind: ArgsKind) -> Option<ReportArgs> {
        match self.store.get(kind.transient_key()).await {
            Ok(value) => value.and_then(|v| serde_json::from_value(v).ok()),
            Err(e) => {
                let key = kind.transient_key();
                tracing::warn!(key, error = %e, "Loading report args failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report_args::ReportInput;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn args(report_type: ReportType) -> ReportArgs {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        ReportArgs::from_input(&ReportInput::default(), report_type, today, 10)
    }

    #[tokio::test]
    async fn memory_store_expires_entries() {
        let store = MemoryTransientStore::new();
        store.set("a", Value::from(1), Duration::ZERO).await.unwrap();
        store.set("b", Value::from(2), HOUR).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap(), Some(Value::from(2)));
        assert_eq!(store.purge_expired().await, 1);
        store.delete("b").await.unwrap();
        assert_eq!(store.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn maybe_cache_computes_once_when_enabled() {
        let cache = ReportCache::new(Arc::new(MemoryTransientStore::new()), true);
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let a = args(ReportType::Overview);

        for _ in 0..3 {
            let value: Result<Vec<u32>, CoreError> = cache
                .maybe_cache_report(&a, move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_cache_always_computes() {
        let cache = ReportCache::new(Arc::new(MemoryTransientStore::new()), false);
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let a = args(ReportType::Overview);

        for _ in 0..2 {
            let _: Result<u8, CoreError> = cache
                .maybe_cache_report(&a, move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get_cached_report::<u8>(&a).await, None);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = ReportCache::new(Arc::new(MemoryTransientStore::new()), true);
        let a = args(ReportType::Activity);
        let failed: Result<u8, CoreError> = cache
            .maybe_cache_report(&a, || async { Err(CoreError::Internal("db down".into())) })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.get_cached_report::<u8>(&a).await, None);
    }

    #[test]
    fn report_keys_differ_by_filters() {
        let overview = args(ReportType::Overview);
        let mut filtered = overview.clone();
        filtered.campaign_id = Some(4);
        assert_ne!(report_key(&overview), report_key(&filtered));
        assert_eq!(report_key(&overview), report_key(&overview.clone()));
        assert!(report_key(&overview).starts_with(REPORT_KEY_PREFIX));
    }

    #[tokio::test]
    async fn args_round_trip_per_tab() {
        let cache = ReportCache::new(Arc::new(MemoryTransientStore::new()), false);
        let donor = args(ReportType::DonorsRecurring);
        cache.save_args(ArgsKind::Donor, &donor).await;
        assert_eq!(cache.load_args(ArgsKind::Donor).await, Some(donor));
        assert_eq!(cache.load_args(ArgsKind::Overview).await, None);
    }

    #[test]
    fn args_kinds_map_to_transients() {
        assert_eq!(
            ArgsKind::for_report(ReportType::Sybunt).transient_key(),
            "charitable-report-advanced-args"
        );
        assert_eq!(ArgsKind::Dashboard.transient_key(), "wpch_dashboard_data_args");
        assert_eq!(ArgsKind::Overview.ttl(), HOUR);
        assert_eq!(ArgsKind::Advanced.ttl(), DAY);
        assert_eq!(ArgsKind::parse("donors"), Some(ArgsKind::Donor));
    }
}
