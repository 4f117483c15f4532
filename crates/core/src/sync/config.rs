use std::time::Duration;

use pricesync_market_data::{Interval, RateLimitConfig};

use crate::constants::*;
use crate::errors::{Error, Result};

/// Engine settings shared by every update.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Suffix appended to bare symbols (".NS").
    pub default_suffix: String,
    /// Currency recorded when the provider reports none.
    pub default_currency: String,
    pub quote_timeout: Duration,
    pub historical_timeout: Duration,
    /// Trailing window of bars fetched per update, in days.
    pub history_days: i64,
    pub history_interval: Interval,
    pub cache_ttl: Duration,
    /// `None` leaves the cache unbounded.
    pub cache_max_entries: Option<usize>,
    pub rate_limit: RateLimitConfig,
    /// Concurrency used when a caller does not pass one.
    pub default_concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_suffix: DEFAULT_SYMBOL_SUFFIX.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            quote_timeout: Duration::from_secs(QUOTE_TIMEOUT_SECS),
            historical_timeout: Duration::from_secs(HISTORICAL_TIMEOUT_SECS),
            history_days: HISTORY_WINDOW_DAYS,
            history_interval: Interval::Daily,
            cache_ttl: Duration::from_secs(QUOTE_CACHE_TTL_SECS),
            cache_max_entries: Some(QUOTE_CACHE_MAX_ENTRIES),
            rate_limit: RateLimitConfig {
                global_min_interval: Duration::from_millis(GLOBAL_MIN_INTERVAL_MS),
                per_key_min_interval: Duration::from_millis(PER_SYMBOL_MIN_INTERVAL_MS),
            },
            default_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl SyncConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let suffix = self.default_suffix.trim();
        if suffix.len() < 2 || !suffix.starts_with('.') || suffix[1..].contains('.') {
            return Err(Error::InvalidConfigValue(format!(
                "default_suffix must look like '.NS', got '{}'",
                self.default_suffix
            )));
        }
        if self.default_currency.trim().is_empty() {
            return Err(Error::InvalidConfigValue(
                "default_currency must not be empty".to_string(),
            ));
        }
        if self.quote_timeout.is_zero() || self.historical_timeout.is_zero() {
            return Err(Error::InvalidConfigValue(
                "fetch timeouts must be greater than zero".to_string(),
            ));
        }
        if self.history_days <= 0 {
            return Err(Error::InvalidConfigValue(format!(
                "history_days must be positive, got {}",
                self.history_days
            )));
        }
        if self.default_concurrency == 0 {
            return Err(Error::InvalidConfigValue(
                "default_concurrency must be at least 1".to_string(),
            ));
        }
        if self.cache_max_entries == Some(0) {
            return Err(Error::InvalidConfigValue(
                "cache_max_entries must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}
