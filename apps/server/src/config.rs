use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use chrono::NaiveTime;
use pricesync_core::sync::{DailyUpdatePolicy, SyncConfig};

/// Server settings, read from `PS_*` environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Directory holding the SQLite database.
    pub data_dir: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub sync: SyncConfig,
    pub daily: DailyUpdatePolicy,
    /// UTC wall-clock time of the daily update.
    pub daily_update_at: NaiveTime,
    pub scheduler_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_dir: "./data".to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            sync: SyncConfig::default(),
            daily: DailyUpdatePolicy::default(),
            daily_update_at: NaiveTime::from_hms_opt(10, 10, 0).unwrap_or(NaiveTime::MIN),
            scheduler_enabled: true,
        }
    }
}

impl Config {
    /// Load settings. Unparseable numbers fall back to their defaults; a bad
    /// listen address or daily time is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let listen_addr: SocketAddr = match std::env::var("PS_LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid PS_LISTEN_ADDR '{}'", raw))?,
            Err(_) => defaults.listen_addr,
        };
        let daily_update_at = match std::env::var("PS_DAILY_UPDATE_AT") {
            Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .with_context(|| format!("Invalid PS_DAILY_UPDATE_AT '{}', expected HH:MM", raw))?,
            Err(_) => defaults.daily_update_at,
        };

        let data_dir = std::env::var("PS_DATA_DIR").unwrap_or(defaults.data_dir);
        let cors_allow = std::env::var("PS_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = defaults.sync;
        let sync = SyncConfig {
            default_suffix: std::env::var("PS_DEFAULT_SUFFIX").unwrap_or(base.default_suffix),
            default_currency: std::env::var("PS_DEFAULT_CURRENCY")
                .unwrap_or(base.default_currency),
            quote_timeout: env_millis("PS_QUOTE_TIMEOUT_MS", base.quote_timeout),
            historical_timeout: env_millis("PS_HISTORICAL_TIMEOUT_MS", base.historical_timeout),
            history_days: env_or("PS_HISTORY_DAYS", base.history_days),
            history_interval: env_or("PS_HISTORY_INTERVAL", base.history_interval),
            cache_ttl: Duration::from_secs(env_or("PS_CACHE_TTL_SECS", base.cache_ttl.as_secs())),
            cache_max_entries: match env_or("PS_CACHE_MAX_ENTRIES", base.cache_max_entries.unwrap_or(0)) {
                0 => None,
                n => Some(n),
            },
            rate_limit: pricesync_market_data::RateLimitConfig {
                global_min_interval: env_millis(
                    "PS_GLOBAL_MIN_INTERVAL_MS",
                    base.rate_limit.global_min_interval,
                ),
                per_key_min_interval: env_millis(
                    "PS_PER_SYMBOL_MIN_INTERVAL_MS",
                    base.rate_limit.per_key_min_interval,
                ),
            },
            default_concurrency: env_or("PS_DEFAULT_CONCURRENCY", base.default_concurrency),
        };

        let daily = DailyUpdatePolicy {
            page_size: env_or("PS_DAILY_PAGE_SIZE", defaults.daily.page_size),
            page_delay: Duration::from_secs(env_or(
                "PS_DAILY_PAGE_DELAY_SECS",
                defaults.daily.page_delay.as_secs(),
            )),
            concurrency: env_or("PS_DAILY_CONCURRENCY", defaults.daily.concurrency),
            retention_days: env_or("PS_RETENTION_DAYS", defaults.daily.retention_days),
        };

        Ok(Self {
            listen_addr,
            data_dir,
            cors_allow,
            request_timeout: env_millis("PS_REQUEST_TIMEOUT_MS", defaults.request_timeout),
            sync,
            daily,
            daily_update_at,
            scheduler_enabled: env_or("PS_SCHEDULER_ENABLED", defaults.scheduler_enabled),
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}='{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn env_millis(key: &str, default: Duration) -> Duration {
    Duration::from_millis(env_or(key, u64::try_from(default.as_millis()).unwrap_or(u64::MAX)))
}
