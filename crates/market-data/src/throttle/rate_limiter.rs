//! Request spacing gate for market data providers.
//!
//! Two minimum intervals are enforced together:
//! - a global interval between any two admitted requests, and
//! - a per-key interval between two requests for the same key (symbol).
//!
//! All callers pass through one fair async mutex, so admissions happen in
//! arrival order and the spacing decision is made against a single view of
//! the timestamps. The wait for an admission is the larger of the two
//! remaining intervals, and both timestamps are stamped together once the
//! wait is over.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default spacing between any two requests.
pub const DEFAULT_GLOBAL_MIN_INTERVAL: Duration = Duration::from_millis(200);

/// Default spacing between two requests for the same key.
pub const DEFAULT_PER_KEY_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Rate limiter configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Minimum time between any two admissions.
    pub global_min_interval: Duration,
    /// Minimum time between two admissions for the same key.
    pub per_key_min_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_min_interval: DEFAULT_GLOBAL_MIN_INTERVAL,
            per_key_min_interval: DEFAULT_PER_KEY_MIN_INTERVAL,
        }
    }
}

/// Timestamps of the last admissions.
#[derive(Debug, Default)]
struct GateState {
    last_global: Option<Instant>,
    last_by_key: HashMap<String, Instant>,
}

impl GateState {
    /// How long `key` must wait at `now` before it may be admitted.
    fn wait_for(&self, key: &str, now: Instant, config: &RateLimitConfig) -> Duration {
        let remaining = |last: Option<&Instant>, interval: Duration| {
            last.map(|t| (*t + interval).saturating_duration_since(now))
                .unwrap_or(Duration::ZERO)
        };

        let global = remaining(self.last_global.as_ref(), config.global_min_interval);
        let per_key = remaining(self.last_by_key.get(key), config.per_key_min_interval);
        global.max(per_key)
    }

    fn record(&mut self, key: &str, at: Instant, config: &RateLimitConfig) {
        self.last_global = Some(at);
        self.last_by_key.insert(key.to_string(), at);

        // Entries older than the per-key interval no longer constrain anyone.
        let horizon = config.per_key_min_interval;
        self.last_by_key
            .retain(|_, last| at.saturating_duration_since(*last) < horizon);
    }
}

/// Global + per-key spacing gate.
///
/// Shared process-wide behind an `Arc`. [`acquire`](Self::acquire) never
/// fails and has no timeout of its own.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<GateState>,
}

impl RateLimiter {
    /// Create a new rate limiter with default settings.
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    /// Create a rate limiter with custom spacing.
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(GateState::default()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until a request for `key` is permitted, then record it.
    ///
    /// The gate stays locked while waiting, which is what makes admission
    /// first-come first-served across all keys.
    pub async fn acquire(&self, key: &str) {
        let mut state = self.state.lock().await;

        let wait = state.wait_for(key, Instant::now(), &self.config);
        if wait > Duration::ZERO {
            debug!("Rate limiter: waiting {:?} for '{}'", wait, key);
            tokio::time::sleep(wait).await;
        }

        state.record(key, Instant::now(), &self.config);
    }

    /// Admit `key` only if that needs no waiting and the gate is free.
    ///
    /// Returns true if the request was admitted and recorded.
    pub fn try_acquire(&self, key: &str) -> bool {
        let Ok(mut state) = self.state.try_lock() else {
            return false;
        };

        let now = Instant::now();
        if state.wait_for(key, now, &self.config) > Duration::ZERO {
            return false;
        }

        state.record(key, now, &self.config);
        true
    }

    /// Forget all recorded admissions.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = GateState::default();
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.state.lock().await.last_by_key.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
