//! Engine defaults.

/// Suffix appended to symbols entered without an exchange suffix (NSE).
pub const DEFAULT_SYMBOL_SUFFIX: &str = ".NS";

/// Currency recorded when the provider does not report one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Exchange recorded when neither the suffix nor the provider identifies one.
pub const UNKNOWN_EXCHANGE: &str = "UNKNOWN";

/// Deadline for a single quote fetch.
pub const QUOTE_TIMEOUT_SECS: u64 = 10;

/// Deadline for a single historical range fetch.
pub const HISTORICAL_TIMEOUT_SECS: u64 = 15;

/// Trailing window of daily bars fetched on every update.
pub const HISTORY_WINDOW_DAYS: i64 = 30;

/// How long a successful update is served from the cache.
pub const QUOTE_CACHE_TTL_SECS: u64 = 5 * 60;

/// Upper bound on cached quote entries.
pub const QUOTE_CACHE_MAX_ENTRIES: usize = 10_000;

/// Minimum spacing between any two provider requests.
pub const GLOBAL_MIN_INTERVAL_MS: u64 = 200;

/// Minimum spacing between two provider requests for the same symbol.
pub const PER_SYMBOL_MIN_INTERVAL_MS: u64 = 1000;

/// Symbols updated in parallel when the caller does not say otherwise.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Cache key prefix for quote snapshots.
pub const QUOTE_CACHE_KEY_PREFIX: &str = "quote:";

// Daily update job

/// Symbols per page in the daily job.
pub const DAILY_PAGE_SIZE: usize = 100;

/// Pause between two pages of the daily job.
pub const DAILY_PAGE_DELAY_SECS: u64 = 30;

/// Symbols updated in parallel by the daily job.
pub const DAILY_CONCURRENCY: usize = 2;

/// Price points older than this many days are removed after the daily job.
pub const PRICE_RETENTION_DAYS: i64 = 30;
