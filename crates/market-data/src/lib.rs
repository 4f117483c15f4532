//! PriceSync Market Data Crate
//!
//! Provider-facing building blocks for the price synchronization engine.
//!
//! # Overview
//!
//! - [`MarketDataProvider`]: abstract quote / history / search source, with a
//!   Yahoo Finance implementation in [`YahooProvider`]
//! - [`RateLimiter`]: one FIFO gate enforcing global and per-symbol spacing
//! - [`ResponseCache`]: time-boxed memoization keyed by request identity
//! - exchange suffix lookup for provider symbols
//!
//! # Architecture
//!
//! ```text
//!        caller (sync engine)
//!               |
//!               v
//!      +------------------+
//!      |  ResponseCache   |  hit: return without touching the provider
//!      +------------------+
//!               | miss
//!               v
//!      +------------------+
//!      |   RateLimiter    |  global + per-key spacing, FIFO admission
//!      +------------------+
//!               |
//!               v
//!      +------------------+
//!      |     Provider     |  (Yahoo, mocks in tests)
//!      +------------------+
//! ```

pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod throttle;

pub use errors::MarketDataError;

pub use models::{HistoricalBar, Interval, QuoteSnapshot, SearchResult};

pub use resolver::{split_suffix, strip_suffix, suffix_info, ExchangeSuffix};

pub use provider::yahoo::YahooProvider;
pub use provider::MarketDataProvider;

pub use throttle::{RateLimitConfig, RateLimiter, ResponseCache};
