//! Price synchronization engine.
//!
//! - [`symbol`] - Provider and storage symbol forms
//! - [`config`] - Engine settings
//! - [`model`] - Per-symbol outcomes and batch reports
//! - [`updater`] - One symbol: cache, rate limit, fetch, persist
//! - [`scheduler`] - Many symbols under a concurrency bound
//! - [`service`] - Entry points used by triggers
//! - [`job`] - Paged daily update with retention cleanup
//!
//! # Architecture
//!
//! ```text
//! trigger ─► SyncService ─► BatchScheduler ─► SymbolUpdater ─┬─► ResponseCache
//!                                                             ├─► RateLimiter
//!                                                             ├─► MarketDataProvider
//!                                                             └─► SecurityStore / PriceStore
//! ```

pub mod config;
pub mod job;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod symbol;
pub mod updater;

#[cfg(test)]
mod sync_tests;

pub use config::SyncConfig;
pub use job::{DailyUpdateJob, DailyUpdateOverview, DailyUpdatePolicy, DailyUpdateSummary};
pub use model::{
    price_change, BatchReport, PersistTarget, SymbolSnapshot, SymbolUpdate, SymbolUpdateResult,
    UpdateError, UpdateStep,
};
pub use scheduler::BatchScheduler;
pub use service::{SyncService, SyncServiceTrait};
pub use symbol::{provider_symbol, storage_symbol, ResolvedSymbol};
pub use updater::{quote_cache_key, SymbolUpdater};
