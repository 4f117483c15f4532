//! PriceSync Core - Domain entities, services, and traits.
//!
//! This crate contains the synchronization engine: symbol normalization,
//! the per-symbol updater, the bounded batch scheduler and the daily job.
//! It is database-agnostic and defines the store traits that are implemented
//! by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod prices;
pub mod securities;
pub mod sync;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

pub use prices::{DailyPricePoint, PriceStore};
pub use securities::{NewSecurity, Security, SecurityStore};
pub use sync::{
    BatchReport, DailyUpdateJob, DailyUpdatePolicy, SyncConfig, SyncService, SyncServiceTrait,
};
