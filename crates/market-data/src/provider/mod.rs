//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - The Yahoo Finance implementation
//!
//! Providers receive provider-form symbols (e.g., "RELIANCE.NS"). Turning a
//! user-entered ticker into that form happens in the sync layer, not here.
//! Providers do not throttle themselves either; callers gate every request
//! through [`crate::RateLimiter`].

mod traits;

pub mod yahoo;

pub use traits::MarketDataProvider;
