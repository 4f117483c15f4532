//! Request throttling and response reuse.
//!
//! - [`RateLimiter`]: spacing gate consulted before every provider call
//! - [`ResponseCache`]: short-lived cache consulted before the gate

mod cache;
mod rate_limiter;

pub use cache::{ResponseCache, DEFAULT_CACHE_TTL};
pub use rate_limiter::{
    RateLimitConfig, RateLimiter, DEFAULT_GLOBAL_MIN_INTERVAL, DEFAULT_PER_KEY_MIN_INTERVAL,
};
