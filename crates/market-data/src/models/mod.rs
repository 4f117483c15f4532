//! Market data models
//!
//! - `quote` - Current quote snapshot (QuoteSnapshot)
//! - `history` - Historical bars and bar intervals (HistoricalBar, Interval)
//! - `search` - Search result data (SearchResult)

mod history;
mod quote;
mod search;

pub use history::{HistoricalBar, Interval};
pub use quote::QuoteSnapshot;
pub use search::SearchResult;
