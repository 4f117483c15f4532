//! Market data provider trait definitions.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{HistoricalBar, Interval, QuoteSnapshot, SearchResult};

/// Trait for market data providers.
///
/// Implementations must be cheap to share behind an `Arc` and safe to call
/// from many tasks at once. Deadlines are imposed by the caller, so a
/// provider may take as long as the transport allows.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pricesync_market_data::{MarketDataProvider, MarketDataError, QuoteSnapshot};
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot, MarketDataError> {
///         Ok(QuoteSnapshot::new(symbol, rust_decimal::Decimal::ONE))
///     }
///
///     // ... fetch_historical
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "YAHOO".
    ///
    /// Used in logs and error messages.
    fn id(&self) -> &'static str;

    /// Fetch the current quote for a provider-form symbol.
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot, MarketDataError>;

    /// Fetch historical bars between `start` and `end` (both inclusive).
    ///
    /// Bars should be ordered by date ascending. An empty range may be
    /// reported either as `Ok(vec![])` or as [`MarketDataError::NoDataForRange`].
    async fn fetch_historical(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<HistoricalBar>, MarketDataError>;

    /// Search for symbols matching the query.
    ///
    /// Default implementation returns [`MarketDataError::NotSupported`].
    async fn search_symbols(&self, _query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        Err(MarketDataError::NotSupported {
            operation: "search".to_string(),
            provider: self.id().to_string(),
        })
    }
}
