//! Error types for the market data crate.
//!
//! [`MarketDataError`] is returned by every provider operation. Callers that
//! need to decide how to react (record a failure, degrade to an empty result)
//! can use [`MarketDataError::is_timeout`] and [`MarketDataError::is_terminal`].

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol exists but has no bars in the requested range.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned data that could not be mapped.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// The provider does not implement the requested operation.
    #[error("{operation} is not supported by {provider}")]
    NotSupported {
        /// Operation name, e.g. "search"
        operation: String,
        /// Provider identifier
        provider: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether this error represents an elapsed deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Terminal errors will not go away if the same request is repeated.
    ///
    /// ```
    /// use pricesync_market_data::errors::MarketDataError;
    ///
    /// assert!(MarketDataError::SymbolNotFound("NOPE.NS".to_string()).is_terminal());
    /// assert!(!MarketDataError::RateLimited { provider: "YAHOO".to_string() }.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SymbolNotFound(_)
                | Self::NoDataForRange
                | Self::ValidationFailed { .. }
                | Self::NotSupported { .. }
        )
    }
}
