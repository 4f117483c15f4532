use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current quote for one symbol as reported by a provider.
///
/// Only the regular market price is required. Everything else is whatever the
/// provider happened to return and is mapped onto the security record by the
/// caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    /// Provider symbol the quote was requested for (e.g., "RELIANCE.NS")
    pub symbol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,

    /// Trading currency (ISO 4217)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Exchange display name reported by the provider (e.g., "NSE")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_name: Option<String>,

    /// Last regular-session price (required)
    pub regular_market_price: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_previous_close: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_volume: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_day_high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_day_low: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_low: Option<Decimal>,
}

impl QuoteSnapshot {
    /// Create a snapshot with only the required fields set.
    pub fn new(symbol: impl Into<String>, regular_market_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            regular_market_price,
            ..Default::default()
        }
    }

    /// Preferred display name: long name, then short name.
    pub fn display_name(&self) -> Option<&str> {
        self.long_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.short_name.as_deref().filter(|n| !n.trim().is_empty()))
    }
}
