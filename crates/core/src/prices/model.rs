use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pricesync_market_data::HistoricalBar;

/// One trading day for one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPricePoint {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
    pub adj_close: Option<Decimal>,
}

impl DailyPricePoint {
    /// Build a point from a provider bar.
    ///
    /// Bars without a date are dropped. Missing prices and volume are stored
    /// as zero; a missing adjusted close stays absent.
    pub fn from_bar(symbol: &str, bar: &HistoricalBar) -> Option<Self> {
        let date = bar.date?;
        Some(Self {
            symbol: symbol.to_string(),
            date,
            open: bar.open.unwrap_or_default(),
            high: bar.high.unwrap_or_default(),
            low: bar.low.unwrap_or_default(),
            close: bar.close.unwrap_or_default(),
            volume: bar
                .volume
                .map(|v| i64::try_from(v).unwrap_or(i64::MAX))
                .unwrap_or_default(),
            adj_close: bar.adj_close,
        })
    }
}
