//! Update outcomes and batch reports.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use pricesync_market_data::QuoteSnapshot;

use super::symbol::ResolvedSymbol;
use crate::securities::Security;

/// Provider call an update was waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateStep {
    Quote,
    Historical,
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStep::Quote => f.write_str("quote fetch"),
            UpdateStep::Historical => f.write_str("historical fetch"),
        }
    }
}

/// Record a write was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PersistTarget {
    Security,
    PricePoint(NaiveDate),
}

impl fmt::Display for PersistTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistTarget::Security => f.write_str("security"),
            PersistTarget::PricePoint(date) => write!(f, "price point {}", date),
        }
    }
}

/// Why one symbol's update failed or degraded.
///
/// Fatal variants end the update; the others are attached to a successful
/// update as warnings.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UpdateError {
    #[error("Quote fetch failed for {symbol}: {message}")]
    QuoteFetchFailed { symbol: String, message: String },

    #[error("Historical fetch failed for {symbol}: {message}")]
    HistoricalFetchFailed { symbol: String, message: String },

    #[error("{step} for {symbol} timed out after {after_ms} ms")]
    #[serde(rename_all = "camelCase")]
    Timeout {
        symbol: String,
        step: UpdateStep,
        after_ms: u64,
    },

    #[error("Failed to persist {target} for {symbol}: {message}")]
    PersistenceFailed {
        symbol: String,
        target: PersistTarget,
        message: String,
    },

    /// The update task panicked or was cancelled.
    #[error("Update task for {symbol} aborted: {message}")]
    Aborted { symbol: String, message: String },
}

impl UpdateError {
    pub fn timeout(symbol: &str, step: UpdateStep, after: Duration) -> Self {
        UpdateError::Timeout {
            symbol: symbol.to_string(),
            step,
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Whether this error ends the update for its symbol.
    pub fn is_fatal(&self) -> bool {
        match self {
            UpdateError::QuoteFetchFailed { .. } | UpdateError::Aborted { .. } => true,
            UpdateError::HistoricalFetchFailed { .. } => false,
            UpdateError::Timeout { step, .. } => *step == UpdateStep::Quote,
            UpdateError::PersistenceFailed { target, .. } => *target == PersistTarget::Security,
        }
    }
}

/// What a successful update returns: the persisted security fields plus the
/// live price figures from the quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSnapshot {
    pub symbol: String,
    pub provider_symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<Decimal>,
    pub currency: String,
    pub exchange: String,
    pub price: Decimal,
    pub previous_close: Option<Decimal>,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub volume: Option<u64>,
    pub day_high: Option<Decimal>,
    pub day_low: Option<Decimal>,
    pub fifty_two_week_high: Option<Decimal>,
    pub fifty_two_week_low: Option<Decimal>,
    pub as_of: DateTime<Utc>,
}

impl SymbolSnapshot {
    pub fn new(
        security: &Security,
        symbol: &ResolvedSymbol,
        quote: &QuoteSnapshot,
        as_of: DateTime<Utc>,
    ) -> Self {
        let price = quote.regular_market_price;
        let (change, change_percent) = price_change(price, quote.regular_market_previous_close);

        Self {
            symbol: security.symbol.clone(),
            provider_symbol: symbol.provider.clone(),
            name: security.name.clone(),
            sector: security.sector.clone(),
            industry: security.industry.clone(),
            market_cap: security.market_cap,
            currency: security.currency.clone(),
            exchange: security.exchange.clone(),
            price,
            previous_close: quote.regular_market_previous_close,
            change,
            change_percent,
            volume: quote.regular_market_volume,
            day_high: quote.regular_market_day_high,
            day_low: quote.regular_market_day_low,
            fifty_two_week_high: quote.fifty_two_week_high,
            fifty_two_week_low: quote.fifty_two_week_low,
            as_of,
        }
    }
}

/// Absolute and percentage change against the previous close.
///
/// Both are zero when there is no usable previous close.
pub fn price_change(price: Decimal, previous_close: Option<Decimal>) -> (Decimal, Decimal) {
    match previous_close {
        Some(prev) if !prev.is_zero() => {
            let change = price - prev;
            let percent = (change / prev * Decimal::ONE_HUNDRED).round_dp(4);
            (change, percent)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    }
}

/// A completed update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolUpdate {
    pub snapshot: SymbolSnapshot,
    /// Price points upserted by this update.
    pub points_written: usize,
    /// Non-fatal problems hit along the way.
    pub warnings: Vec<UpdateError>,
    /// True when served from the response cache without provider calls.
    pub from_cache: bool,
}

/// Outcome for one requested symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolUpdateResult {
    /// Symbol as the caller supplied it.
    pub symbol: String,
    pub outcome: std::result::Result<SymbolUpdate, UpdateError>,
}

impl SymbolUpdateResult {
    pub fn succeeded(symbol: impl Into<String>, update: SymbolUpdate) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: Ok(update),
        }
    }

    pub fn failed(symbol: impl Into<String>, error: UpdateError) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&UpdateError> {
        self.outcome.as_ref().err()
    }
}

/// Aggregate outcome of a batch, in input order.
///
/// `succeeded` and `failed` partition the requested symbols.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub results: Vec<SymbolUpdateResult>,
}

impl BatchReport {
    pub fn from_results(results: Vec<SymbolUpdateResult>) -> Self {
        let mut report = Self::default();
        for result in results {
            report.push(result);
        }
        report
    }

    pub fn push(&mut self, result: SymbolUpdateResult) {
        self.total += 1;
        if result.is_success() {
            self.succeeded.push(result.symbol.clone());
        } else {
            self.failed.push(result.symbol.clone());
        }
        self.results.push(result);
    }

    /// Append another report, keeping order.
    pub fn merge(&mut self, other: BatchReport) {
        for result in other.results {
            self.push(result);
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Share of symbols updated, as a percentage. 100 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.succeeded.len() as f64 / self.total as f64 * 100.0
    }

    pub fn summary(&self) -> String {
        format!(
            "Updated {} of {} symbols ({} failed)",
            self.succeeded.len(),
            self.total,
            self.failed.len()
        )
    }
}
