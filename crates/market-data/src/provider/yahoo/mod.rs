//! Yahoo Finance market data provider.
//!
//! Quotes come from the quoteSummary endpoint (price, summaryProfile and
//! summaryDetail modules), which needs a crumb/cookie pair. When that fails
//! the provider falls back to the chart endpoint through `yahoo_finance_api`,
//! which has prices but no descriptive fields. History and search always go
//! through `yahoo_finance_api`.

mod models;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use num_traits::FromPrimitive;
use reqwest::header;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{HistoricalBar, Interval, QuoteSnapshot, SearchResult};
use crate::provider::MarketDataProvider;

use models::{raw, YahooQuoteSummaryResponse, YahooQuoteSummaryResult};

const PROVIDER_ID: &str = "YAHOO";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

lazy_static! {
    /// Global cache for Yahoo authentication crumb
    static ref YAHOO_CRUMB: RwLock<Option<CrumbData>> = RwLock::default();
}

fn read_crumb() -> RwLockReadGuard<'static, Option<CrumbData>> {
    YAHOO_CRUMB.read().unwrap_or_else(|poisoned| {
        warn!("Yahoo crumb lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

fn write_crumb() -> RwLockWriteGuard<'static, Option<CrumbData>> {
    YAHOO_CRUMB.write().unwrap_or_else(|poisoned| {
        warn!("Yahoo crumb lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

fn provider_error(message: impl Into<String>) -> MarketDataError {
    MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message: message.into(),
    }
}

fn map_yahoo_error(symbol: &str, e: yahoo::YahooError) -> MarketDataError {
    if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
        MarketDataError::SymbolNotFound(symbol.to_string())
    } else {
        provider_error(e.to_string())
    }
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    client: reqwest::Client,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| provider_error(format!("Failed to initialize Yahoo connector: {}", e)))?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { connector, client })
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        if let Some(crumb) = read_crumb().as_ref() {
            return Ok(crumb.clone());
        }
        self.fetch_crumb().await
    }

    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: Get cookie from fc.yahoo.com
        let response = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to get cookie: {}", e)))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| provider_error("Failed to parse Yahoo cookie"))?;

        // Step 2: Get crumb using cookie
        let crumb = self
            .client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to get crumb: {}", e)))?
            .text()
            .await
            .map_err(|e| provider_error(format!("Failed to read crumb: {}", e)))?;

        let crumb_data = CrumbData { cookie, crumb };
        *write_crumb() = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    fn clear_crumb(&self) {
        *write_crumb() = None;
    }

    // ========================================================================
    // Quote Fetching
    // ========================================================================

    /// Fetch the full quote from quoteSummary.
    async fn fetch_quote_summary(&self, symbol: &str) -> Result<QuoteSnapshot, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=price,summaryProfile,summaryDetail&crumb={}",
            encode(symbol),
            encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| provider_error(format!("quoteSummary request failed: {}", e)))?;

        match response.status() {
            reqwest::StatusCode::UNAUTHORIZED => {
                self.clear_crumb();
                return Err(provider_error("Yahoo authentication expired"));
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            _ => {}
        }

        let data: YahooQuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| provider_error(format!("Failed to parse quoteSummary response: {}", e)))?;

        let result = data
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        map_quote_summary(symbol, &result)
    }

    /// Fallback quote built from the chart endpoint.
    ///
    /// Previous close is taken from the second-to-last bar.
    async fn fetch_chart_quote(&self, symbol: &str) -> Result<QuoteSnapshot, MarketDataError> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| map_yahoo_error(symbol, e))?;

        let bars = response.quotes().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            MarketDataError::SymbolNotFound(symbol.to_string())
        })?;

        let last = bars
            .last()
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let price = Decimal::from_f64_retain(last.close).ok_or_else(|| {
            MarketDataError::ValidationFailed {
                message: format!("Failed to convert close price {} to Decimal", last.close),
            }
        })?;

        let previous_close = bars
            .len()
            .checked_sub(2)
            .and_then(|i| bars.get(i))
            .and_then(|q| Decimal::from_f64_retain(q.close));

        let mut quote = QuoteSnapshot::new(symbol, price);
        quote.regular_market_previous_close = previous_close;
        quote.regular_market_day_high = Decimal::from_f64_retain(last.high);
        quote.regular_market_day_low = Decimal::from_f64_retain(last.low);
        quote.regular_market_volume = Some(last.volume);
        Ok(quote)
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot, MarketDataError> {
        debug!("Fetching quote for {} from Yahoo", symbol);

        match self.fetch_quote_summary(symbol).await {
            Ok(quote) => return Ok(quote),
            Err(e) => {
                debug!(
                    "quoteSummary failed for {}: {}, trying chart fallback",
                    symbol, e
                );
            }
        }

        self.fetch_chart_quote(symbol).await
    }

    async fn fetch_historical(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<HistoricalBar>, MarketDataError> {
        debug!(
            "Fetching {} history for {} from {} to {} from Yahoo",
            interval, symbol, start, end
        );

        if start > end {
            return Err(MarketDataError::ValidationFailed {
                message: format!("Start date {} is after end date {}", start, end),
            });
        }

        let start_time = date_to_offset_datetime(start);
        // End is inclusive; the chart endpoint treats period2 as exclusive.
        let end_time = date_to_offset_datetime(end.succ_opt().unwrap_or(end));

        let response = self
            .connector
            .get_quote_history_interval(symbol, start_time, end_time, interval.as_str())
            .await
            .map_err(|e| map_yahoo_error(symbol, e))?;

        match response.quotes() {
            Ok(yahoo_quotes) => {
                let bars: Vec<HistoricalBar> =
                    yahoo_quotes.into_iter().map(yahoo_quote_to_bar).collect();
                if bars.is_empty() {
                    return Err(MarketDataError::NoDataForRange);
                }
                Ok(bars)
            }
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(
                    "No historical quotes returned for '{}' between {} and {}",
                    symbol, start, end
                );
                Err(MarketDataError::NoDataForRange)
            }
            Err(e) => Err(provider_error(e.to_string())),
        }
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        debug!("Searching Yahoo for '{}'", query);

        let result = self
            .connector
            .search_ticker(&encode(query))
            .await
            .map_err(|e| provider_error(e.to_string()))?;

        let search_results = result
            .quotes
            .iter()
            .map(|item| {
                let name = if item.long_name.trim().is_empty() {
                    &item.short_name
                } else {
                    &item.long_name
                };
                SearchResult::new(&item.symbol, name, &item.exchange, &item.quote_type)
                    .with_score(item.score)
            })
            .collect();

        Ok(search_results)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Midnight UTC of the given date, for the chart endpoint's period bounds.
fn date_to_offset_datetime(date: NaiveDate) -> OffsetDateTime {
    let ts = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default();
    OffsetDateTime::from_unix_timestamp(ts).unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn yahoo_quote_to_bar(q: yahoo::Quote) -> HistoricalBar {
    let date = Utc
        .timestamp_opt(q.timestamp as i64, 0)
        .single()
        .map(|dt| dt.date_naive());

    HistoricalBar {
        date,
        open: Decimal::from_f64_retain(q.open),
        high: Decimal::from_f64_retain(q.high),
        low: Decimal::from_f64_retain(q.low),
        close: Decimal::from_f64_retain(q.close),
        volume: Some(q.volume),
        adj_close: Decimal::from_f64_retain(q.adjclose),
    }
}

fn decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64_retain)
}

/// Map a quoteSummary result onto a [`QuoteSnapshot`].
fn map_quote_summary(
    symbol: &str,
    result: &YahooQuoteSummaryResult,
) -> Result<QuoteSnapshot, MarketDataError> {
    let price = result
        .price
        .as_ref()
        .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;
    let profile = result.summary_profile.as_ref();
    let detail = result.summary_detail.as_ref();

    let regular_market_price =
        decimal(raw(&price.regular_market_price)).ok_or_else(|| {
            MarketDataError::ValidationFailed {
                message: format!("No valid price for {}", symbol),
            }
        })?;

    Ok(QuoteSnapshot {
        symbol: symbol.to_string(),
        long_name: price.long_name.as_deref().map(clean_name),
        short_name: price.short_name.clone(),
        sector: profile.and_then(|p| p.sector.as_deref()).map(format_sector),
        industry: profile.and_then(|p| p.industry.clone()),
        market_cap: decimal(raw(&price.market_cap))
            .or_else(|| detail.and_then(|d| decimal(raw(&d.market_cap)))),
        currency: price.currency.clone(),
        exchange_name: price.exchange_name.clone(),
        regular_market_price,
        regular_market_previous_close: decimal(raw(&price.regular_market_previous_close))
            .or_else(|| detail.and_then(|d| decimal(raw(&d.previous_close)))),
        regular_market_volume: raw(&price.regular_market_volume)
            .or_else(|| detail.and_then(|d| raw(&d.volume)))
            .and_then(u64::from_f64),
        regular_market_day_high: decimal(raw(&price.regular_market_day_high)),
        regular_market_day_low: decimal(raw(&price.regular_market_day_low)),
        fifty_two_week_high: detail.and_then(|d| decimal(raw(&d.fifty_two_week_high))),
        fifty_two_week_low: detail.and_then(|d| decimal(raw(&d.fifty_two_week_low))),
    })
}

/// Undo the HTML escaping Yahoo applies to some long names.
fn clean_name(name: &str) -> String {
    name.replace("&amp;", "&").trim().to_string()
}

/// Convert snake_case sector to Title Case.
fn format_sector(sector: &str) -> String {
    sector
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("Larsen &amp; Toubro Limited "), "Larsen & Toubro Limited");
    }

    #[test]
    fn test_format_sector() {
        assert_eq!(format_sector("technology"), "Technology");
        assert_eq!(format_sector("basic_materials"), "Basic Materials");
        assert_eq!(format_sector("Financial Services"), "Financial Services");
    }

    #[test]
    fn test_date_to_offset_datetime() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let odt = date_to_offset_datetime(date);
        assert_eq!(odt.unix_timestamp(), 1_717_372_800);
    }

    #[test]
    fn test_map_quote_summary_prefers_price_module() {
        let json = r#"{
            "price": {
                "currency": "INR",
                "shortName": "TATA CONSULTANCY",
                "longName": "Tata Consultancy Services Limited",
                "exchangeName": "NSE",
                "regularMarketPrice": {"raw": 3850.25},
                "regularMarketPreviousClose": {"raw": 3800.0},
                "regularMarketVolume": {"raw": 1200000}
            },
            "summaryProfile": {"sector": "technology", "industry": "Information Technology Services"},
            "summaryDetail": {
                "marketCap": {"raw": 13900000000000},
                "previousClose": {"raw": 1.0},
                "fiftyTwoWeekHigh": {"raw": 4254.75},
                "fiftyTwoWeekLow": {"raw": 3311.0}
            }
        }"#;
        let result: YahooQuoteSummaryResult = serde_json::from_str(json).unwrap();
        let quote = map_quote_summary("TCS.NS", &result).unwrap();

        assert_eq!(quote.symbol, "TCS.NS");
        assert_eq!(quote.regular_market_price, dec!(3850.25));
        assert_eq!(quote.regular_market_previous_close, Some(dec!(3800)));
        assert_eq!(quote.regular_market_volume, Some(1_200_000));
        assert_eq!(quote.sector.as_deref(), Some("Technology"));
        assert_eq!(quote.market_cap, Some(dec!(13900000000000)));
        assert_eq!(quote.fifty_two_week_low, Some(dec!(3311)));
        assert_eq!(quote.exchange_name.as_deref(), Some("NSE"));
    }

    #[test]
    fn test_map_quote_summary_requires_price() {
        let json = r#"{"price": {"currency": "INR", "regularMarketPrice": {}}}"#;
        let result: YahooQuoteSummaryResult = serde_json::from_str(json).unwrap();
        let err = map_quote_summary("X.NS", &result).unwrap_err();
        assert!(matches!(err, MarketDataError::ValidationFailed { .. }));

        let json = r#"{"summaryProfile": {"sector": "technology"}}"#;
        let result: YahooQuoteSummaryResult = serde_json::from_str(json).unwrap();
        let err = map_quote_summary("X.NS", &result).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(_)));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_quote_live() {
        let provider = YahooProvider::new().unwrap();
        let quote = provider.fetch_quote("RELIANCE.NS").await.unwrap();
        assert!(quote.regular_market_price > Decimal::ZERO);
    }
}
