//! Yahoo Finance API response models.
//!
//! These models are used for parsing the quoteSummary API responses
//! which carry the descriptive fields (names, sector, market cap) that the
//! chart endpoint does not.

use serde::Deserialize;

/// Main response wrapper for quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResponse {
    pub quote_summary: YahooQuoteSummary,
}

/// Quote summary container
#[derive(Debug, Deserialize)]
pub struct YahooQuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<YahooQuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<YahooSummaryError>,
}

/// Error block returned alongside an empty result, e.g. for unknown symbols.
#[derive(Debug, Deserialize)]
pub struct YahooSummaryError {
    pub code: Option<String>,
    pub description: Option<String>,
}

/// Individual result from quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResult {
    pub price: Option<YahooPriceData>,
    pub summary_profile: Option<YahooSummaryProfile>,
    pub summary_detail: Option<YahooSummaryDetail>,
}

/// Price data from quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooPriceData {
    pub currency: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub quote_type: Option<String>,
    pub exchange_name: Option<String>,
    pub market_cap: Option<YahooPriceDetail>,
    pub regular_market_price: Option<YahooPriceDetail>,
    pub regular_market_previous_close: Option<YahooPriceDetail>,
    pub regular_market_day_high: Option<YahooPriceDetail>,
    pub regular_market_day_low: Option<YahooPriceDetail>,
    pub regular_market_volume: Option<YahooPriceDetail>,
    pub regular_market_time: Option<i64>,
}

/// Price detail with raw and formatted values
#[derive(Debug, Deserialize, Clone)]
pub struct YahooPriceDetail {
    pub raw: Option<f64>,
}

/// Summary profile data (company info)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooSummaryProfile {
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
}

/// Summary detail data (financial metrics)
/// Yahoo returns these as nested objects like {"raw": 123.45, "fmt": "123.45"}
/// or empty objects {} when no data is available.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooSummaryDetail {
    pub market_cap: Option<YahooPriceDetail>,
    pub previous_close: Option<YahooPriceDetail>,
    pub volume: Option<YahooPriceDetail>,
    pub fifty_two_week_high: Option<YahooPriceDetail>,
    pub fifty_two_week_low: Option<YahooPriceDetail>,
}

/// Read the raw value of an optional `{raw, fmt}` block.
pub fn raw(detail: &Option<YahooPriceDetail>) -> Option<f64> {
    detail.as_ref().and_then(|d| d.raw)
}
