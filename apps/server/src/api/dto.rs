//! Request and response bodies for the HTTP API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pricesync_core::sync::{BatchReport, SymbolUpdate, SymbolUpdateResult, UpdateError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub symbols: Vec<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolResultDto {
    pub symbol: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<SymbolUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<UpdateError>,
}

impl From<SymbolUpdateResult> for SymbolResultDto {
    fn from(result: SymbolUpdateResult) -> Self {
        let (update, error) = match result.outcome {
            Ok(update) => (Some(update), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            symbol: result.symbol,
            success: error.is_none(),
            update,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReportDto {
    pub total: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub success_rate: f64,
    pub results: Vec<SymbolResultDto>,
}

impl From<BatchReport> for BatchReportDto {
    fn from(report: BatchReport) -> Self {
        Self {
            success_rate: report.success_rate(),
            total: report.total,
            succeeded: report.succeeded,
            failed: report.failed,
            results: report.results.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PriceRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CleanupQuery {
    pub before: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}
