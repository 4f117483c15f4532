use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pricesync_core::sync::SymbolUpdate;
use pricesync_market_data::SearchResult;

use super::dto::{BatchReportDto, SearchQuery, SyncRequest};
use crate::{error::ApiResult, main_lib::AppState};

async fn sync_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> ApiResult<Json<BatchReportDto>> {
    let concurrency = request
        .concurrency
        .unwrap_or(state.sync_service.config().default_concurrency);
    let report = state
        .sync_service
        .synchronize(&request.symbols, concurrency)
        .await?;
    Ok(Json(report.into()))
}

async fn sync_symbol(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SymbolUpdate>> {
    let result = state.sync_service.synchronize_one(&symbol).await?;
    Ok(Json(result.outcome?))
}

async fn search(
    Query(params): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    let results = state.sync_service.search_symbols(&params.query).await?;
    Ok(Json(results))
}

/// Start the daily update in the background. Paging delays make it outlive
/// any reasonable request timeout.
async fn run_daily_update(State(state): State<Arc<AppState>>) -> StatusCode {
    let job = state.daily_job.clone();
    tokio::spawn(async move { crate::scheduler::run_daily_update(&job).await });
    StatusCode::ACCEPTED
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_batch))
        .route("/sync/{symbol}", post(sync_symbol))
        .route("/search", get(search))
        .route("/jobs/daily-update", post(run_daily_update))
}
