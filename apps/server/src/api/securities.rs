use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use pricesync_core::{prices::DailyPricePoint, securities::Security, sync::storage_symbol};

use super::dto::{CleanupQuery, DeletedResponse, PriceRangeQuery};
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Storage key for a path symbol, so "tcs" and "TCS.NS" address the same row.
fn storage_key(state: &AppState, symbol: &str) -> ApiResult<String> {
    let suffix = &state.sync_service.config().default_suffix;
    storage_symbol(symbol, suffix).map_err(|e| ApiError::Core(e.into()))
}

async fn list_securities(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Security>>> {
    Ok(Json(state.security_store.list_securities()?))
}

async fn get_security(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Security>> {
    let key = storage_key(&state, &symbol)?;
    state
        .security_store
        .find_security(&key)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn delete_security(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    if state.sync_service.delete_security(&symbol).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn get_prices(
    Path(symbol): Path<String>,
    Query(range): Query<PriceRangeQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DailyPricePoint>>> {
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(ApiError::BadRequest(format!(
                "'from' ({}) is after 'to' ({})",
                from, to
            )));
        }
    }
    let key = storage_key(&state, &symbol)?;
    if state.security_store.find_security(&key)?.is_none() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(state.price_store.price_points(&key, range.from, range.to)?))
}

async fn cleanup_prices(
    Query(params): Query<CleanupQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeletedResponse>> {
    let deleted = state.sync_service.cleanup_before(params.before).await?;
    Ok(Json(DeletedResponse { deleted }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/securities", get(list_securities))
        .route(
            "/securities/{symbol}",
            get(get_security).delete(delete_security),
        )
        .route("/securities/{symbol}/prices", get(get_prices))
        .route("/prices", delete(cleanup_prices))
}
