use axum::{extract::State, response::Json};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::{errors::AppResult, infra::app_state::AppState};

#[derive(Debug, Serialize)]
pub struct CacheListResponse {
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub removed: usize,
}

pub async fn list_cache_handler(
    State(state): State<AppState>,
) -> AppResult<Json<CacheListResponse>> {
    let dates = state.service().cache().cached_dates().await?;
    Ok(Json(CacheListResponse { dates }))
}

/// The only path through which cached assets are deleted.
pub async fn clear_cache_handler(
    State(state): State<AppState>,
) -> AppResult<Json<CacheClearResponse>> {
    let removed = state.service().cache().clear().await?;
    info!(removed, "local cache cleared over HTTP");
    Ok(Json(CacheClearResponse { removed }))
}
