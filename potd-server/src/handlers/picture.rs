use axum::{
    extract::{Path, State},
    response::Json,
};
use potd_model::{
    PictureRequest, PictureResponse, PictureViewResponse, parse_day_key,
};
use tracing::info;

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

/// Single cache-or-fetch resolution of one date. No walking.
pub async fn resolve_picture_handler(
    State(state): State<AppState>,
    Json(request): Json<PictureRequest>,
) -> AppResult<Json<PictureResponse>> {
    let resolution = state.service().resolve(&request.date).await?;
    info!(
        date = %resolution.record.date,
        cached = resolution.cached,
        "picture resolved"
    );
    Ok(Json(PictureResponse {
        data: resolution.record,
        cached: resolution.cached,
    }))
}

/// Walk back from the requested date, materialize the asset and warm the
/// neighbors in the background.
pub async fn view_picture_handler(
    State(state): State<AppState>,
    Path(raw_date): Path<String>,
) -> AppResult<Json<PictureViewResponse>> {
    let requested =
        parse_day_key(&raw_date).map_err(|_| AppError::invalid_date(&raw_date))?;
    let view = state.service().view(requested).await?;
    info!(
        requested = %view.requested_date,
        resolved = %view.final_date,
        attempts = view.attempts,
        cached = view.cached,
        "picture view ready"
    );
    Ok(Json(view.into()))
}
