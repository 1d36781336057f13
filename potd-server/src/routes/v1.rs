use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{cache, picture},
};

pub const PICTURE: &str = "/picture";
pub const PICTURE_VIEW: &str = "/picture/{date}/view";
pub const CACHE: &str = "/cache";

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(PICTURE, post(picture::resolve_picture_handler))
        .route(PICTURE_VIEW, get(picture::view_picture_handler))
        .route(
            CACHE,
            get(cache::list_cache_handler).delete(cache::clear_cache_handler),
        )
}
