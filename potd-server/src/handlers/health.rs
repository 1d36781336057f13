use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::infra::app_state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    let mut health_status = json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "store": if config.store.is_some() { "rest" } else { "memory" },
            "walk": {
                "maxAttempts": config.walk.max_attempts,
                "horizonDays": config.walk.horizon_days,
            }
        }
    });

    health_status["checks"]["cache"] =
        match state.service().cache().cached_dates().await {
            Ok(dates) => json!({
                "status": "ok",
                "root": config.cache.root.display().to_string(),
                "entries": dates.len(),
            }),
            Err(e) => json!({
                "status": "unreadable",
                "root": config.cache.root.display().to_string(),
                "error": e.to_string(),
            }),
        };

    Json(health_status)
}
