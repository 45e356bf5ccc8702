use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use crate::api::AppState;
use crate::error::AppError;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once at least one discovery cycle has been stored.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    match state.repo.latest_cycle().await? {
        Some(cycle) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "lastCycleAtMs": cycle.completed_at_ms,
                "definitionCount": cycle.definition_count,
            })),
        )),
        None => Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "waiting for first discovery cycle" })),
        )),
    }
}
