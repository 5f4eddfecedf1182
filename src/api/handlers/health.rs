//! Health and status endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::api::server::AppState;
use crate::error::Result;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "wsrelay"
        })),
    )
}

/// Chat and storage status
pub async fn status(State(state): State<AppState>) -> Result<Json<Value>> {
    let store = state.storage.store();
    let latency = store.health_check().await?;
    let keys = store.len().await?;
    let log = state.chat.log();

    Ok(Json(json!({
        "connections": state.chat.registry().len(),
        "log_length": log.len(),
        "log_capacity": log.capacity(),
        "messages_total": log.total_appended(),
        "storage": {
            "backend": store.backend(),
            "keys": keys,
            "latency_ms": latency.as_secs_f64() * 1000.0,
            "pool": store.pool_usage(),
        },
        "started_at": state.started_at,
        "uptime_secs": state.started.elapsed().as_secs(),
    })))
}
