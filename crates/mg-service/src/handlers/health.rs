//! Health check handler.

use axum::Json;
use serde_json::{json, Value};

/// Handler for GET /v1/health
///
/// The gateway holds no durable state, so health is simply liveness.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
