//! Egress lifecycle handlers.

use crate::clients::EgressInfo;
use crate::errors::GwError;
use crate::models::{StartEgressRequest, StopEgressRequest};
use crate::routes::AppState;
use crate::services::egress_service;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /v1/egress/start
///
/// Starts a composite recording of a room, ensuring the room exists first.
///
/// # Response
///
/// - 200 OK: full job metadata including `egress_id`
/// - 400 Bad Request: missing or empty `room_name`
/// - 502 Bad Gateway: egress controller rejected the start
/// - 503 Service Unavailable: room directory unreachable
#[instrument(skip(state, payload), fields(room_name = %payload.room_name))]
pub async fn start_egress(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StartEgressRequest>,
) -> Result<Json<EgressInfo>, GwError> {
    let info = egress_service::start_composite(
        &state.room_client,
        &state.egress_client,
        &state.config.egress_output_dir,
        &payload.room_name,
        payload.layout.as_deref(),
    )
    .await?;

    Ok(Json(info))
}

/// Handler for POST /v1/egress/stop
///
/// Stops a recording job by its identifier.
///
/// # Response
///
/// - 200 OK: final job metadata as reported by the controller
/// - 400 Bad Request: missing or empty `egress_id`
/// - 502 Bad Gateway: controller rejected the stop (unknown or
///   already-stopped identifier included)
#[instrument(skip(state, payload), fields(egress_id = %payload.egress_id))]
pub async fn stop_egress(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StopEgressRequest>,
) -> Result<Json<EgressInfo>, GwError> {
    let info = egress_service::stop(&state.egress_client, &payload.egress_id).await?;

    Ok(Json(info))
}
