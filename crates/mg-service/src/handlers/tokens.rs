//! Token issuance handler.

use crate::errors::GwError;
use crate::models::{TokenRequest, TokenResponse};
use crate::routes::AppState;
use crate::services::token_service;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /v1/token
///
/// Issues a signed access token for one identity in one room, together with
/// the connection endpoint.
///
/// # Response
///
/// - 200 OK: `{connection_url, token}`
/// - 400 Bad Request: missing or empty `identity`/`room_name`
/// - 500 Internal Server Error: signing fault
#[instrument(skip(state, payload), fields(room_name = %payload.room_name))]
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, GwError> {
    let response = token_service::issue_access_token(
        &state.config,
        &payload.identity,
        &payload.room_name,
        payload.display_name.as_deref(),
    )?;

    Ok(Json(response))
}
