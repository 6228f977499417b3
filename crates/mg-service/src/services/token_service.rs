//! Credential issuance.
//!
//! Issuing a token is a pure function of the request and the configured key
//! pair: no external call is made and nothing is persisted. Validation runs
//! before any signing work.

use crate::config::Config;
use crate::errors::GwError;
use crate::models::TokenResponse;
use crate::observability::metrics;
use crate::token;
use tracing::{info, instrument};

/// Issue a participant access token for `identity` in `room_name`.
///
/// The credential always grants exactly join + publish + subscribe for the
/// one room, with a fixed 1 hour TTL. The response pairs the token with the
/// connection endpoint since a client needs both to join.
///
/// # Errors
///
/// - `GwError::InvalidArgument` if `identity` or `room_name` is empty
/// - `GwError::TokenSigning` on a signing fault (nothing partial is returned)
#[instrument(skip(config, identity), fields(room_name = %room_name))]
pub fn issue_access_token(
    config: &Config,
    identity: &str,
    room_name: &str,
    display_name: Option<&str>,
) -> Result<TokenResponse, GwError> {
    if identity.trim().is_empty() {
        return Err(GwError::InvalidArgument("identity is required".to_string()));
    }
    if room_name.trim().is_empty() {
        return Err(GwError::InvalidArgument(
            "room_name is required".to_string(),
        ));
    }

    let token = token::participant_token(
        &config.api_key,
        &config.api_secret,
        identity,
        room_name,
        display_name,
    )?;

    info!(target: "mg.token", room_name = %room_name, "Issued access token");
    metrics::record_token_issued();

    Ok(TokenResponse {
        connection_url: config.ws_url.clone(),
        token,
    })
}
