//! HTTP clients for the external media server API.
//!
//! The media server exposes a Twirp-style JSON API. Every request carries a
//! short-lived server token (signed with the gateway key pair) in the
//! `Authorization` header. Failed calls surface an error body of the form
//! `{"code": "...", "msg": "..."}`.

mod egress_client;
mod room_client;

pub use egress_client::{EgressClient, EgressInfo, EgressStatus, EncodedFileOutput};
pub use room_client::{CreateRoomOutcome, Room, RoomClient};

use serde::Deserialize;

/// Twirp error body returned by the media server on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct TwirpError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub msg: String,
}

/// Parse a Twirp error body, tolerating non-JSON responses.
pub(crate) fn parse_twirp_error(body: &str) -> TwirpError {
    serde_json::from_str(body).unwrap_or_else(|_| TwirpError {
        code: "unknown".to_string(),
        msg: body.to_string(),
    })
}
