//! Request and response models for the gateway HTTP surface.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Room the credential is scoped to.
    pub room_name: String,

    /// Subject identity of the participant.
    pub identity: String,

    /// Display name shown to other participants (defaults to identity).
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Response body for `POST /v1/token`.
///
/// A client needs both fields to join: the endpoint to connect to and the
/// signed credential to present there.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub connection_url: String,
    pub token: String,
}

/// Request body for `POST /v1/egress/start`.
#[derive(Debug, Deserialize)]
pub struct StartEgressRequest {
    pub room_name: String,

    /// Composite layout (defaults to "grid").
    #[serde(default)]
    pub layout: Option<String>,
}

/// Request body for `POST /v1/egress/stop`.
#[derive(Debug, Deserialize)]
pub struct StopEgressRequest {
    pub egress_id: String,
}
