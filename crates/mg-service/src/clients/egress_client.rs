//! Egress controller client.
//!
//! Wraps the media server's Egress endpoints: starting a room-composite
//! recording and stopping a job by its identifier. The gateway holds no
//! durable record of jobs; the `egress_id` returned on start is the only
//! handle, and the caller is responsible for retaining it.

use super::parse_twirp_error;
use crate::errors::GwError;
use crate::token::{self, VideoGrant};
use reqwest::Client;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, instrument, warn};

/// Fixed encoding preset for composite recordings (single default tier).
pub const ENCODING_PRESET: &str = "H264_720P_30";

/// Egress job status as reported by the controller.
///
/// Observed transitions: starting -> active -> ending -> complete, with
/// failure possible from starting or active. The gateway observes this
/// state machine, it never owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EgressStatus {
    #[serde(rename = "EGRESS_STARTING")]
    Starting,
    #[serde(rename = "EGRESS_ACTIVE")]
    Active,
    #[serde(rename = "EGRESS_ENDING")]
    Ending,
    #[serde(rename = "EGRESS_COMPLETE")]
    Complete,
    #[serde(rename = "EGRESS_FAILED")]
    Failed,
    #[serde(rename = "EGRESS_ABORTED")]
    Aborted,
}

impl EgressStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EgressStatus::Complete | EgressStatus::Failed | EgressStatus::Aborted
        )
    }
}

/// File output descriptor for a recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedFileOutput {
    /// Container format, fixed to "MP4" for composite recordings.
    pub file_type: String,

    /// Output path, derived from room name and start time so that
    /// concurrent starts never collide.
    pub filepath: String,
}

/// Egress job metadata as reported by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EgressInfo {
    /// Opaque job identifier assigned by the controller on start.
    pub egress_id: String,

    #[serde(default)]
    pub room_name: String,

    pub status: EgressStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<EncodedFileOutput>,
}

#[derive(Debug, Serialize)]
struct StartRoomCompositeRequest {
    room_name: String,
    layout: String,
    file: EncodedFileOutput,
    preset: String,
}

#[derive(Debug, Serialize)]
struct StopEgressRequest {
    egress_id: String,
}

/// HTTP client for the media server egress controller.
#[derive(Clone)]
pub struct EgressClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: SecretString,
}

impl EgressClient {
    /// Create a new egress controller client.
    ///
    /// # Errors
    ///
    /// Returns `GwError::Internal` if the HTTP client cannot be built.
    pub fn new(
        base_url: String,
        api_key: String,
        api_secret: SecretString,
        timeout: Duration,
    ) -> Result<Self, GwError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "mg.clients.egress", error = %e, "Failed to build HTTP client");
                GwError::Internal
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            api_secret,
        })
    }

    /// Start a composite recording of `room_name` with the given layout and
    /// output descriptor.
    ///
    /// # Errors
    ///
    /// `GwError::EgressStartFailed` on transport failure or controller
    /// rejection; the controller's detail is preserved for diagnostics.
    #[instrument(skip(self, file))]
    pub async fn start_room_composite(
        &self,
        room_name: &str,
        layout: &str,
        file: EncodedFileOutput,
    ) -> Result<EgressInfo, GwError> {
        let url = format!(
            "{}/twirp/livekit.Egress/StartRoomCompositeEgress",
            self.base_url
        );
        let token = self.server_token()?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&StartRoomCompositeRequest {
                room_name: room_name.to_string(),
                layout: layout.to_string(),
                file,
                preset: ENCODING_PRESET.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                warn!(target: "mg.clients.egress", error = %e, "StartRoomCompositeEgress request failed");
                GwError::EgressStartFailed(format!("start request failed: {}", e))
            })?;

        self.handle_response(response, RequestKind::Start).await
    }

    /// Stop a recording job by identifier.
    ///
    /// No existence check is performed; an unknown or already-stopped
    /// identifier is the controller's concern and surfaces as a rejection.
    ///
    /// # Errors
    ///
    /// `GwError::EgressStopFailed` on transport failure or controller
    /// rejection.
    #[instrument(skip(self))]
    pub async fn stop_egress(&self, egress_id: &str) -> Result<EgressInfo, GwError> {
        let url = format!("{}/twirp/livekit.Egress/StopEgress", self.base_url);
        let token = self.server_token()?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&StopEgressRequest {
                egress_id: egress_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                warn!(target: "mg.clients.egress", error = %e, "StopEgress request failed");
                GwError::EgressStopFailed(format!("stop request failed: {}", e))
            })?;

        self.handle_response(response, RequestKind::Stop).await
    }

    /// Parse a controller response, mapping rejections to the operation's
    /// error variant.
    async fn handle_response(
        &self,
        response: reqwest::Response,
        kind: RequestKind,
    ) -> Result<EgressInfo, GwError> {
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(|e| {
                error!(target: "mg.clients.egress", error = %e, "Failed to parse egress response");
                kind.error(format!("invalid controller response: {}", e))
            });
        }

        let body = response.text().await.unwrap_or_default();
        let twirp = parse_twirp_error(&body);
        warn!(
            target: "mg.clients.egress",
            status = %status,
            code = %twirp.code,
            msg = %twirp.msg,
            "Egress controller rejected request"
        );
        Err(kind.error(format!("controller returned {}: {}", status, twirp.msg)))
    }

    fn server_token(&self) -> Result<String, GwError> {
        token::server_api_token(&self.api_key, &self.api_secret, VideoGrant::egress_admin())
    }
}

#[derive(Clone, Copy)]
enum RequestKind {
    Start,
    Stop,
}

impl RequestKind {
    fn error(self, detail: String) -> GwError {
        match self {
            RequestKind::Start => GwError::EgressStartFailed(detail),
            RequestKind::Stop => GwError::EgressStopFailed(detail),
        }
    }
}
