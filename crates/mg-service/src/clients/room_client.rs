//! Room directory client.
//!
//! Wraps the media server's RoomService endpoints used by the gateway:
//! room lookup and empty-room creation. The gateway authenticates with a
//! short-lived server token carrying room admin grants.

use super::{parse_twirp_error, TwirpError};
use crate::errors::GwError;
use crate::token::{self, VideoGrant};
use reqwest::Client;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, instrument, warn};

/// A room as reported by the media server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Server-assigned room identifier.
    #[serde(default)]
    pub sid: String,

    /// Room name (unique key).
    pub name: String,
}

/// Outcome of a create call.
///
/// Creation races with concurrent callers; the media server's uniqueness
/// constraint resolves them, and losing the race still satisfies the
/// caller's postcondition that the room exists.
#[derive(Debug)]
pub enum CreateRoomOutcome {
    Created(Room),
    AlreadyExists,
}

#[derive(Debug, Serialize)]
struct ListRoomsRequest {
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListRoomsResponse {
    #[serde(default)]
    rooms: Vec<Room>,
}

#[derive(Debug, Serialize)]
struct CreateRoomRequest {
    name: String,
}

/// HTTP client for the media server room directory.
#[derive(Clone)]
pub struct RoomClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Base URL of the media server API.
    base_url: String,

    /// Key pair for signing server tokens.
    api_key: String,
    api_secret: SecretString,
}

impl RoomClient {
    /// Create a new room directory client.
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
                error!(target: "mg.clients.rooms", error = %e, "Failed to build HTTP client");
                GwError::Internal
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            api_secret,
        })
    }

    /// Look up rooms matching `name`.
    ///
    /// Returns an empty list when the room does not exist.
    ///
    /// # Errors
    ///
    /// `GwError::RoomServiceUnavailable` on transport failure or any
    /// non-success response.
    #[instrument(skip(self))]
    pub async fn list_rooms(&self, name: &str) -> Result<Vec<Room>, GwError> {
        let url = format!("{}/twirp/livekit.RoomService/ListRooms", self.base_url);
        let token = self.server_token()?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&ListRoomsRequest {
                names: vec![name.to_string()],
            })
            .send()
            .await
            .map_err(|e| {
                warn!(target: "mg.clients.rooms", error = %e, "ListRooms request failed");
                GwError::RoomServiceUnavailable(format!("ListRooms request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(target: "mg.clients.rooms", status = %status, body = %body, "ListRooms rejected");
            return Err(GwError::RoomServiceUnavailable(format!(
                "ListRooms returned {}",
                status
            )));
        }

        let parsed: ListRoomsResponse = response.json().await.map_err(|e| {
            error!(target: "mg.clients.rooms", error = %e, "Failed to parse ListRooms response");
            GwError::RoomServiceUnavailable(format!("Invalid ListRooms response: {}", e))
        })?;

        Ok(parsed.rooms)
    }

    /// Create an empty room named `name`.
    ///
    /// An `already_exists` rejection is reported as
    /// [`CreateRoomOutcome::AlreadyExists`], not as an error.
    ///
    /// # Errors
    ///
    /// `GwError::RoomServiceUnavailable` on transport failure or any other
    /// non-success response.
    #[instrument(skip(self))]
    pub async fn create_room(&self, name: &str) -> Result<CreateRoomOutcome, GwError> {
        let url = format!("{}/twirp/livekit.RoomService/CreateRoom", self.base_url);
        let token = self.server_token()?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&CreateRoomRequest {
                name: name.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                warn!(target: "mg.clients.rooms", error = %e, "CreateRoom request failed");
                GwError::RoomServiceUnavailable(format!("CreateRoom request failed: {}", e))
            })?;

        let status = response.status();
        if status.is_success() {
            let room: Room = response.json().await.map_err(|e| {
                error!(target: "mg.clients.rooms", error = %e, "Failed to parse CreateRoom response");
                GwError::RoomServiceUnavailable(format!("Invalid CreateRoom response: {}", e))
            })?;
            return Ok(CreateRoomOutcome::Created(room));
        }

        let body = response.text().await.unwrap_or_default();
        let twirp: TwirpError = parse_twirp_error(&body);

        if twirp.code == "already_exists" {
            // Another caller won the creation race; the postcondition holds.
            return Ok(CreateRoomOutcome::AlreadyExists);
        }

        warn!(
            target: "mg.clients.rooms",
            status = %status,
            code = %twirp.code,
            msg = %twirp.msg,
            "CreateRoom rejected"
        );
        Err(GwError::RoomServiceUnavailable(format!(
            "CreateRoom returned {}: {}",
            status, twirp.msg
        )))
    }

    fn server_token(&self) -> Result<String, GwError> {
        token::server_api_token(&self.api_key, &self.api_secret, VideoGrant::room_admin())
    }
}
