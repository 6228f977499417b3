//! Access token signing.
//!
//! Tokens are HS256 JWTs signed with the gateway's API secret, in the shape
//! the media server verifies: `iss` carries the API key, `sub` the subject
//! identity, and the `video` claim carries the capability grant.
//!
//! Two token flavors are produced with the same key pair:
//!
//! - participant tokens: join + publish + subscribe for exactly one room,
//!   1 hour TTL, returned to callers of `POST /v1/token`
//! - server tokens: short-lived admin grants attached to outbound media
//!   server API requests, never returned to any caller

use crate::errors::GwError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant token TTL: 1 hour.
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Server API token TTL. These tokens live only for the duration of one
/// outbound request, so the TTL is kept short.
const SERVER_TOKEN_TTL_SECONDS: i64 = 600;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Capability grant embedded in the `video` claim.
///
/// Field names are camelCase on the wire (media server convention).
/// Absent/false fields are omitted so a decoded grant shows exactly the
/// capabilities that were issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    /// Room the grant is scoped to (participant tokens only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub room_join: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub can_publish: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub can_subscribe: bool,

    // Admin capabilities, used on server tokens only.
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_create: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub room_list: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub room_record: bool,
}

impl VideoGrant {
    /// The fixed participant grant: join + publish + subscribe for one room.
    pub fn participant(room: &str) -> Self {
        VideoGrant {
            room: Some(room.to_string()),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
            ..VideoGrant::default()
        }
    }

    /// Grant for room directory operations (lookup, create).
    pub fn room_admin() -> Self {
        VideoGrant {
            room_create: true,
            room_list: true,
            ..VideoGrant::default()
        }
    }

    /// Grant for egress controller operations.
    pub fn egress_admin() -> Self {
        VideoGrant {
            room_record: true,
            ..VideoGrant::default()
        }
    }
}

/// JWT claims for media server tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer: the API key.
    pub iss: String,
    /// Subject identity.
    pub sub: String,
    /// Display name shown to other participants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Not-before timestamp (issuance time).
    pub nbf: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Capability grant.
    pub video: VideoGrant,
}

/// Custom Debug implementation that redacts identity fields.
impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("name", &"[REDACTED]")
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .field("video", &self.video)
            .finish()
    }
}

/// Sign a participant access token granting join + publish + subscribe for
/// `room_name`, expiring [`ACCESS_TOKEN_TTL_SECONDS`] after issuance.
///
/// `display_name` defaults to the identity when not provided.
pub fn participant_token(
    api_key: &str,
    api_secret: &SecretString,
    identity: &str,
    room_name: &str,
    display_name: Option<&str>,
) -> Result<String, GwError> {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessClaims {
        iss: api_key.to_string(),
        sub: identity.to_string(),
        name: Some(display_name.unwrap_or(identity).to_string()),
        nbf: now,
        exp: now + ACCESS_TOKEN_TTL_SECONDS,
        video: VideoGrant::participant(room_name),
    };

    sign(&claims, api_secret)
}

/// Sign a short-lived server token carrying the given admin grant.
pub fn server_api_token(
    api_key: &str,
    api_secret: &SecretString,
    grant: VideoGrant,
) -> Result<String, GwError> {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessClaims {
        iss: api_key.to_string(),
        sub: api_key.to_string(),
        name: None,
        nbf: now,
        exp: now + SERVER_TOKEN_TTL_SECONDS,
        video: grant,
    };

    sign(&claims, api_secret)
}

fn sign(claims: &AccessClaims, api_secret: &SecretString) -> Result<String, GwError> {
    let encoding_key = EncodingKey::from_secret(api_secret.expose_secret().as_bytes());
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &encoding_key)
        .map_err(|e| GwError::TokenSigning(format!("JWT signing operation failed: {}", e)))
}
