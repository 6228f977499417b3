//! Media Gateway error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse`
//! impl. Detail from external collaborators is logged server-side; clients
//! receive a generic message so controller internals are never leaked.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Media Gateway error type.
///
/// Maps to HTTP status codes:
/// - InvalidArgument: 400 Bad Request (client fault, message echoed)
/// - TokenSigning, Internal: 500 Internal Server Error
/// - RoomServiceUnavailable: 503 Service Unavailable
/// - EgressStartFailed, EgressStopFailed: 502 Bad Gateway
#[derive(Debug, Error)]
pub enum GwError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    #[error("Room service unavailable: {0}")]
    RoomServiceUnavailable(String),

    #[error("Egress start failed: {0}")]
    EgressStartFailed(String),

    #[error("Egress stop failed: {0}")]
    EgressStopFailed(String),

    #[error("Internal server error")]
    Internal,
}

impl GwError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            GwError::InvalidArgument(_) => 400,
            GwError::TokenSigning(_) | GwError::Internal => 500,
            GwError::RoomServiceUnavailable(_) => 503,
            GwError::EgressStartFailed(_) | GwError::EgressStopFailed(_) => 502,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for GwError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            GwError::InvalidArgument(reason) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ARGUMENT",
                reason.clone(),
            ),
            GwError::TokenSigning(detail) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "mg.token", detail = %detail, "Token signing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TOKEN_SIGNING_FAILED",
                    "Failed to generate access token".to_string(),
                )
            }
            GwError::RoomServiceUnavailable(detail) => {
                tracing::warn!(target: "mg.rooms", detail = %detail, "Room service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ROOM_SERVICE_UNAVAILABLE",
                    "Room service is unavailable".to_string(),
                )
            }
            GwError::EgressStartFailed(detail) => {
                tracing::warn!(target: "mg.egress", detail = %detail, "Egress start failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "EGRESS_START_FAILED",
                    "Failed to start recording".to_string(),
                )
            }
            GwError::EgressStopFailed(detail) => {
                tracing::warn!(target: "mg.egress", detail = %detail, "Egress stop failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "EGRESS_STOP_FAILED",
                    "Failed to stop recording".to_string(),
                )
            }
            GwError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
