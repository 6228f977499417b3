//! Media Gateway configuration.
//!
//! Configuration is loaded from environment variables once at startup and
//! injected into handlers via `AppState`; there is no ambient global state.
//! The API secret is held as a `SecretString` and redacted in Debug output.

use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default directory for recorded egress output files.
pub const DEFAULT_EGRESS_OUTPUT_DIR: &str = "/out";

/// Default timeout for media server API requests in seconds.
pub const DEFAULT_MEDIA_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Minimum accepted API secret length. Shorter HMAC keys are rejected at
/// startup rather than producing weak tokens at runtime.
pub const MIN_API_SECRET_LENGTH: usize = 16;

/// Media Gateway configuration.
///
/// The API key/secret pair signs both participant access tokens and the
/// server tokens used to authenticate against the media server API. It is
/// never logged and never returned to any caller.
#[derive(Clone)]
pub struct Config {
    /// API key identifying this gateway to the media server (JWT issuer).
    pub api_key: String,

    /// API secret used as the HS256 signing key.
    pub api_secret: SecretString,

    /// Base URL of the media server control API (e.g. "https://media.example.com").
    pub server_url: String,

    /// WebSocket URL returned to clients alongside access tokens.
    pub ws_url: String,

    /// HTTP server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Directory the media server writes recording files into.
    pub egress_output_dir: String,

    /// Timeout for media server API requests in seconds.
    pub media_request_timeout_secs: u64,
}

/// Custom Debug implementation that redacts the API secret.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("server_url", &self.server_url)
            .field("ws_url", &self.ws_url)
            .field("bind_address", &self.bind_address)
            .field("egress_output_dir", &self.egress_output_dir)
            .field(
                "media_request_timeout_secs",
                &self.media_request_timeout_secs,
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid API secret: {0}")]
    InvalidApiSecret(String),

    #[error("Invalid media request timeout configuration: {0}")]
    InvalidRequestTimeout(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let api_key = vars
            .get("MEDIA_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("MEDIA_API_KEY".to_string()))?
            .clone();

        let api_secret_raw = vars
            .get("MEDIA_API_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("MEDIA_API_SECRET".to_string()))?;

        if api_secret_raw.len() < MIN_API_SECRET_LENGTH {
            return Err(ConfigError::InvalidApiSecret(format!(
                "Expected at least {} characters, got {}",
                MIN_API_SECRET_LENGTH,
                api_secret_raw.len()
            )));
        }

        let api_secret = SecretString::from(api_secret_raw.clone());

        let server_url = vars
            .get("MEDIA_SERVER_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("MEDIA_SERVER_URL".to_string()))?
            .trim_end_matches('/')
            .to_string();

        // Clients connect over WebSocket; when no explicit URL is configured,
        // derive one from the API URL by swapping the scheme.
        let ws_url = vars
            .get("MEDIA_WS_URL")
            .cloned()
            .unwrap_or_else(|| derive_ws_url(&server_url));

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let egress_output_dir = vars
            .get("EGRESS_OUTPUT_DIR")
            .cloned()
            .unwrap_or_else(|| DEFAULT_EGRESS_OUTPUT_DIR.to_string());

        // Parse request timeout with validation
        let media_request_timeout_secs =
            if let Some(value_str) = vars.get("MEDIA_REQUEST_TIMEOUT_SECS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidRequestTimeout(format!(
                        "MEDIA_REQUEST_TIMEOUT_SECS must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidRequestTimeout(
                        "MEDIA_REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
                    ));
                }

                value
            } else {
                DEFAULT_MEDIA_REQUEST_TIMEOUT_SECS
            };

        Ok(Config {
            api_key,
            api_secret,
            server_url,
            ws_url,
            bind_address,
            egress_output_dir,
            media_request_timeout_secs,
        })
    }
}

/// Derive a WebSocket URL from an HTTP(S) API URL.
fn derive_ws_url(server_url: &str) -> String {
    if let Some(rest) = server_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = server_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        server_url.to_string()
    }
}
