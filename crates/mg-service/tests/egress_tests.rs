//! Egress orchestration integration tests for the Media Gateway.
//!
//! Tests the recording endpoints:
//!
//! - `POST /v1/egress/start` - Start composite recording (room ensured first)
//! - `POST /v1/egress/stop` - Stop recording by identifier
//!
//! # Test Setup
//!
//! wiremock stands in for the media server; assertions on the recorded
//! requests verify call ordering (room creation strictly before egress
//! start) and that invalid input produces no upstream traffic at all.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use mg_service::clients::{EgressClient, RoomClient};
use mg_service::config::Config;
use mg_service::routes::{self, AppState};
use mg_service::services::room_service;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_API_KEY: &str = "test-api-key";
const TEST_API_SECRET: &str = "test-secret-material-0123456789ab";

const LIST_ROOMS_PATH: &str = "/twirp/livekit.RoomService/ListRooms";
const CREATE_ROOM_PATH: &str = "/twirp/livekit.RoomService/CreateRoom";
const START_EGRESS_PATH: &str = "/twirp/livekit.Egress/StartRoomCompositeEgress";
const STOP_EGRESS_PATH: &str = "/twirp/livekit.Egress/StopEgress";

// ============================================================================
// Test Helpers
// ============================================================================

/// Gateway server wired to a wiremock media server.
struct TestServer {
    addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    mock_server: MockServer,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        let mock_server = MockServer::start().await;

        let vars = HashMap::from([
            ("MEDIA_API_KEY".to_string(), TEST_API_KEY.to_string()),
            ("MEDIA_API_SECRET".to_string(), TEST_API_SECRET.to_string()),
            ("MEDIA_SERVER_URL".to_string(), mock_server.uri()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let timeout = Duration::from_secs(config.media_request_timeout_secs);
        let room_client = RoomClient::new(
            config.server_url.clone(),
            config.api_key.clone(),
            config.api_secret.clone(),
            timeout,
        )?;
        let egress_client = EgressClient::new(
            config.server_url.clone(),
            config.api_key.clone(),
            config.api_secret.clone(),
            timeout,
        )?;

        let state = Arc::new(AppState {
            config,
            room_client,
            egress_client,
        });

        let app = routes::build_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            _server_handle: server_handle,
            mock_server,
        })
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Paths of all requests the mock media server received, in order.
    async fn received_paths(&self) -> Vec<String> {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self._server_handle.abort();
    }
}

fn empty_room_list() -> serde_json::Value {
    serde_json::json!({ "rooms": [] })
}

fn room_list_with(name: &str) -> serde_json::Value {
    serde_json::json!({ "rooms": [{ "sid": "RM_test01", "name": name }] })
}

fn room_json(name: &str) -> serde_json::Value {
    serde_json::json!({ "sid": "RM_test01", "name": name })
}

fn egress_starting(room_name: &str) -> serde_json::Value {
    serde_json::json!({
        "egress_id": "EG_abc123",
        "room_name": room_name,
        "status": "EGRESS_STARTING",
        "started_at": chrono::Utc::now().timestamp()
    })
}

// ============================================================================
// Start Tests
// ============================================================================

/// Starting egress for a room that does not exist creates the room first,
/// then starts the recording.
#[tokio::test]
async fn test_start_fresh_room_creates_then_starts() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_room_list()))
        .expect(1)
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_ROOM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_json("room-42")))
        .expect(1)
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(START_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(egress_starting("room-42")))
        .expect(1)
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/start", server.url()))
        .json(&serde_json::json!({ "room_name": "room-42" }))
        .send()
        .await?;

    assert_eq!(response.status(), 200, "Should return 200 OK");

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["egress_id"], "EG_abc123");
    assert_eq!(body["status"], "EGRESS_STARTING");
    assert_eq!(body["room_name"], "room-42");

    // Room creation must complete before egress start is attempted
    let paths = server.received_paths().await;
    let create_pos = paths.iter().position(|p| p == CREATE_ROOM_PATH);
    let start_pos = paths.iter().position(|p| p == START_EGRESS_PATH);
    assert!(
        create_pos.unwrap() < start_pos.unwrap(),
        "CreateRoom should precede StartRoomCompositeEgress, got {:?}",
        paths
    );

    Ok(())
}

/// An existing room is not re-created.
#[tokio::test]
async fn test_start_existing_room_skips_create() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_list_with("room-42")))
        .expect(1)
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_ROOM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_json("room-42")))
        .expect(0)
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(START_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(egress_starting("room-42")))
        .expect(1)
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/start", server.url()))
        .json(&serde_json::json!({ "room_name": "room-42" }))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    Ok(())
}

/// Losing the creation race still satisfies "room exists"; the start
/// proceeds as if creation had succeeded.
#[tokio::test]
async fn test_start_create_race_already_exists() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_room_list()))
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_ROOM_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "already_exists",
            "msg": "room already exists"
        })))
        .expect(1)
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(START_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(egress_starting("room-42")))
        .expect(1)
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/start", server.url()))
        .json(&serde_json::json!({ "room_name": "room-42" }))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    Ok(())
}

/// The start request sent upstream carries the derived output path, the
/// default layout, and the fixed encoding preset.
#[tokio::test]
async fn test_start_request_shape_sent_upstream() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_list_with("room-42")))
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(START_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(egress_starting("room-42")))
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/start", server.url()))
        .json(&serde_json::json!({ "room_name": "room-42" }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let requests = server.mock_server.received_requests().await.unwrap();
    let start_request = requests
        .iter()
        .find(|r| r.url.path() == START_EGRESS_PATH)
        .expect("Start request should have been sent");

    // Server token, never the participant flavor
    let auth = start_request
        .headers
        .get("authorization")
        .expect("Start request should carry an Authorization header")
        .to_str()?;
    assert!(auth.starts_with("Bearer "));

    let body: serde_json::Value = serde_json::from_slice(&start_request.body)?;
    assert_eq!(body["room_name"], "room-42");
    assert_eq!(body["layout"], "grid", "Layout should default to grid");
    assert_eq!(body["preset"], "H264_720P_30");
    assert_eq!(body["file"]["file_type"], "MP4");

    let filepath = body["file"]["filepath"].as_str().unwrap();
    assert!(
        filepath.starts_with("/out/room-42-"),
        "Output path should live under the configured directory: {}",
        filepath
    );
    assert!(filepath.ends_with(".mp4"));

    Ok(())
}

/// A caller-provided layout overrides the default.
#[tokio::test]
async fn test_start_custom_layout() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_list_with("room-42")))
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(START_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(egress_starting("room-42")))
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/start", server.url()))
        .json(&serde_json::json!({ "room_name": "room-42", "layout": "speaker" }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let requests = server.mock_server.received_requests().await.unwrap();
    let start_request = requests
        .iter()
        .find(|r| r.url.path() == START_EGRESS_PATH)
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&start_request.body)?;
    assert_eq!(body["layout"], "speaker");

    Ok(())
}

/// Room directory failure surfaces as 503, and no recording is attempted.
#[tokio::test]
async fn test_start_room_lookup_failure_returns_503() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(START_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(egress_starting("room-42")))
        .expect(0)
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/start", server.url()))
        .json(&serde_json::json!({ "room_name": "room-42" }))
        .send()
        .await?;

    assert_eq!(response.status(), 503);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "ROOM_SERVICE_UNAVAILABLE");
    // Upstream detail stays server-side
    assert_eq!(body["error"]["message"], "Room service is unavailable");

    Ok(())
}

/// Controller rejection of the start maps to 502.
#[tokio::test]
async fn test_start_controller_rejection_returns_502() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_list_with("room-42")))
        .mount(&server.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(START_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "invalid_argument",
            "msg": "unsupported layout"
        })))
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/start", server.url()))
        .json(&serde_json::json!({ "room_name": "room-42" }))
        .send()
        .await?;

    assert_eq!(response.status(), 502);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "EGRESS_START_FAILED");

    Ok(())
}

/// Empty room name is rejected locally; the media server sees no traffic.
#[tokio::test]
async fn test_start_empty_room_name_no_upstream_calls() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/v1/egress/start", server.url()))
        .json(&serde_json::json!({ "room_name": "" }))
        .send()
        .await?;

    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");

    assert!(
        server.received_paths().await.is_empty(),
        "Invalid input must not reach the media server"
    );

    Ok(())
}

// ============================================================================
// Stop Tests
// ============================================================================

/// Stopping a known job returns the controller's final job metadata.
#[tokio::test]
async fn test_stop_success() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(STOP_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "egress_id": "EG_abc123",
            "room_name": "room-42",
            "status": "EGRESS_ENDING",
            "started_at": 1700000000,
            "ended_at": 1700000900
        })))
        .expect(1)
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/stop", server.url()))
        .json(&serde_json::json!({ "egress_id": "EG_abc123" }))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["egress_id"], "EG_abc123");
    assert_eq!(body["status"], "EGRESS_ENDING");
    assert_eq!(body["ended_at"], 1700000900);

    Ok(())
}

/// An unknown identifier is the controller's rejection, not a gateway
/// validation failure: 502, never 400.
#[tokio::test]
async fn test_stop_unknown_id_returns_502() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path(STOP_EGRESS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "not_found",
            "msg": "egress does not exist"
        })))
        .mount(&server.mock_server)
        .await;

    let response = client
        .post(format!("{}/v1/egress/stop", server.url()))
        .json(&serde_json::json!({ "egress_id": "EG_nope" }))
        .send()
        .await?;

    assert_eq!(response.status(), 502);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "EGRESS_STOP_FAILED");

    Ok(())
}

/// Empty egress identifier is rejected locally.
#[tokio::test]
async fn test_stop_empty_egress_id() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/v1/egress/stop", server.url()))
        .json(&serde_json::json!({ "egress_id": "" }))
        .send()
        .await?;

    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
    assert!(server.received_paths().await.is_empty());

    Ok(())
}

// ============================================================================
// Room Existence Tests
// ============================================================================

/// ensure_room_exists is idempotent: the second call observes the room and
/// performs no second creation.
#[tokio::test]
async fn test_ensure_room_exists_idempotent() -> Result<()> {
    let mock_server = MockServer::start().await;

    // First lookup misses, subsequent lookups hit
    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_room_list()))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_list_with("room-42")))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_ROOM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_json("room-42")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rooms = RoomClient::new(
        mock_server.uri(),
        TEST_API_KEY.to_string(),
        secrecy::SecretString::from(TEST_API_SECRET),
        Duration::from_secs(5),
    )?;

    room_service::ensure_room_exists(&rooms, "room-42").await?;
    room_service::ensure_room_exists(&rooms, "room-42").await?;

    Ok(())
}

/// Room lookup requests authenticate with a bearer server token.
#[tokio::test]
async fn test_room_requests_carry_server_token() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LIST_ROOMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_list_with("room-42")))
        .mount(&mock_server)
        .await;

    let rooms = RoomClient::new(
        mock_server.uri(),
        TEST_API_KEY.to_string(),
        secrecy::SecretString::from(TEST_API_SECRET),
        Duration::from_secs(5),
    )?;

    room_service::ensure_room_exists(&rooms, "room-42").await?;

    let requests = mock_server.received_requests().await.unwrap();
    let auth = requests
        .first()
        .expect("One request expected")
        .headers
        .get("authorization")
        .expect("Authorization header expected")
        .to_str()?;
    assert!(auth.starts_with("Bearer "));

    Ok(())
}
