//! Egress orchestration.
//!
//! Starting a composite recording guarantees the target room exists before
//! the controller is asked to record it; the existence check strictly
//! precedes the start call. Stop needs no such check; an unknown or
//! already-stopped identifier is the controller's concern.
//!
//! Start is deliberately not idempotent: two calls for the same room start
//! two independent jobs, matching the controller's own semantics.

use crate::clients::{EgressClient, EgressInfo, EncodedFileOutput, RoomClient};
use crate::errors::GwError;
use crate::observability::metrics;
use crate::services::room_service;
use tracing::{info, instrument};
use uuid::Uuid;

/// Default composite layout when the caller does not specify one.
pub const DEFAULT_LAYOUT: &str = "grid";

/// Container format for composite recordings.
const FILE_TYPE_MP4: &str = "MP4";

/// Start a composite recording of `room_name`.
///
/// Ensures the room exists first (creating an empty one if needed), then
/// asks the egress controller to start recording into a collision-free
/// output path.
///
/// # Errors
///
/// - `GwError::InvalidArgument` if `room_name` is empty (no network call is
///   made)
/// - `GwError::RoomServiceUnavailable` propagated unchanged from the
///   existence guarantee
/// - `GwError::EgressStartFailed` on controller rejection
#[instrument(skip(rooms, egress, output_dir))]
pub async fn start_composite(
    rooms: &RoomClient,
    egress: &EgressClient,
    output_dir: &str,
    room_name: &str,
    layout: Option<&str>,
) -> Result<EgressInfo, GwError> {
    if room_name.trim().is_empty() {
        return Err(GwError::InvalidArgument(
            "room_name is required".to_string(),
        ));
    }

    // The controller requires a valid room target; this ordering is
    // mandatory, not an optimization.
    room_service::ensure_room_exists(rooms, room_name).await?;

    let file = EncodedFileOutput {
        file_type: FILE_TYPE_MP4.to_string(),
        filepath: output_filepath(output_dir, room_name),
    };

    let info = egress
        .start_room_composite(room_name, layout.unwrap_or(DEFAULT_LAYOUT), file)
        .await?;

    info!(
        target: "mg.egress",
        egress_id = %info.egress_id,
        room_name = %room_name,
        "Started composite egress"
    );
    metrics::record_egress_start();

    Ok(info)
}

/// Stop a recording job by its identifier.
///
/// # Errors
///
/// - `GwError::InvalidArgument` if `egress_id` is empty
/// - `GwError::EgressStopFailed` on controller rejection, including unknown
///   or already-stopped identifiers
#[instrument(skip(egress))]
pub async fn stop(egress: &EgressClient, egress_id: &str) -> Result<EgressInfo, GwError> {
    if egress_id.trim().is_empty() {
        return Err(GwError::InvalidArgument(
            "egress_id is required".to_string(),
        ));
    }

    let info = egress.stop_egress(egress_id).await?;

    info!(
        target: "mg.egress",
        egress_id = %egress_id,
        status = ?info.status,
        "Stopped composite egress"
    );
    metrics::record_egress_stop();

    Ok(info)
}

/// Build a collision-free output path for a recording.
///
/// Millisecond timestamps alone can collide for starts issued in the same
/// process tick, so a random suffix is appended as well.
fn output_filepath(output_dir: &str, room_name: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let uuid = Uuid::new_v4().simple().to_string();
    let suffix = uuid.get(..8).unwrap_or("00000000");

    format!(
        "{}/{}-{}-{}.mp4",
        output_dir.trim_end_matches('/'),
        sanitize_path_component(room_name),
        timestamp,
        suffix
    )
}

/// Restrict a room name to filesystem-safe characters for the output path.
fn sanitize_path_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
