//! Room existence guarantee.
//!
//! Check-then-act against the external room directory. There is no
//! client-side atomicity: two concurrent callers may both observe absence
//! and both attempt creation. The directory's uniqueness constraint resolves
//! the race, and the loser's `already_exists` rejection is treated as
//! success: the postcondition is "room exists", regardless of who created
//! it.

use crate::clients::{CreateRoomOutcome, RoomClient};
use crate::errors::GwError;
use tracing::{info, instrument};

/// Ensure a room named `name` exists, creating an empty one if absent.
///
/// Idempotent. Empty rooms are acceptable; egress can be requested before
/// any participant joins.
///
/// # Errors
///
/// `GwError::RoomServiceUnavailable` on lookup or creation failure (other
/// than `already_exists`). Not retried here; retry policy is the caller's
/// concern.
#[instrument(skip(rooms))]
pub async fn ensure_room_exists(rooms: &RoomClient, name: &str) -> Result<(), GwError> {
    let existing = rooms.list_rooms(name).await?;
    if existing.iter().any(|room| room.name == name) {
        return Ok(());
    }

    match rooms.create_room(name).await? {
        CreateRoomOutcome::Created(room) => {
            info!(target: "mg.rooms", room_name = %room.name, sid = %room.sid, "Created room");
        }
        CreateRoomOutcome::AlreadyExists => {
            info!(target: "mg.rooms", room_name = %name, "Room created concurrently");
        }
    }

    Ok(())
}
