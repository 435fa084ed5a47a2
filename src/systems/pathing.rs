//! Path following system.
//!
//! Moves every pawn with an active path one tick towards its next waypoint, in
//! spawn order. Runs before any user logic so logic observes post-path positions.

use bevy_ecs::error::BevyError;

use crate::resources::pawnregistry::Pawns;

pub fn path_follow_system(mut pawns: Pawns) -> Result<(), BevyError> {
    pawns.follow_paths()?;
    Ok(())
}
