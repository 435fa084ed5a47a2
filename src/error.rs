//! Error type shared by the whole simulation core.
//!
//! Movement being blocked is not an error: [`move_to`](crate::resources::pawnregistry::PawnRegistry::move_to)
//! reports it as `Ok(false)`. Everything here is either a load-time rejection or
//! caller misuse, and is meant to stop the caller rather than be retried.

use thiserror::Error;

use crate::components::pawn::PawnId;

#[derive(Debug, Error)]
pub enum SimError {
    /// An animation definition broke a load-time invariant (duration sums, sheet indices...).
    #[error("invalid animation \"{name}\": {reason}")]
    InvalidAnimation { name: String, reason: String },

    /// No timeline item covers the computed spot. Unreachable for validated animations.
    #[error("did not find timeline item for animation \"{animation}\", {timeline} at spot {spot}ms")]
    TimelineLookup {
        animation: String,
        timeline: String,
        spot: u64,
    },

    #[error("invalid animation name \"{name}\" for pawn \"{pawn}\"")]
    UnknownAnimation { name: String, pawn: String },

    #[error("no pawn registered with id {0:?}")]
    UnknownPawn(PawnId),

    #[error("no pawn registered with name \"{0}\"")]
    UnknownPawnName(String),

    #[error("tried to remove path from pawn \"{0}\" but there was no active path")]
    NoActivePath(String),

    #[error("requested sprite when no animation playing on pawn \"{0}\"")]
    NothingPlaying(String),

    #[error("tried to set an empty path on pawn \"{0}\"")]
    EmptyPath(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
