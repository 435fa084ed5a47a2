//! Simulation systems.
//!
//! Submodules overview
//! - [`animation`] – resolve the active sprite and hitbox items of an animation
//! - [`cachesweep`] – periodically clear pawn caches
//! - [`movement`] – collision-constrained movement with sliding
//! - [`pathing`] – advance pawns along their paths
//! - [`time`] – update simulation time and delta

pub mod animation;
pub mod cachesweep;
pub mod movement;
pub mod pathing;
pub mod time;
