//! Pawngrid simulation core.
//!
//! A deterministic, tick-driven 2D pawn simulation: timeline-driven animation
//! evaluation, axis-aligned collision movement with sliding, waypoint path
//! following, and per-tick pawn caches. Rendering, input and asset I/O belong to
//! the host.
//!
//! - [`components`] – per-pawn components (identity, position, collider, animator, path follower, caches) and animation data
//! - [`resources`] – long-lived ECS resources (registries, stage, clock, config)
//! - [`systems`] – schedule systems and the algorithms they drive
//! - [`simulation`] – the world, schedule and tick phases
//! - [`geometry`] – small numeric helpers
//! - [`error`] – the shared [`SimError`](error::SimError)

pub mod components;
pub mod error;
pub mod geometry;
pub mod resources;
pub mod simulation;
pub mod systems;
