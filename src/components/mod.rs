//! Per-pawn components.
//!
//! A pawn is an entity carrying the [`PawnBundle`](pawn::PawnBundle): identity,
//! position, collider, animator, path follower and caches.
//!
//! Submodules overview:
//! - [`animation`] – validated animations, their JSON definitions, sprite descriptors and the `Animator`
//! - [`cache`] – single-slot per-timestamp cache and the per-pawn `PawnCaches`
//! - [`collider`] – fallback hitbox and anchor, and the hitbox resolution chain
//! - [`hitbox`] – axis-aligned rectangle in grid units and the overlap test
//! - [`mapposition`] – grid-space position of a pawn's anchor
//! - [`path`] – waypoint path state with bounce looping and the `PathFollower`
//! - [`pawn`] – pawn identity and the bundle every pawn is spawned with

pub mod animation;
pub mod cache;
pub mod collider;
pub mod hitbox;
pub mod mapposition;
pub mod path;
pub mod pawn;
