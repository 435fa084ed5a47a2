//! Pawn identity and the bundle every pawn entity is spawned with.
//!
//! A pawn is an entity carrying:
//! - [`Pawn`]: registry-assigned id and name
//! - [`GridPosition`]: anchor position
//! - [`Collider`]: fallback hitbox and anchor offset
//! - [`Animator`]: the playing animation, if any
//! - [`PathFollower`]: the followed path, if any
//! - [`PawnCaches`]: sprite, hitbox and distance caches
//!
//! Pawns are spawned through
//! [`Pawns::spawn`](crate::resources::pawnregistry::Pawns::spawn), which assigns
//! the id and records spawn order.

use bevy_ecs::prelude::{Bundle, Component};

use crate::components::animation::Animator;
use crate::components::cache::PawnCaches;
use crate::components::collider::Collider;
use crate::components::hitbox::HitBox;
use crate::components::mapposition::GridPosition;
use crate::components::path::PathFollower;
use crate::error::SimError;

/// Registry-assigned pawn identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PawnId(pub u32);

#[derive(Component, Debug, Clone)]
pub struct Pawn {
    id: PawnId,
    pub name: String,
}

impl Pawn {
    pub(crate) fn new(id: PawnId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> PawnId {
        self.id
    }
}

#[derive(Bundle, Debug, Clone)]
pub struct PawnBundle {
    pub pawn: Pawn,
    pub position: GridPosition,
    pub collider: Collider,
    pub animator: Animator,
    pub follower: PathFollower,
    pub caches: PawnCaches,
}

impl PawnBundle {
    pub(crate) fn new(id: PawnId, name: impl Into<String>) -> Self {
        Self {
            pawn: Pawn::new(id, name),
            position: GridPosition::default(),
            collider: Collider::default(),
            animator: Animator::default(),
            follower: PathFollower::default(),
            caches: PawnCaches::default(),
        }
    }

    pub fn id(&self) -> PawnId {
        self.pawn.id
    }

    pub fn place_at(&mut self, x: f32, y: f32) {
        self.position = GridPosition::new(x, y);
    }

    pub fn set_hit_box(&mut self, hit_box: HitBox) {
        self.collider.hit_box = Some(hit_box);
    }

    /// Follow `waypoints` from the first tick on. An empty list is rejected.
    pub fn set_path(
        &mut self,
        speed: f32,
        looping: bool,
        waypoints: Vec<GridPosition>,
    ) -> Result<(), SimError> {
        self.follower.set(speed, looping, waypoints, &self.pawn.name)
    }
}
