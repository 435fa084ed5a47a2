//! Pawn registry and the pawn operations.
//!
//! Pawns are entities (see [`components::pawn`](crate::components::pawn)). The
//! [`PawnRegistry`] resource maps ids to entities in spawn order. That order is
//! also the order other pawns are tested in during movement resolution, which
//! keeps collision outcomes deterministic.
//!
//! [`Pawns`] is the system parameter every pawn operation goes through. It bundles
//! the registry, one query per pawn component, the clock and the stage, so
//! operations never reach for global state. Host code outside the schedule gets
//! one through [`Simulation::with_pawns`](crate::simulation::Simulation::with_pawns).
//!
//! Spawns and removals are queued as commands: a pawn spawned inside a system
//! can be addressed by the following systems of the tick, not by the rest of the
//! system that spawned it.
//!
//! # Usage
//!
//! ```ignore
//! fn chase_system(mut pawns: Pawns, targets: Res<Targets>) -> Result<(), BevyError> {
//!     let goal = pawns.position(targets.prey)?;
//!     pawns.move_towards(targets.hunter, goal.x, goal.y, 4.0)?;
//!     Ok(())
//! }
//! ```

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use log::{debug, info, warn};

use crate::components::animation::{Animator, SpriteList};
use crate::components::cache::{DistanceEntry, PawnCaches};
use crate::components::collider::Collider;
use crate::components::hitbox::HitBox;
use crate::components::mapposition::GridPosition;
use crate::components::path::{PathFollower, PathProgress, PathState};
use crate::components::pawn::{Pawn, PawnBundle, PawnId};
use crate::error::SimError;
use crate::geometry::step_towards;
use crate::resources::animationstore::AnimationStore;
use crate::resources::stage::Stage;
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::evaluate_sprites;
use crate::systems::movement::{Mover, Obstacles, resolve_move};

/// Maps a failed component lookup to the pawn it was made for.
fn unknown<E>(id: PawnId) -> impl Fn(E) -> SimError {
    move |_| SimError::UnknownPawn(id)
}

/// Live pawns in spawn order.
#[derive(Resource, Debug, Default)]
pub struct PawnRegistry {
    entries: Vec<(PawnId, Entity)>,
    next_id: u32,
}

impl PawnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> PawnId {
        self.next_id += 1;
        PawnId(self.next_id)
    }

    pub fn entity(&self, id: PawnId) -> Result<Entity, SimError> {
        self.entries
            .iter()
            .find(|(pawn, _)| *pawn == id)
            .map(|(_, entity)| *entity)
            .ok_or(SimError::UnknownPawn(id))
    }

    fn unregister(&mut self, id: PawnId) -> Result<Entity, SimError> {
        let index = self
            .entries
            .iter()
            .position(|(pawn, _)| *pawn == id)
            .ok_or(SimError::UnknownPawn(id))?;
        Ok(self.entries.remove(index).1)
    }

    pub fn ids(&self) -> Vec<PawnId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn entities(&self) -> impl Iterator<Item = (PawnId, Entity)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Access to every pawn, with the clock and stage of the current tick.
#[derive(SystemParam)]
pub struct Pawns<'w, 's> {
    commands: Commands<'w, 's>,
    registry: ResMut<'w, PawnRegistry>,
    pawns: Query<'w, 's, &'static Pawn>,
    positions: Query<'w, 's, &'static mut GridPosition>,
    colliders: Query<'w, 's, &'static Collider>,
    animators: Query<'w, 's, &'static mut Animator>,
    followers: Query<'w, 's, &'static mut PathFollower>,
    caches: Query<'w, 's, &'static mut PawnCaches>,
    animations: Res<'w, AnimationStore>,
    stage: Res<'w, Stage>,
    world_time: Res<'w, WorldTime>,
}

impl Pawns<'_, '_> {
    pub fn now_ms(&self) -> u64 {
        self.world_time.timestamp_ms
    }

    pub fn registry(&self) -> &PawnRegistry {
        &self.registry
    }

    fn entity(&self, id: PawnId) -> Result<Entity, SimError> {
        self.registry.entity(id)
    }

    // Lifecycle

    /// Create a pawn named `name` and let `setup` configure it before it is spawned.
    pub fn spawn(&mut self, name: impl Into<String>, setup: impl FnOnce(&mut PawnBundle)) -> PawnId {
        let id = self.registry.allocate_id();
        let mut bundle = PawnBundle::new(id, name);
        setup(&mut bundle);
        self.spawn_bundle(bundle)
    }

    fn spawn_bundle(&mut self, bundle: PawnBundle) -> PawnId {
        let id = bundle.id();
        info!(
            "Spawned pawn \"{}\" ({:?}) at ({}, {})",
            bundle.pawn.name, id, bundle.position.x, bundle.position.y
        );
        let entity = self.commands.spawn(bundle).id();
        self.registry.entries.push((id, entity));
        id
    }

    /// Spawn a copy of `id` named `"{name}-{new id}"`. Position, collider,
    /// animation and path come along; caches start empty.
    pub fn clone_pawn(&mut self, id: PawnId) -> Result<PawnId, SimError> {
        let entity = self.entity(id)?;
        let source = self.pawns.get(entity).map_err(unknown(id))?;
        let copy = self.registry.allocate_id();
        let mut bundle = PawnBundle::new(copy, format!("{}-{}", source.name, copy.0));
        bundle.position = *self.positions.get(entity).map_err(unknown(id))?;
        bundle.collider = *self.colliders.get(entity).map_err(unknown(id))?;
        bundle.animator = self.animators.get(entity).map_err(unknown(id))?.clone();
        bundle.follower = self.followers.get(entity).map_err(unknown(id))?.clone();
        debug!("Cloning pawn {:?} as \"{}\" ({:?})", id, bundle.pawn.name, copy);
        Ok(self.spawn_bundle(bundle))
    }

    /// Despawn a pawn and forget every distance other pawns cached against it.
    pub fn remove(&mut self, id: PawnId) -> Result<(), SimError> {
        let entity = self.registry.unregister(id)?;
        self.commands.entity(entity).despawn();
        for mut caches in self.caches.iter_mut() {
            caches.forget_distance(id);
        }
        debug!("Removed pawn {:?}", id);
        Ok(())
    }

    pub fn pawn(&self, id: PawnId) -> Result<&Pawn, SimError> {
        self.pawns
            .get(self.entity(id)?)
            .map_err(unknown(id))
    }

    /// First pawn called `name`, in spawn order.
    pub fn find(&self, name: &str) -> Result<PawnId, SimError> {
        self.registry
            .entities()
            .find(|(_, entity)| self.pawns.get(*entity).is_ok_and(|pawn| pawn.name == name))
            .map(|(id, _)| id)
            .ok_or_else(|| SimError::UnknownPawnName(name.to_string()))
    }

    pub fn ids(&self) -> Vec<PawnId> {
        self.registry.ids()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // Position

    pub fn position(&self, id: PawnId) -> Result<GridPosition, SimError> {
        self.positions
            .get(self.entity(id)?)
            .copied()
            .map_err(unknown(id))
    }

    /// Teleport without any collision check. Meant for spawning and scripted
    /// repositioning; regular movement goes through [`move_to`](Self::move_to).
    pub fn place_at(&mut self, id: PawnId, x: f32, y: f32) -> Result<(), SimError> {
        self.commit_position(id, GridPosition::new(x, y))
    }

    fn commit_position(&mut self, id: PawnId, position: GridPosition) -> Result<(), SimError> {
        let entity = self.entity(id)?;
        let mut current = self
            .positions
            .get_mut(entity)
            .map_err(unknown(id))?;
        *current = position;
        if let Ok(mut caches) = self.caches.get_mut(entity) {
            caches.clear_hit_box();
        }
        Ok(())
    }

    // Animation

    /// Start playing the stored animation `name` at the current timestamp.
    /// Already playing it is a no-op.
    pub fn set_animation(&mut self, id: PawnId, name: &str) -> Result<(), SimError> {
        let entity = self.entity(id)?;
        let now_ms = self.now_ms();
        let pawn = self.pawns.get(entity).map_err(unknown(id))?;
        let mut animator = self
            .animators
            .get_mut(entity)
            .map_err(unknown(id))?;
        animator.play(&self.animations, name, now_ms, &pawn.name)
    }

    pub fn stop_animation(&mut self, id: PawnId) -> Result<(), SimError> {
        let entity = self.entity(id)?;
        self.animators
            .get_mut(entity)
            .map_err(unknown(id))?
            .stop();
        Ok(())
    }

    pub fn is_animating(&self, id: PawnId) -> Result<bool, SimError> {
        self.animators
            .get(self.entity(id)?)
            .map(Animator::is_animating)
            .map_err(unknown(id))
    }

    /// Draw descriptors of the playing animation, one per layer, memoized for
    /// the current tick.
    pub fn sprite(&mut self, id: PawnId) -> Result<SpriteList, SimError> {
        let entity = self.entity(id)?;
        let now_ms = self.now_ms();
        let mut caches = self.caches.get_mut(entity).map_err(unknown(id))?;
        if let Some(sprites) = caches.sprite.get(now_ms) {
            return Ok(sprites.clone());
        }
        let animator = self.animators.get(entity).map_err(unknown(id))?;
        let Some(playing) = animator.playing() else {
            let pawn = self.pawns.get(entity).map_err(unknown(id))?;
            return Err(SimError::NothingPlaying(pawn.name.clone()));
        };
        let sprites = evaluate_sprites(&playing.animation, playing.started_ms, now_ms)?;
        Ok(caches.sprite.get_or_insert(now_ms, sprites).clone())
    }

    // Hitboxes

    /// Current hitbox without touching the cache.
    fn current_hit_box(&self, entity: Entity, now_ms: u64) -> Result<Option<HitBox>, SimError> {
        if let Ok(caches) = self.caches.get(entity)
            && let Some(cached) = caches.hit_box.get(now_ms)
        {
            return Ok(*cached);
        }
        match (
            self.colliders.get(entity),
            self.animators.get(entity),
            self.positions.get(entity),
        ) {
            (Ok(collider), Ok(animator), Ok(position)) => {
                collider.hit_box_at(animator, *position, now_ms)
            }
            _ => Ok(None),
        }
    }

    /// Current hitbox in world space, memoized for the current tick.
    pub fn hit_box(&mut self, id: PawnId) -> Result<Option<HitBox>, SimError> {
        let entity = self.entity(id)?;
        let now_ms = self.now_ms();
        let hit_box = self.current_hit_box(entity, now_ms)?;
        let mut caches = self.caches.get_mut(entity).map_err(unknown(id))?;
        Ok(*caches.hit_box.get_or_insert(now_ms, hit_box))
    }

    // Movement

    fn obstacles(&self, mover: PawnId, now_ms: u64) -> Result<Obstacles<'_>, SimError> {
        let mut pawns = Vec::with_capacity(self.registry.len());
        for (id, entity) in self.registry.entities().filter(|(id, _)| *id != mover) {
            if let Some(hit_box) = self.current_hit_box(entity, now_ms)? {
                pawns.push((id, hit_box));
            }
        }
        Ok(Obstacles {
            level: &self.stage.hit_boxes,
            pawns,
        })
    }

    /// Move a pawn to `(x, y)`, sliding along obstacles when `allow_partial`.
    ///
    /// Returns `Ok(false)` when the move was denied; the pawn then stays put.
    pub fn move_to(&mut self, id: PawnId, x: f32, y: f32, allow_partial: bool) -> Result<bool, SimError> {
        let entity = self.entity(id)?;
        let now_ms = self.now_ms();
        let resolved = {
            let mover = Mover {
                id,
                name: &self.pawns.get(entity).map_err(unknown(id))?.name,
                position: *self.positions.get(entity).map_err(unknown(id))?,
                collider: self.colliders.get(entity).map_err(unknown(id))?,
                animator: self.animators.get(entity).map_err(unknown(id))?,
            };
            let obstacles = self.obstacles(id, now_ms)?;
            resolve_move(&mover, GridPosition::new(x, y), allow_partial, now_ms, &obstacles)?
        };
        match resolved {
            Some(position) => {
                self.commit_position(id, position)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move by `(dx, dy)` with sliding.
    pub fn move_relative(&mut self, id: PawnId, dx: f32, dy: f32) -> Result<bool, SimError> {
        let position = self.position(id)?;
        self.move_to(id, position.x + dx, position.y + dy, true)
    }

    /// Head for `(x, y)` at `speed` grid units per second for one tick.
    ///
    /// The step is bounded by `speed * delta` overall (diagonals are not faster)
    /// and never overshoots the destination.
    pub fn move_towards(&mut self, id: PawnId, x: f32, y: f32, speed: f32) -> Result<bool, SimError> {
        let position = self.position(id)?;
        let step = step_towards(position, GridPosition::new(x, y), speed * self.world_time.delta);
        self.move_to(id, step.x, step.y, true)
    }

    // Pathing

    /// Follow `waypoints` at `speed` grid units per second, bouncing back and forth
    /// forever when `looping`.
    pub fn set_path(
        &mut self,
        id: PawnId,
        speed: f32,
        looping: bool,
        waypoints: Vec<GridPosition>,
    ) -> Result<(), SimError> {
        let entity = self.entity(id)?;
        let pawn = self.pawns.get(entity).map_err(unknown(id))?;
        self.followers
            .get_mut(entity)
            .map_err(unknown(id))?
            .set(speed, looping, waypoints, &pawn.name)
    }

    pub fn remove_path(&mut self, id: PawnId) -> Result<(), SimError> {
        let entity = self.entity(id)?;
        let pawn = self.pawns.get(entity).map_err(unknown(id))?;
        self.followers
            .get_mut(entity)
            .map_err(unknown(id))?
            .remove(&pawn.name)
    }

    pub fn path(&self, id: PawnId) -> Result<Option<&PathState>, SimError> {
        self.followers
            .get(self.entity(id)?)
            .map(PathFollower::path)
            .map_err(unknown(id))
    }

    /// Advance a pawn along its path by one tick. Idle pawns are left alone.
    ///
    /// A blocked waypoint is retried every tick; nothing reroutes around it.
    pub fn follow_path(&mut self, id: PawnId) -> Result<(), SimError> {
        let Some((target, speed)) = self
            .path(id)?
            .and_then(|path| Some((path.next_waypoint()?, path.speed())))
        else {
            return Ok(());
        };

        self.move_towards(id, target.x, target.y, speed)?;
        if self.position(id)? != target {
            return Ok(());
        }

        let entity = self.entity(id)?;
        let pawn = self.pawns.get(entity).map_err(unknown(id))?;
        let mut follower = self
            .followers
            .get_mut(entity)
            .map_err(unknown(id))?;
        let Some(path) = follower.path_mut() else {
            return Ok(());
        };
        match path.advance() {
            PathProgress::Next(index) => {
                debug!("pawn \"{}\" reached waypoint, next is {}", pawn.name, index);
            }
            PathProgress::Finished => {
                debug!("pawn \"{}\" finished its path", pawn.name);
                follower.finish();
            }
        }
        Ok(())
    }

    /// Run [`follow_path`](Self::follow_path) for every pawn, in spawn order.
    pub fn follow_paths(&mut self) -> Result<(), SimError> {
        for id in self.ids() {
            self.follow_path(id)?;
        }
        Ok(())
    }

    // Distances

    /// Distance between two pawns, cached on both for the current tick.
    pub fn distance_between(&mut self, a: PawnId, b: PawnId) -> Result<f32, SimError> {
        let first = self.entity(a)?;
        let second = self.entity(b)?;
        if first == second {
            warn!("distance requested between pawn {:?} and itself", a);
            return Ok(0.0);
        }
        let now_ms = self.now_ms();
        if let Some(distance) = self
            .caches
            .get(first)
            .ok()
            .and_then(|caches| caches.cached_distance(b, now_ms))
        {
            return Ok(distance);
        }

        let entry = DistanceEntry {
            timestamp_ms: now_ms,
            distance: self.position(a)?.distance_to(self.position(b)?),
        };
        for (entity, other) in [(first, b), (second, a)] {
            if let Ok(mut caches) = self.caches.get_mut(entity) {
                caches.record_distance(other, entry);
            }
        }
        Ok(entry.distance)
    }

    pub fn cached_distance(&self, id: PawnId, other: PawnId) -> Result<Option<f32>, SimError> {
        let now_ms = self.now_ms();
        self.caches
            .get(self.entity(id)?)
            .map(|caches| caches.cached_distance(other, now_ms))
            .map_err(unknown(id))
    }

    // Cache maintenance

    /// Drop every cached sprite, hitbox and distance of one pawn.
    pub fn clear_caches_of(&mut self, id: PawnId) -> Result<(), SimError> {
        let entity = self.entity(id)?;
        self.caches
            .get_mut(entity)
            .map_err(unknown(id))?
            .clear();
        Ok(())
    }

    /// Drop every cached sprite, hitbox and distance of every pawn.
    pub fn clear_caches(&mut self) {
        for mut caches in self.caches.iter_mut() {
            caches.clear();
        }
    }
}
