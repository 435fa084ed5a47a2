//! Tick-driven simulation host.
//!
//! [`Simulation`] owns the ECS [`World`] holding every simulation resource and the
//! [`Schedule`] run once per tick. Systems are grouped in [`TickSet`]s that always
//! run in this order:
//!
//! 1. [`TickSet::Pathing`] – pawns with a path take one step
//! 2. [`TickSet::Logic`] – user systems added with [`Simulation::add_logic_system`]
//! 3. [`TickSet::Maintenance`] – periodic cache sweep
//!
//! Pawns only move while the schedule runs, so anything reading the world
//! between two ticks observes one consistent position per pawn.
//!
//! # Usage
//!
//! ```ignore
//! let mut sim = Simulation::new(SimConfig::new());
//! sim.set_stage(Stage::new("room").with_hit_box(HitBox::new(0.0, 5.0, 10.0, 1.0)));
//! let hero = sim.spawn_pawn("hero", |pawn| pawn.place_at(1.0, 1.0));
//! sim.add_logic_system(my_ai_system);
//! for _ in 0..60 {
//!     sim.tick(16);
//! }
//! ```

use std::sync::Arc;

use bevy_ecs::prelude::*;
use bevy_ecs::system::{ScheduleSystem, SystemState};
use log::info;

use crate::components::animation::Animation;
use crate::components::mapposition::GridPosition;
use crate::components::path::{PathFollower, PathState};
use crate::components::pawn::{PawnBundle, PawnId};
use crate::error::SimError;
use crate::resources::animationstore::AnimationStore;
use crate::resources::cachesweep::CacheSweep;
use crate::resources::pawnregistry::{PawnRegistry, Pawns};
use crate::resources::simconfig::SimConfig;
use crate::resources::stage::Stage;
use crate::resources::worldtime::WorldTime;
use crate::systems::cachesweep::cache_sweep_system;
use crate::systems::pathing::path_follow_system;
use crate::systems::time::update_world_time;

/// Ordered phases of one tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Pathing,
    Logic,
    Maintenance,
}

pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
        world.insert_resource(Stage::default());
        world.insert_resource(PawnRegistry::new());
        world.insert_resource(AnimationStore::new());
        world.insert_resource(CacheSweep::new(config.cache_sweep_interval_ms));
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.configure_sets((TickSet::Pathing, TickSet::Logic, TickSet::Maintenance).chain());
        schedule.add_systems(path_follow_system.in_set(TickSet::Pathing));
        schedule.add_systems(cache_sweep_system.in_set(TickSet::Maintenance));

        Self { world, schedule }
    }

    /// Add systems to the logic phase. They run after path following and before
    /// the cache sweep, in registration order relative to each other only if
    /// chained.
    pub fn add_logic_system<M>(
        &mut self,
        systems: impl IntoScheduleConfigs<ScheduleSystem, M>,
    ) -> &mut Self {
        self.schedule.add_systems(systems.in_set(TickSet::Logic));
        self
    }

    /// Advance the clock by `delta_ms` unscaled milliseconds and run one tick.
    pub fn tick(&mut self, delta_ms: u64) {
        update_world_time(&mut self.world, delta_ms);
        self.schedule.run(&mut self.world);
        self.world.clear_trackers();
    }

    /// Run `ticks` ticks of `delta_ms` each.
    pub fn run_for(&mut self, ticks: u64, delta_ms: u64) {
        for _ in 0..ticks {
            self.tick(delta_ms);
        }
    }

    /// Run `f` against the pawns outside the schedule, with the clock and stage
    /// of the last tick. Spawns and removals are applied before returning.
    pub fn with_pawns<R>(&mut self, f: impl FnOnce(&mut Pawns<'_, '_>) -> R) -> R {
        let mut state: SystemState<Pawns<'static, 'static>> = SystemState::new(&mut self.world);
        let result = {
            let mut pawns = state.get_mut(&mut self.world);
            f(&mut pawns)
        };
        state.apply(&mut self.world);
        result
    }

    /// Spawn a pawn right away; see [`Pawns::spawn`].
    pub fn spawn_pawn(
        &mut self,
        name: impl Into<String>,
        setup: impl FnOnce(&mut PawnBundle),
    ) -> PawnId {
        self.with_pawns(|pawns| pawns.spawn(name, setup))
    }

    /// Parse, validate and register an animation using the configured grid size.
    pub fn load_animation(&mut self, text: &str) -> Result<Arc<Animation>, SimError> {
        let grid_size = self.config().grid_size;
        self.animations_mut().load_json(text, grid_size)
    }

    /// Start playing a stored animation on a pawn at the current timestamp.
    pub fn set_animation(&mut self, id: PawnId, name: &str) -> Result<(), SimError> {
        self.with_pawns(|pawns| pawns.set_animation(id, name))
    }

    /// Position of a pawn as of the last tick.
    pub fn position(&self, id: PawnId) -> Result<GridPosition, SimError> {
        let entity = self.pawn_registry().entity(id)?;
        self.world
            .get::<GridPosition>(entity)
            .copied()
            .ok_or(SimError::UnknownPawn(id))
    }

    /// Path a pawn is following, if any.
    pub fn path(&self, id: PawnId) -> Result<Option<&PathState>, SimError> {
        let entity = self.pawn_registry().entity(id)?;
        self.world
            .get::<PathFollower>(entity)
            .map(PathFollower::path)
            .ok_or(SimError::UnknownPawn(id))
    }

    pub fn set_stage(&mut self, stage: Stage) {
        info!(
            "Stage \"{}\" set with {} hitboxes",
            stage.location,
            stage.hit_boxes.len()
        );
        self.world.insert_resource(stage);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    pub fn time(&self) -> &WorldTime {
        self.world.resource::<WorldTime>()
    }

    pub fn stage(&self) -> &Stage {
        self.world.resource::<Stage>()
    }

    pub fn pawn_registry(&self) -> &PawnRegistry {
        self.world.resource::<PawnRegistry>()
    }

    pub fn animations(&self) -> &AnimationStore {
        self.world.resource::<AnimationStore>()
    }

    pub fn animations_mut(&mut self) -> Mut<'_, AnimationStore> {
        self.world.resource_mut::<AnimationStore>()
    }
}
