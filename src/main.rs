//! Pawngrid headless demo.
//!
//! Builds a walled room with three pawns and runs the simulation for a fixed
//! number of ticks without any renderer:
//!
//! - `patrol` bounces along a looping path and plays an animation
//! - `blocker` stands in the middle of the room
//! - `wanderer` walks to seeded random spots, giving up on spots it cannot reach
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --ticks 300 --seed 7
//! ```

use std::path::PathBuf;

use bevy_ecs::error::BevyError;
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{debug, error, info, warn};

use pawngrid::components::animation::{AnimationDef, PixelPoint, PixelRect, TimelineItemDef};
use pawngrid::components::collider::Collider;
use pawngrid::components::hitbox::HitBox;
use pawngrid::components::mapposition::GridPosition;
use pawngrid::components::pawn::PawnId;
use pawngrid::error::SimError;
use pawngrid::resources::pawnregistry::Pawns;
use pawngrid::resources::simconfig::SimConfig;
use pawngrid::resources::stage::Stage;
use pawngrid::simulation::Simulation;

const ROOM_WIDTH: f32 = 20.0;
const ROOM_HEIGHT: f32 = 12.0;
const PATROL_SPEED: f32 = 3.0;
const WANDER_SPEED: f32 = 2.0;
const STALL_LIMIT_TICKS: u32 = 30;
const DEFAULT_ANIMATION: &str = "walk";

/// Pawngrid headless simulation demo
#[derive(Parser)]
#[command(version, about = "Runs the pawngrid simulation core headless and logs what the pawns do.")]
struct Cli {
    /// INI configuration file. Defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Fixed tick length in milliseconds, overriding the configuration.
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Seed for the wanderer's destinations.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Animation JSON to validate and play on the patrol pawn.
    #[arg(long, value_name = "PATH")]
    animation: Option<PathBuf>,
}

#[derive(Resource, Debug, Clone, Copy)]
struct DemoPawns {
    patrol: PawnId,
    wanderer: PawnId,
}

#[derive(Resource)]
struct Wanderer {
    rng: fastrand::Rng,
    last_position: GridPosition,
    stalled_ticks: u32,
}

fn walled_room() -> Stage {
    Stage::new("demo-room")
        .with_hit_box(HitBox::new(0.0, 0.0, ROOM_WIDTH, 1.0))
        .with_hit_box(HitBox::new(0.0, ROOM_HEIGHT - 1.0, ROOM_WIDTH, 1.0))
        .with_hit_box(HitBox::new(0.0, 1.0, 1.0, ROOM_HEIGHT - 2.0))
        .with_hit_box(HitBox::new(ROOM_WIDTH - 1.0, 1.0, 1.0, ROOM_HEIGHT - 2.0))
        .with_hit_box(HitBox::new(12.0, 4.0, 1.0, 4.0))
}

fn walk_animation() -> AnimationDef {
    AnimationDef {
        name: DEFAULT_ANIMATION.to_string(),
        sheets: vec!["walker.png".to_string()],
        width: 16.0,
        height: 16.0,
        origin: PixelPoint { x: 0.0, y: 0.0 },
        hit_box: Some(PixelRect {
            x: 0.0,
            y: 0.0,
            width: 16.0,
            height: 16.0,
        }),
        hit_box_timeline: None,
        timelines: vec![
            vec![
                TimelineItemDef::frame(0.0, 0.0, 16.0, 16.0, 150),
                TimelineItemDef::frame(16.0, 0.0, 16.0, 16.0, 150),
            ],
            vec![
                TimelineItemDef::frame(0.0, 16.0, 16.0, 4.0, 200).with_offset(0.0, 12.0),
                TimelineItemDef::blank(100),
            ],
        ],
    }
}

fn wander_system(
    mut pawns: Pawns,
    demo: Res<DemoPawns>,
    mut wanderer: ResMut<Wanderer>,
) -> Result<(), BevyError> {
    let position = pawns.position(demo.wanderer)?;
    if pawns.path(demo.wanderer)?.is_some() {
        if position == wanderer.last_position {
            wanderer.stalled_ticks += 1;
        } else {
            wanderer.stalled_ticks = 0;
        }
        wanderer.last_position = position;
        if wanderer.stalled_ticks < STALL_LIMIT_TICKS {
            return Ok(());
        }
        warn!(
            "wanderer stuck at ({}, {}), picking another destination",
            position.x, position.y
        );
        pawns.remove_path(demo.wanderer)?;
    }

    let target = GridPosition::new(
        1.0 + wanderer.rng.f32() * (ROOM_WIDTH - 3.0),
        1.0 + wanderer.rng.f32() * (ROOM_HEIGHT - 3.0),
    );
    debug!("wanderer heading to ({}, {})", target.x, target.y);
    pawns.set_path(demo.wanderer, WANDER_SPEED, false, vec![target])?;
    wanderer.stalled_ticks = 0;
    Ok(())
}

fn proximity_system(mut pawns: Pawns, demo: Res<DemoPawns>) -> Result<(), BevyError> {
    let distance = pawns.distance_between(demo.patrol, demo.wanderer)?;
    if distance < 1.5 {
        debug!(
            "patrol and wanderer are {:.2} apart at {}ms",
            distance,
            pawns.now_ms()
        );
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<SimConfig, SimError> {
    match path {
        Some(path) => {
            let mut config = SimConfig::with_path(path);
            config.load_from_file()?;
            Ok(config)
        }
        None => {
            let mut config = SimConfig::new();
            config.load_from_file().ok(); // ignore errors, use defaults
            Ok(config)
        }
    }
}

fn setup(sim: &mut Simulation, cli: &Cli) -> Result<DemoPawns, SimError> {
    sim.set_stage(walled_room());

    let animation_name = match &cli.animation {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                SimError::Config(format!("Failed to read animation {}: {}", path.display(), e))
            })?;
            sim.load_animation(&text)?.name().to_string()
        }
        None => {
            let grid_size = sim.config().grid_size;
            sim.animations_mut()
                .insert_def(walk_animation(), grid_size)?
                .name()
                .to_string()
        }
    };

    let patrol = sim.spawn_pawn("patrol", |pawn| pawn.place_at(2.0, 2.0));
    let blocker = sim.spawn_pawn("blocker", |pawn| {
        // Anchored at its centre.
        pawn.collider = Collider::new()
            .with_hit_box(HitBox::new(0.0, 0.0, 1.0, 1.0))
            .with_origin(0.5, 0.5);
        pawn.place_at(6.5, 6.5);
    });
    let wanderer = sim.spawn_pawn("wanderer", |pawn| {
        pawn.set_hit_box(HitBox::new(0.0, 0.0, 1.0, 1.0));
        pawn.place_at(15.0, 5.0);
    });
    debug!("blocker spawned as {:?}", blocker);

    sim.with_pawns(|pawns| {
        pawns.set_path(
            patrol,
            PATROL_SPEED,
            true,
            vec![
                GridPosition::new(2.0, 2.0),
                GridPosition::new(10.0, 2.0),
                GridPosition::new(10.0, 9.0),
                GridPosition::new(16.0, 9.0),
            ],
        )?;
        pawns.set_animation(patrol, &animation_name)
    })?;

    Ok(DemoPawns { patrol, wanderer })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let tick_ms = cli.tick_ms.unwrap_or(config.tick_ms);

    let mut sim = Simulation::new(config);
    let pawns = match setup(&mut sim, &cli) {
        Ok(pawns) => pawns,
        Err(e) => {
            error!("Demo setup failed: {}", e);
            std::process::exit(1);
        }
    };
    let start = sim.position(pawns.wanderer).unwrap_or_default();
    sim.world_mut().insert_resource(pawns);
    sim.world_mut().insert_resource(Wanderer {
        rng: fastrand::Rng::with_seed(cli.seed),
        last_position: start,
        stalled_ticks: 0,
    });
    sim.add_logic_system((wander_system, proximity_system).chain());

    info!(
        "Running {} ticks of {}ms (seed {})",
        cli.ticks, tick_ms, cli.seed
    );
    sim.run_for(cli.ticks, tick_ms);

    let now_ms = sim.time().timestamp_ms;
    info!("Finished at {}ms after {} frames", now_ms, sim.time().frame_count);
    sim.with_pawns(|pawns| {
        for id in pawns.ids() {
            let (Ok(pawn), Ok(position)) = (pawns.pawn(id), pawns.position(id)) else {
                continue;
            };
            let name = pawn.name.clone();
            let following = pawns.path(id).is_ok_and(|path| path.is_some());
            let layers = match pawns.is_animating(id) {
                Ok(true) => pawns.sprite(id).map(|s| s.iter().flatten().count()).unwrap_or(0),
                _ => 0,
            };
            info!(
                "{} at ({:.2}, {:.2}), following path: {}, visible layers: {}",
                name, position.x, position.y, following, layers
            );
        }
    });
}
