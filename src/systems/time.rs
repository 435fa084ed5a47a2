//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per tick, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;
use log::trace;

use crate::components::cache::PawnCaches;
use crate::resources::worldtime::WorldTime;

/// Advance the clock by `dt_ms` unscaled milliseconds and return the scaled
/// milliseconds the timestamp moved.
///
/// The scaled delta is split into whole milliseconds, which advance
/// `timestamp_ms` and `delta`, and a fraction carried into the next tick, so
/// slow time scales still add up. A tick that leaves the timestamp unchanged
/// drops every pawn cache: caches are keyed by timestamp and would otherwise
/// serve answers from the previous tick.
pub fn update_world_time(world: &mut World, dt_ms: u64) -> u64 {
    let scaled_ms = {
        let mut wt = world.resource_mut::<WorldTime>();
        let exact = dt_ms as f64 * f64::from(wt.time_scale.max(0.0)) + wt.carry_ms;
        let whole = exact.floor();
        wt.carry_ms = exact - whole;
        let scaled_ms = whole as u64;
        wt.timestamp_ms += scaled_ms;
        wt.delta = scaled_ms as f32 / 1000.0;
        wt.frame_count += 1;
        scaled_ms
    };

    if scaled_ms == 0 {
        let mut query = world.query::<&mut PawnCaches>();
        for mut caches in query.iter_mut(world) {
            caches.clear();
        }
        trace!("Clock did not advance, pawn caches dropped");
    }
    scaled_ms
}
