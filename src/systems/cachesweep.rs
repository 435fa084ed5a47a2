//! Cache sweep system.
//!
//! Runs last in the tick. Clears every pawn cache once
//! [`CacheSweep::interval_ms`](crate::resources::cachesweep::CacheSweep) of
//! simulated time has passed since the previous sweep.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::cache::PawnCaches;
use crate::resources::cachesweep::CacheSweep;
use crate::resources::worldtime::WorldTime;

pub fn cache_sweep_system(
    mut sweep: ResMut<CacheSweep>,
    mut query: Query<&mut PawnCaches>,
    time: Res<WorldTime>,
) {
    let now_ms = time.timestamp_ms;
    if !sweep.is_due(now_ms) {
        return;
    }
    let mut swept = 0;
    for mut caches in query.iter_mut() {
        caches.clear();
        swept += 1;
    }
    sweep.mark(now_ms);
    debug!(
        "Swept caches of {} pawns at {}ms (sweep #{})",
        swept, now_ms, sweep.sweeps
    );
}
