//! Periodic cache maintenance bookkeeping.
//!
//! Pawn caches are single-slot and only trusted for the exact tick they were
//! written in, so they never grow. The sweep still clears them on a fixed
//! interval so stale entries do not outlive pawns that stop being queried.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSweep {
    /// Simulated milliseconds between two sweeps.
    pub interval_ms: u64,
    /// Timestamp of the last sweep.
    pub last_sweep_ms: u64,
    pub sweeps: u64,
}

impl CacheSweep {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_sweep_ms: 0,
            sweeps: 0,
        }
    }

    /// Whether a sweep is due at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_sweep_ms) >= self.interval_ms
    }

    pub fn mark(&mut self, now_ms: u64) {
        self.last_sweep_ms = now_ms;
        self.sweeps += 1;
    }
}
