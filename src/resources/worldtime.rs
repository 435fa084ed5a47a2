use bevy_ecs::prelude::Resource;

/// The frame clock: current tick timestamp and the time elapsed since the last tick.
///
/// `timestamp_ms` is the key every per-tick cache is stamped with, so it must be
/// monotonic.
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Scaled time since the simulation started, in milliseconds.
    pub timestamp_ms: u64,
    /// Scaled delta of the current tick, in seconds.
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
    /// Scaled fraction of a millisecond not yet added to `timestamp_ms`.
    pub carry_ms: f64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            timestamp_ms: 0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
            carry_ms: 0.0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// A clock frozen at `timestamp_ms` with the given delta, handy for driving
    /// pawn operations outside a schedule.
    pub fn at(timestamp_ms: u64, delta: f32) -> Self {
        WorldTime {
            timestamp_ms,
            delta,
            ..Default::default()
        }
    }
}
