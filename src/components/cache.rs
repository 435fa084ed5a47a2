//! Per-tick memoization.
//!
//! [`TimestampSlot`] holds one value together with the timestamp it was computed
//! at. [`PawnCaches`] is the component grouping a pawn's sprite, hitbox and
//! distance caches.

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;

use crate::components::animation::SpriteList;
use crate::components::hitbox::HitBox;
use crate::components::pawn::PawnId;

/// Single-slot memo: a value together with the tick timestamp it was computed at.
///
/// Only the current tick is ever queried, so one slot per pawn is enough. A slot is
/// trusted only when the stored timestamp matches exactly; stale slots are simply
/// overwritten on the next computation.
#[derive(Debug, Clone)]
pub struct TimestampSlot<T> {
    slot: Option<(u64, T)>,
}

impl<T> Default for TimestampSlot<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> TimestampSlot<T> {
    pub fn get(&self, timestamp_ms: u64) -> Option<&T> {
        match &self.slot {
            Some((stamp, value)) if *stamp == timestamp_ms => Some(value),
            _ => None,
        }
    }

    /// Store `value` for `timestamp_ms` unless this timestamp already holds a value.
    /// Returns the value held for that timestamp.
    pub fn get_or_insert(&mut self, timestamp_ms: u64, value: T) -> &T {
        let entry = match self.slot.take() {
            Some((stamp, existing)) if stamp == timestamp_ms => self.slot.insert((stamp, existing)),
            _ => self.slot.insert((timestamp_ms, value)),
        };
        &entry.1
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEntry {
    pub timestamp_ms: u64,
    pub distance: f32,
}

/// Memoized per-tick answers of one pawn.
#[derive(Component, Debug, Clone, Default)]
pub struct PawnCaches {
    pub(crate) sprite: TimestampSlot<SpriteList>,
    pub(crate) hit_box: TimestampSlot<Option<HitBox>>,
    pub(crate) distances: FxHashMap<PawnId, DistanceEntry>,
}

impl PawnCaches {
    /// Distance computed against `other` during tick `now_ms`, if any.
    pub fn cached_distance(&self, other: PawnId, now_ms: u64) -> Option<f32> {
        self.distances
            .get(&other)
            .filter(|entry| entry.timestamp_ms == now_ms)
            .map(|entry| entry.distance)
    }

    pub(crate) fn record_distance(&mut self, other: PawnId, entry: DistanceEntry) {
        self.distances.insert(other, entry);
    }

    pub(crate) fn forget_distance(&mut self, other: PawnId) {
        self.distances.remove(&other);
    }

    pub fn clear_sprite(&mut self) {
        self.sprite.clear();
    }

    pub fn clear_hit_box(&mut self) {
        self.hit_box.clear();
    }

    pub fn clear_distances(&mut self) {
        self.distances.clear();
    }

    pub fn clear(&mut self) {
        self.clear_sprite();
        self.clear_hit_box();
        self.clear_distances();
    }

    pub fn is_empty(&self) -> bool {
        self.sprite.is_empty() && self.hit_box.is_empty() && self.distances.is_empty()
    }
}
