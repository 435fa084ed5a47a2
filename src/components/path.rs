//! Waypoint path state.
//!
//! A pawn's [`PathFollower`] is either idle or following a [`PathState`]. The state
//! only tracks which waypoint comes next; moving towards it is done by
//! [`Pawns::follow_path`](crate::resources::pawnregistry::Pawns::follow_path).
//!
//! Looping paths bounce: `A→B→C→B→A→B→…`.

use bevy_ecs::prelude::Component;

use crate::components::mapposition::GridPosition;
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDirection {
    Forward,
    Backward,
}

impl PathDirection {
    fn step(self) -> isize {
        match self {
            PathDirection::Forward => 1,
            PathDirection::Backward => -1,
        }
    }

    fn reversed(self) -> Self {
        match self {
            PathDirection::Forward => PathDirection::Backward,
            PathDirection::Backward => PathDirection::Forward,
        }
    }
}

/// What happened after arriving at a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathProgress {
    /// Keep going towards the waypoint at this index.
    Next(usize),
    /// The last waypoint of a non-looping path was reached.
    Finished,
}

/// Only built through [`PathFollower::set`], which rejects empty waypoint lists.
#[derive(Debug, Clone, PartialEq)]
pub struct PathState {
    waypoints: Vec<GridPosition>,
    speed: f32,
    looping: bool,
    direction: PathDirection,
    next_index: usize,
}

impl PathState {
    /// Start at the first waypoint, heading forward. `waypoints` must not be empty.
    pub(crate) fn new(speed: f32, looping: bool, waypoints: Vec<GridPosition>) -> Self {
        Self {
            waypoints,
            speed,
            looping,
            direction: PathDirection::Forward,
            next_index: 0,
        }
    }

    pub fn waypoints(&self) -> &[GridPosition] {
        &self.waypoints
    }

    /// Grid units per second.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn direction(&self) -> PathDirection {
        self.direction
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn next_waypoint(&self) -> Option<GridPosition> {
        self.waypoints.get(self.next_index).copied()
    }

    /// Advance past the waypoint just reached.
    pub fn advance(&mut self) -> PathProgress {
        if self.waypoints.is_empty() {
            return PathProgress::Finished;
        }
        let last = self.waypoints.len() as isize - 1;
        let mut index = self.next_index as isize + self.direction.step();
        if index > last || index < 0 {
            if !self.looping {
                return PathProgress::Finished;
            }
            self.direction = self.direction.reversed();
            index = (index + 2 * self.direction.step()).clamp(0, last);
        }
        self.next_index = index as usize;
        PathProgress::Next(self.next_index)
    }
}

/// Per-pawn path following state. Idle when there is no path.
#[derive(Component, Debug, Clone, Default)]
pub struct PathFollower {
    path: Option<PathState>,
}

impl PathFollower {
    /// Follow `waypoints` at `speed` grid units per second, bouncing back and forth
    /// forever when `looping`. Replaces any current path.
    pub fn set(
        &mut self,
        speed: f32,
        looping: bool,
        waypoints: Vec<GridPosition>,
        pawn: &str,
    ) -> Result<(), SimError> {
        if waypoints.is_empty() {
            return Err(SimError::EmptyPath(pawn.to_string()));
        }
        self.path = Some(PathState::new(speed, looping, waypoints));
        Ok(())
    }

    pub fn remove(&mut self, pawn: &str) -> Result<(), SimError> {
        self.path
            .take()
            .map(|_| ())
            .ok_or_else(|| SimError::NoActivePath(pawn.to_string()))
    }

    pub fn path(&self) -> Option<&PathState> {
        self.path.as_ref()
    }

    pub(crate) fn path_mut(&mut self) -> Option<&mut PathState> {
        self.path.as_mut()
    }

    pub(crate) fn finish(&mut self) {
        self.path = None;
    }

    pub fn is_following(&self) -> bool {
        self.path.is_some()
    }
}
