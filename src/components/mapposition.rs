use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Continuous position in grid units. As a component it is the pawn's anchor
/// position; waypoints use the same type.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPosition {
    #[serde(rename = "gridX")]
    pub x: f32,
    #[serde(rename = "gridY")]
    pub y: f32,
}

impl GridPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`, in grid units.
    pub fn distance_to(&self, other: GridPosition) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}
