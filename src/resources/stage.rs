//! Static level geometry.
//!
//! Only the collision side of a stage matters to the simulation: the list of
//! hitboxes pawns may not walk into. Tiles and sheets belong to the renderer.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::components::hitbox::HitBox;
use crate::error::SimError;

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(default)]
    pub location: String,
    /// Hitboxes in grid units.
    #[serde(default)]
    pub hit_boxes: Vec<HitBox>,
}

impl Stage {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            hit_boxes: Vec::new(),
        }
    }

    pub fn with_hit_box(mut self, hit_box: HitBox) -> Self {
        self.hit_boxes.push(hit_box);
        self
    }

    /// Read the collision part of a `.stage` JSON document. Unknown keys (sheets,
    /// grid) are ignored.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(text)?)
    }
}
