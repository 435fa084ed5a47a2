//! Animation resource registry.
//!
//! Owned store of validated animations, looked up by name. Pawns keep an
//! `Arc` to whatever they play, so replacing an entry never disturbs a pawn that
//! is mid-animation.

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::info;
use rustc_hash::FxHashMap;

use crate::components::animation::{Animation, AnimationDef};
use crate::error::SimError;

/// Central registry of reusable animation definitions keyed by name.
#[derive(Resource, Debug, Default)]
pub struct AnimationStore {
    pub animations: FxHashMap<String, Arc<Animation>>,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self {
            animations: FxHashMap::default(),
        }
    }

    /// Register an already validated animation under its own name.
    pub fn insert(&mut self, animation: Animation) -> Arc<Animation> {
        let animation = Arc::new(animation);
        self.animations
            .insert(animation.name().to_string(), Arc::clone(&animation));
        animation
    }

    /// Validate `def` and register it.
    pub fn insert_def(&mut self, def: AnimationDef, grid_size: f32) -> Result<Arc<Animation>, SimError> {
        Ok(self.insert(Animation::new(def, grid_size)?))
    }

    /// Parse, validate and register an `.animation` JSON document.
    pub fn load_json(&mut self, text: &str, grid_size: f32) -> Result<Arc<Animation>, SimError> {
        let animation = self.insert(Animation::from_json(text, grid_size)?);
        info!(
            "Loaded animation \"{}\" ({} layers, {}ms)",
            animation.name(),
            animation.layers().len(),
            animation.duration_ms()
        );
        Ok(animation)
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<Arc<Animation>> {
        self.animations.get(name.as_ref()).cloned()
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.animations.contains_key(name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
