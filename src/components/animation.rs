//! Animation definitions and their validated, immutable form.
//!
//! An [`AnimationDef`] is what the asset loader hands over (pixel units, serde
//! shaped after the `.animation` JSON files). [`Animation::new`] checks the load-time
//! invariants and converts hitboxes to grid units. Once built, an animation never
//! changes; pawns share it through an `Arc` out of
//! [`AnimationStore`](crate::resources::animationstore::AnimationStore).
//!
//! Frame selection for a given instant lives in
//! [`systems::animation`](crate::systems::animation). The [`Animator`] component
//! records which animation a pawn is playing and since when.

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::components::hitbox::HitBox;
use crate::components::mapposition::GridPosition;
use crate::error::SimError;
use crate::resources::animationstore::AnimationStore;

/// Rectangle in sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

/// One frame of a sprite layer as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItemDef {
    #[serde(default)]
    pub sheet_index: usize,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub empty: bool,
    pub duration_ms: u32,
}

impl TimelineItemDef {
    /// A visible frame cut from sheet 0 with no draw offset.
    pub fn frame(x: f32, y: f32, width: f32, height: f32, duration_ms: u32) -> Self {
        Self {
            sheet_index: 0,
            x,
            y,
            offset_x: 0.0,
            offset_y: 0.0,
            width,
            height,
            empty: false,
            duration_ms,
        }
    }

    /// An intentionally invisible frame.
    pub fn blank(duration_ms: u32) -> Self {
        Self {
            empty: true,
            ..Self::frame(0.0, 0.0, 0.0, 0.0, duration_ms)
        }
    }

    pub fn with_sheet(mut self, sheet_index: usize) -> Self {
        self.sheet_index = sheet_index;
        self
    }

    pub fn with_offset(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

/// One step of a hitbox timeline as stored on disk (pixels, relative to the anchor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitBoxItemDef {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub empty: bool,
    pub duration_ms: u32,
}

impl HitBoxItemDef {
    pub fn solid(x: f32, y: f32, width: f32, height: f32, duration_ms: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            empty: false,
            duration_ms,
        }
    }

    /// A stretch of the animation during which the pawn is intangible.
    pub fn intangible(duration_ms: u32) -> Self {
        Self {
            empty: true,
            ..Self::solid(0.0, 0.0, 0.0, 0.0, duration_ms)
        }
    }
}

/// Raw animation definition, as produced by the asset loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDef {
    #[serde(alias = "location")]
    pub name: String,
    #[serde(default)]
    pub sheets: Vec<String>,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub origin: PixelPoint,
    #[serde(default)]
    pub hit_box: Option<PixelRect>,
    #[serde(default)]
    pub hit_box_timeline: Option<Vec<HitBoxItemDef>>,
    pub timelines: Vec<Vec<TimelineItemDef>>,
}

/// Draw instruction for one layer at one instant: where to cut from which sheet and
/// how far to shift it. Pixel units, the renderer does the scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDescriptor {
    pub sheet_index: usize,
    pub source: PixelRect,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// One entry per layer, `None` where the layer shows an empty frame.
pub type SpriteList = SmallVec<[Option<SpriteDescriptor>; 4]>;

/// Anything laid out back to back on a timeline.
pub trait Timed {
    fn duration_ms(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineItem {
    pub sprite: Option<SpriteDescriptor>,
    pub duration_ms: u32,
}

impl Timed for TimelineItem {
    fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

/// Hitbox timeline entry in grid units; `None` means intangible.
#[derive(Debug, Clone, PartialEq)]
pub struct HitBoxItem {
    pub hit_box: Option<HitBox>,
    pub duration_ms: u32,
}

impl Timed for HitBoxItem {
    fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

pub type Layer = Vec<TimelineItem>;

/// Validated animation. All layers, and the hitbox timeline when present, span
/// exactly [`duration_ms`](Animation::duration_ms).
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    sheets: Vec<String>,
    width: f32,
    height: f32,
    origin: GridPosition,
    hit_box: Option<HitBox>,
    layers: Vec<Layer>,
    hit_box_timeline: Option<Vec<HitBoxItem>>,
    duration_ms: u32,
}

fn timeline_sum<T: Timed>(items: &[T]) -> u64 {
    items.iter().map(|item| u64::from(item.duration_ms())).sum()
}

impl Animation {
    /// Validate `def` and convert it to grid units using `grid_size` pixels per unit.
    pub fn new(def: AnimationDef, grid_size: f32) -> Result<Self, SimError> {
        let invalid = |reason: String| SimError::InvalidAnimation {
            name: def.name.clone(),
            reason,
        };

        if !(grid_size > 0.0) {
            return Err(invalid(format!("grid size must be positive, got {grid_size}")));
        }
        if def.timelines.is_empty() {
            return Err(invalid("animation has no timelines".into()));
        }
        for (i, timeline) in def.timelines.iter().enumerate() {
            if let Some(item) = timeline
                .iter()
                .find(|item| !item.empty && item.sheet_index >= def.sheets.len())
            {
                return Err(invalid(format!(
                    "timeline {i} uses sheetIndex {} but only {} sheets exist",
                    item.sheet_index,
                    def.sheets.len()
                )));
            }
        }

        let to_grid = |px: f32| px / grid_size;
        let layers: Vec<Layer> = def
            .timelines
            .iter()
            .map(|timeline| {
                timeline
                    .iter()
                    .map(|item| TimelineItem {
                        sprite: (!item.empty).then(|| SpriteDescriptor {
                            sheet_index: item.sheet_index,
                            source: PixelRect {
                                x: item.x,
                                y: item.y,
                                width: item.width,
                                height: item.height,
                            },
                            offset_x: item.offset_x,
                            offset_y: item.offset_y,
                        }),
                        duration_ms: item.duration_ms,
                    })
                    .collect()
            })
            .collect();

        let durations: Vec<u64> = layers.iter().map(|layer| timeline_sum(layer)).collect();
        let duration = durations[0];
        if durations.iter().any(|d| *d != duration) {
            return Err(invalid(format!(
                "contains timelines with differing durations {durations:?}"
            )));
        }
        if duration == 0 {
            return Err(invalid("total duration is zero".into()));
        }
        let duration_ms = u32::try_from(duration)
            .map_err(|_| invalid(format!("total duration {duration}ms is too long")))?;

        let hit_box_timeline = def.hit_box_timeline.as_ref().map(|items| {
            items
                .iter()
                .map(|item| HitBoxItem {
                    hit_box: (!item.empty).then(|| {
                        HitBox::new(
                            to_grid(item.x),
                            to_grid(item.y),
                            to_grid(item.width),
                            to_grid(item.height),
                        )
                    }),
                    duration_ms: item.duration_ms,
                })
                .collect::<Vec<_>>()
        });
        if let Some(items) = &hit_box_timeline {
            let hit_box_duration = timeline_sum(items);
            if hit_box_duration != duration {
                return Err(invalid(format!(
                    "hitbox timeline lasts {hit_box_duration}ms but sprite timelines last {duration}ms"
                )));
            }
        }

        Ok(Self {
            origin: GridPosition::new(to_grid(def.origin.x), to_grid(def.origin.y)),
            hit_box: def.hit_box.map(|rect| {
                HitBox::new(
                    to_grid(rect.x),
                    to_grid(rect.y),
                    to_grid(rect.width),
                    to_grid(rect.height),
                )
            }),
            width: def.width,
            height: def.height,
            layers,
            hit_box_timeline,
            duration_ms,
            sheets: def.sheets,
            name: def.name,
        })
    }

    /// Parse an `.animation` JSON document and validate it.
    pub fn from_json(text: &str, grid_size: f32) -> Result<Self, SimError> {
        let def: AnimationDef = serde_json::from_str(text)?;
        Self::new(def, grid_size)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }
    /// Frame size in pixels.
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
    /// Anchor offset in grid units.
    pub fn origin(&self) -> GridPosition {
        self.origin
    }
    /// Static hitbox relative to the anchor, used when there is no hitbox timeline.
    pub fn static_hit_box(&self) -> Option<HitBox> {
        self.hit_box
    }
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    pub fn hit_box_timeline(&self) -> Option<&[HitBoxItem]> {
        self.hit_box_timeline.as_deref()
    }
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Whether this animation says anything about collision at all. When it doesn't,
    /// the pawn's own fallback hitbox applies.
    pub fn defines_hit_box(&self) -> bool {
        self.hit_box_timeline.is_some() || self.hit_box.is_some()
    }
}

/// The animation a pawn is playing and when it started.
#[derive(Debug, Clone)]
pub struct PlayingAnimation {
    pub animation: Arc<Animation>,
    pub started_ms: u64,
}

/// Per-pawn animation playback. Idle when nothing plays.
#[derive(Component, Debug, Clone, Default)]
pub struct Animator {
    playing: Option<PlayingAnimation>,
}

impl Animator {
    /// Start playing `name` from `store` at `now_ms`. Already playing it is a no-op,
    /// so the loop is not restarted.
    pub fn play(
        &mut self,
        store: &AnimationStore,
        name: &str,
        now_ms: u64,
        pawn: &str,
    ) -> Result<(), SimError> {
        let animation = store.get(name).ok_or_else(|| SimError::UnknownAnimation {
            name: name.to_string(),
            pawn: pawn.to_string(),
        })?;
        if let Some(playing) = &self.playing
            && Arc::ptr_eq(&playing.animation, &animation)
        {
            return Ok(());
        }
        self.playing = Some(PlayingAnimation {
            animation,
            started_ms: now_ms,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        self.playing = None;
    }

    pub fn playing(&self) -> Option<&PlayingAnimation> {
        self.playing.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.playing.is_some()
    }
}
