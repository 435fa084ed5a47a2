//! Pawn collider.
//!
//! # Hitbox resolution
//!
//! 1. Playing animation with a hitbox timeline: the active item (empty = intangible)
//! 2. Playing animation with a static hitbox: that box
//! 3. Otherwise the collider's own fallback `hit_box`, if any
//!
//! The local box is placed at `position - origin`, where `origin` is the playing
//! animation's anchor, or the collider's own when nothing plays.

use bevy_ecs::prelude::Component;

use crate::components::animation::Animator;
use crate::components::hitbox::HitBox;
use crate::components::mapposition::GridPosition;
use crate::error::SimError;
use crate::systems::animation::evaluate_hit_box;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Collider {
    /// Anchor offset used when no animation is playing, in grid units.
    pub origin: GridPosition,
    /// Fallback hitbox relative to the anchor, in grid units.
    pub hit_box: Option<HitBox>,
}

impl Collider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hit_box(mut self, hit_box: HitBox) -> Self {
        self.hit_box = Some(hit_box);
        self
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = GridPosition::new(x, y);
        self
    }

    /// World-space hitbox if the pawn stood at `position` at `now_ms`. Never cached.
    pub fn hit_box_at(
        &self,
        animator: &Animator,
        position: GridPosition,
        now_ms: u64,
    ) -> Result<Option<HitBox>, SimError> {
        let Some(playing) = animator.playing() else {
            return Ok(self.hit_box.map(|hb| hb.placed(position, self.origin)));
        };
        let origin = playing.animation.origin();
        if playing.animation.defines_hit_box() {
            let local = evaluate_hit_box(&playing.animation, playing.started_ms, now_ms)?;
            return Ok(local.map(|hb| hb.placed(position, origin)));
        }
        Ok(self.hit_box.map(|hb| hb.placed(position, origin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::animation::{AnimationDef, HitBoxItemDef, PixelPoint, TimelineItemDef};
    use crate::resources::animationstore::AnimationStore;

    fn store() -> AnimationStore {
        let mut store = AnimationStore::new();
        let def = |name: &str, hit_box_timeline| AnimationDef {
            name: name.into(),
            sheets: vec!["hero.png".into()],
            width: 16.0,
            height: 16.0,
            origin: PixelPoint { x: 8.0, y: 0.0 },
            hit_box: None,
            hit_box_timeline,
            timelines: vec![vec![
                TimelineItemDef::frame(0.0, 0.0, 16.0, 16.0, 100),
                TimelineItemDef::frame(16.0, 0.0, 16.0, 16.0, 100),
            ]],
        };
        store
            .insert_def(
                def(
                    "roll",
                    Some(vec![
                        HitBoxItemDef::solid(0.0, 0.0, 16.0, 16.0, 100),
                        HitBoxItemDef::intangible(100),
                    ]),
                ),
                16.0,
            )
            .unwrap();
        store.insert_def(def("idle", None), 16.0).unwrap();
        store
    }

    #[test]
    fn fallback_hit_box_without_animation() {
        let collider = Collider::new().with_hit_box(HitBox::new(0.0, 0.0, 1.0, 1.0));
        let placed = collider
            .hit_box_at(&Animator::default(), GridPosition::new(2.0, 3.0), 0)
            .unwrap();
        assert_eq!(placed, Some(HitBox::new(2.0, 3.0, 1.0, 1.0)));
    }

    #[test]
    fn fallback_hit_box_honours_own_origin() {
        let collider = Collider::new()
            .with_hit_box(HitBox::new(0.25, 0.0, 1.0, 1.0))
            .with_origin(0.5, 0.25);
        let placed = collider
            .hit_box_at(&Animator::default(), GridPosition::new(2.0, 3.0), 0)
            .unwrap();
        assert_eq!(placed, Some(HitBox::new(1.75, 2.75, 1.0, 1.0)));
    }

    #[test]
    fn timeline_hit_box_uses_animation_origin() {
        let store = store();
        let collider = Collider::new().with_hit_box(HitBox::new(0.0, 0.0, 5.0, 5.0));
        let mut animator = Animator::default();
        animator.play(&store, "roll", 0, "p").unwrap();
        let at = |now| collider.hit_box_at(&animator, GridPosition::new(2.0, 0.0), now).unwrap();
        assert_eq!(at(50), Some(HitBox::new(1.5, 0.0, 1.0, 1.0)));
        assert_eq!(at(150), None);
    }

    #[test]
    fn animation_without_hit_box_falls_back_to_collider() {
        let store = store();
        let collider = Collider::new()
            .with_hit_box(HitBox::new(0.0, 0.0, 1.0, 1.0))
            .with_origin(3.0, 3.0);
        let mut animator = Animator::default();
        animator.play(&store, "idle", 0, "p").unwrap();
        // The animation's anchor replaces the collider's own.
        assert_eq!(
            collider.hit_box_at(&animator, GridPosition::default(), 10).unwrap(),
            Some(HitBox::new(-0.5, 0.0, 1.0, 1.0))
        );
    }
}
