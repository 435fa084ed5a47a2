//! Timeline evaluation.
//!
//! Given when an animation started and the current tick timestamp, work out which
//! frame each layer shows and which hitbox (if any) is active.
//!
//! # Evaluation
//!
//! 1. `spot = (now - start) mod duration`, so an animation that has been running for
//!    hours resolves exactly like one on its first loop.
//! 2. Each timeline is walked with a running prefix sum until `spot` falls inside
//!    `[prefix, prefix + duration)`.
//! 3. Empty sprite items yield `None` for their layer; empty hitbox items make the
//!    pawn intangible for that stretch.
//!
//! Results are memoized per pawn, see
//! [`Pawn::sprite`](crate::components::pawn::Pawn::sprite).

use crate::components::animation::{Animation, SpriteList, Timed};
use crate::components::hitbox::HitBox;
use crate::error::SimError;

/// Sprites and hitbox of an animation at one instant. The hitbox is relative to the
/// animation anchor; pawns place it in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub sprites: SpriteList,
    pub hit_box: Option<HitBox>,
}

/// Offset into the current loop of `animation`.
pub fn spot(animation: &Animation, start_ms: u64, now_ms: u64) -> u64 {
    now_ms.saturating_sub(start_ms) % u64::from(animation.duration_ms())
}

/// Find the item covering `spot`.
pub fn find_timeline_item<T: Timed>(items: &[T], spot: u64) -> Option<&T> {
    let mut progress = 0u64;
    items.iter().find(|item| {
        let end = progress + u64::from(item.duration_ms());
        let hit = spot >= progress && spot < end;
        progress = end;
        hit
    })
}

/// Resolve the draw descriptor of every layer.
pub fn evaluate_sprites(
    animation: &Animation,
    start_ms: u64,
    now_ms: u64,
) -> Result<SpriteList, SimError> {
    let spot = spot(animation, start_ms, now_ms);
    animation
        .layers()
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            find_timeline_item(layer, spot)
                .map(|item| item.sprite)
                .ok_or_else(|| SimError::TimelineLookup {
                    animation: animation.name().to_string(),
                    timeline: format!("timeline {i}"),
                    spot,
                })
        })
        .collect()
}

/// Resolve the hitbox, relative to the anchor.
///
/// With a hitbox timeline the active item decides (empty item means intangible);
/// otherwise the animation's static hitbox is returned, or `None` if it has none.
pub fn evaluate_hit_box(
    animation: &Animation,
    start_ms: u64,
    now_ms: u64,
) -> Result<Option<HitBox>, SimError> {
    let Some(timeline) = animation.hit_box_timeline() else {
        return Ok(animation.static_hit_box());
    };
    let spot = spot(animation, start_ms, now_ms);
    find_timeline_item(timeline, spot)
        .map(|item| item.hit_box)
        .ok_or_else(|| SimError::TimelineLookup {
            animation: animation.name().to_string(),
            timeline: "hitbox timeline".to_string(),
            spot,
        })
}

pub fn evaluate(animation: &Animation, start_ms: u64, now_ms: u64) -> Result<Evaluation, SimError> {
    Ok(Evaluation {
        sprites: evaluate_sprites(animation, start_ms, now_ms)?,
        hit_box: evaluate_hit_box(animation, start_ms, now_ms)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::animation::{AnimationDef, HitBoxItemDef, PixelPoint, TimelineItemDef};

    fn two_layer_animation() -> Animation {
        let layer = |row: f32| {
            vec![
                TimelineItemDef::frame(0.0, row, 16.0, 16.0, 200),
                TimelineItemDef::frame(16.0, row, 16.0, 16.0, 300),
            ]
        };
        Animation::new(
            AnimationDef {
                name: "walk".into(),
                sheets: vec!["hero.png".into()],
                width: 16.0,
                height: 16.0,
                origin: PixelPoint::default(),
                hit_box: None,
                hit_box_timeline: Some(vec![HitBoxItemDef::solid(0.0, 0.0, 16.0, 16.0, 500)]),
                timelines: vec![layer(0.0), layer(16.0)],
            },
            16.0,
        )
        .unwrap()
    }

    fn source_x(sprites: &SpriteList, layer: usize) -> Option<f32> {
        sprites[layer].map(|s| s.source.x)
    }

    #[test]
    fn resolves_items_by_prefix_sum() {
        let anim = two_layer_animation();
        let at_150 = evaluate(&anim, 0, 150).unwrap();
        assert_eq!(source_x(&at_150.sprites, 0), Some(0.0));
        assert_eq!(source_x(&at_150.sprites, 1), Some(0.0));
        assert_eq!(at_150.sprites[1].unwrap().source.y, 16.0);

        let at_450 = evaluate(&anim, 0, 450).unwrap();
        assert_eq!(source_x(&at_450.sprites, 0), Some(16.0));
        assert_eq!(source_x(&at_450.sprites, 1), Some(16.0));

        assert_eq!(at_150.hit_box, at_450.hit_box);
        assert_eq!(at_150.hit_box, Some(HitBox::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn item_boundaries_are_half_open() {
        let anim = two_layer_animation();
        assert_eq!(source_x(&evaluate_sprites(&anim, 0, 199).unwrap(), 0), Some(0.0));
        assert_eq!(source_x(&evaluate_sprites(&anim, 0, 200).unwrap(), 0), Some(16.0));
        assert_eq!(source_x(&evaluate_sprites(&anim, 0, 500).unwrap(), 0), Some(0.0));
    }

    #[test]
    fn evaluation_is_periodic() {
        let anim = two_layer_animation();
        for t in [0u64, 1, 150, 199, 200, 333, 499] {
            let base = evaluate(&anim, 40, 40 + t).unwrap();
            for k in [1u64, 2, 7, 1_000_000] {
                assert_eq!(evaluate(&anim, 40, 40 + t + k * 500).unwrap(), base);
            }
        }
    }

    #[test]
    fn start_time_shifts_the_loop() {
        let anim = two_layer_animation();
        assert_eq!(source_x(&evaluate_sprites(&anim, 1000, 1150).unwrap(), 0), Some(0.0));
        assert_eq!(source_x(&evaluate_sprites(&anim, 1000, 1250).unwrap(), 0), Some(16.0));
    }

    #[test]
    fn empty_items_yield_none() {
        let anim = Animation::new(
            AnimationDef {
                name: "blink".into(),
                sheets: vec!["hero.png".into()],
                width: 16.0,
                height: 16.0,
                origin: PixelPoint::default(),
                hit_box: None,
                hit_box_timeline: Some(vec![
                    HitBoxItemDef::solid(0.0, 0.0, 16.0, 16.0, 100),
                    HitBoxItemDef::intangible(100),
                ]),
                timelines: vec![vec![
                    TimelineItemDef::frame(0.0, 0.0, 16.0, 16.0, 100),
                    TimelineItemDef::blank(100),
                ]],
            },
            16.0,
        )
        .unwrap();
        let visible = evaluate(&anim, 0, 50).unwrap();
        assert!(visible.sprites[0].is_some());
        assert!(visible.hit_box.is_some());

        let hidden = evaluate(&anim, 0, 150).unwrap();
        assert_eq!(hidden.sprites[0], None);
        assert_eq!(hidden.hit_box, None);
    }

    #[test]
    fn static_hit_box_used_without_timeline() {
        let mut def = AnimationDef {
            name: "idle".into(),
            sheets: vec!["hero.png".into()],
            width: 16.0,
            height: 16.0,
            origin: PixelPoint::default(),
            hit_box: None,
            hit_box_timeline: None,
            timelines: vec![vec![TimelineItemDef::frame(0.0, 0.0, 16.0, 16.0, 100)]],
        };
        let without = Animation::new(def.clone(), 16.0).unwrap();
        assert_eq!(evaluate_hit_box(&without, 0, 10).unwrap(), None);

        def.hit_box = Some(crate::components::animation::PixelRect {
            x: 0.0,
            y: 8.0,
            width: 16.0,
            height: 8.0,
        });
        let with = Animation::new(def, 16.0).unwrap();
        assert_eq!(
            evaluate_hit_box(&with, 0, 10).unwrap(),
            Some(HitBox::new(0.0, 0.5, 1.0, 0.5))
        );
    }

    #[test]
    fn lookup_reports_missing_item() {
        let items: Vec<crate::components::animation::HitBoxItem> = Vec::new();
        assert!(find_timeline_item(&items, 0).is_none());
    }
}
