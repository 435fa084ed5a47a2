//! Collision-constrained movement.
//!
//! [`resolve_move`] turns a requested destination into the position a pawn may
//! actually take, given the static level hitboxes and every other pawn's current
//! hitbox.
//!
//! # Strategies
//!
//! - Partial movement allowed: two orderings are tried, X fully then Y, and Y fully
//!   then X. A blocked axis is clamped so the pawn ends flush against the nearest
//!   obstacle, which is what makes pawns slide along walls.
//! - Partial movement not allowed: the whole diagonal displacement is one atomic step
//!   and any overlap denies it.
//!
//! Each strategy counts its successful steps; the highest count wins and a strategy
//! that succeeds on every step ends the search. Ties keep the earlier strategy.
//!
//! Only the candidate position is tested, not the swept path between start and
//! destination.

use log::debug;

use crate::components::animation::Animator;
use crate::components::collider::Collider;
use crate::components::hitbox::HitBox;
use crate::components::mapposition::GridPosition;
use crate::components::pawn::PawnId;
use crate::error::SimError;
use crate::geometry::closer_to_zero;

/// Most one-ulp corrections tried before a flush step is given up.
const MAX_NUDGES: usize = 16;

/// What a moving pawn can bump into.
pub trait CollisionWorld {
    /// Static level geometry.
    fn level_hit_boxes(&self) -> &[HitBox];

    /// Current hitboxes of all live pawns other than `exclude`, in spawn order.
    fn pawn_hit_boxes(&self, exclude: PawnId) -> Vec<HitBox>;
}

/// Snapshot of the obstacles around one moving pawn.
#[derive(Debug, Clone, Default)]
pub struct Obstacles<'a> {
    pub level: &'a [HitBox],
    pub pawns: Vec<(PawnId, HitBox)>,
}

impl CollisionWorld for Obstacles<'_> {
    fn level_hit_boxes(&self) -> &[HitBox] {
        self.level
    }

    fn pawn_hit_boxes(&self, exclude: PawnId) -> Vec<HitBox> {
        self.pawns
            .iter()
            .filter(|(id, _)| *id != exclude)
            .map(|(_, hit_box)| *hit_box)
            .collect()
    }
}

/// The moving pawn, borrowed from its components.
#[derive(Debug, Clone, Copy)]
pub struct Mover<'a> {
    pub id: PawnId,
    pub name: &'a str,
    pub position: GridPosition,
    pub collider: &'a Collider,
    pub animator: &'a Animator,
}

impl Mover<'_> {
    fn hit_box_at(&self, position: GridPosition, now_ms: u64) -> Result<Option<HitBox>, SimError> {
        self.collider.hit_box_at(self.animator, position, now_ms)
    }
}

/// One leg of a strategy: the coordinates it sets, the others are kept.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    X(f32),
    Y(f32),
    Both(f32, f32),
}

impl Step {
    fn apply(self, from: GridPosition) -> GridPosition {
        match self {
            Step::X(x) => GridPosition::new(x, from.y),
            Step::Y(y) => GridPosition::new(from.x, y),
            Step::Both(x, y) => GridPosition::new(x, y),
        }
    }
}

fn strategies(target: GridPosition, allow_partial: bool) -> Vec<Vec<Step>> {
    if allow_partial {
        vec![
            vec![Step::X(target.x), Step::Y(target.y)],
            vec![Step::Y(target.y), Step::X(target.x)],
        ]
    } else {
        vec![vec![Step::Both(target.x, target.y)]]
    }
}

/// Flush stop along one axis against one obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisClamp {
    /// Displacement of the leading edge of the unmoved box up to the facing edge.
    gap: f32,
    /// Anchor coordinate that puts the leading edge on the facing edge.
    flush: f32,
}

impl AxisClamp {
    /// Keep whichever of `self` and `current` stops closer to the start.
    fn nearest(self, current: Option<AxisClamp>) -> AxisClamp {
        match current {
            Some(current) if closer_to_zero(self.gap, current.gap) == current.gap => current,
            _ => self,
        }
    }
}

/// Flush stop for a move of `travel` along one axis. `None` when the obstacle is
/// not strictly ahead (already flush, behind, or overlapping), which fails the step.
///
/// The flush coordinate is derived from the obstacle edge and the anchor-to-edge
/// extent of the unmoved box, not accumulated from the start position.
fn axis_clamp(
    travel: f32,
    start: f32,
    unmoved_min: f32,
    unmoved_max: f32,
    obstacle_min: f32,
    obstacle_max: f32,
) -> Option<AxisClamp> {
    if travel > 0.0 {
        let gap = obstacle_min - unmoved_max;
        (gap > 0.0).then(|| AxisClamp {
            gap,
            flush: obstacle_min - (unmoved_max - start),
        })
    } else {
        let gap = obstacle_max - unmoved_min;
        (gap < 0.0).then(|| AxisClamp {
            gap,
            flush: obstacle_max + (start - unmoved_min),
        })
    }
}

#[derive(Debug, Default)]
struct Clamp {
    x: Option<AxisClamp>,
    y: Option<AxisClamp>,
}

impl Clamp {
    /// Tighten the clamp against one conflicting obstacle. Returns false when the
    /// step cannot be salvaged.
    fn tighten(
        &mut self,
        step: Step,
        start: GridPosition,
        unmoved: &HitBox,
        obstacle: &HitBox,
    ) -> bool {
        let (target_x, target_y) = match step {
            Step::X(x) => (Some(x), None),
            Step::Y(y) => (None, Some(y)),
            Step::Both(x, y) => (Some(x), Some(y)),
        };
        if let Some(x) = target_x {
            let travel = x - start.x;
            if travel != 0.0 {
                let Some(stop) = axis_clamp(
                    travel,
                    start.x,
                    unmoved.left(),
                    unmoved.right(),
                    obstacle.left(),
                    obstacle.right(),
                ) else {
                    return false;
                };
                self.x = Some(stop.nearest(self.x));
            }
        }
        if let Some(y) = target_y {
            let travel = y - start.y;
            if travel != 0.0 {
                let Some(stop) = axis_clamp(
                    travel,
                    start.y,
                    unmoved.top(),
                    unmoved.bottom(),
                    obstacle.top(),
                    obstacle.bottom(),
                ) else {
                    return false;
                };
                self.y = Some(stop.nearest(self.y));
            }
        }
        true
    }

    fn apply(&self, candidate: GridPosition) -> GridPosition {
        GridPosition::new(
            self.x.map_or(candidate.x, |stop| stop.flush),
            self.y.map_or(candidate.y, |stop| stop.flush),
        )
    }
}

/// Move `value` one representable step towards `anchor`.
fn nudge_towards(value: f32, anchor: f32) -> f32 {
    if value > anchor {
        value.next_down()
    } else if value < anchor {
        value.next_up()
    } else {
        value
    }
}

/// Pull a clamped position back towards `start` until the box actually placed
/// there clears every obstacle it was clamped against. Rounding in the box
/// placement can otherwise leave it overlapping by an ulp.
fn settle(
    mover: &Mover,
    mut position: GridPosition,
    start: GridPosition,
    clamp: &Clamp,
    blocking: &[HitBox],
    now_ms: u64,
) -> Result<Option<GridPosition>, SimError> {
    for _ in 0..MAX_NUDGES {
        let Some(placed) = mover.hit_box_at(position, now_ms)? else {
            return Ok(Some(position));
        };
        if !blocking.iter().any(|obstacle| placed.overlaps(obstacle)) {
            return Ok(Some(position));
        }
        if clamp.x.is_some() {
            position.x = nudge_towards(position.x, start.x);
        }
        if clamp.y.is_some() {
            position.y = nudge_towards(position.y, start.y);
        }
    }
    debug!(
        "pawn \"{}\" could not settle flush at ({}, {})",
        mover.name, position.x, position.y
    );
    Ok(None)
}

/// Try one step of a strategy. Returns the position reached, or `None` if blocked.
#[allow(clippy::too_many_arguments)]
fn try_step(
    mover: &Mover,
    step: Step,
    from: GridPosition,
    start: GridPosition,
    unmoved: &HitBox,
    allow_partial: bool,
    now_ms: u64,
    world: &impl CollisionWorld,
) -> Result<Option<GridPosition>, SimError> {
    let candidate = step.apply(from);
    let Some(moved) = mover.hit_box_at(candidate, now_ms)? else {
        // Intangible at the destination: nothing to collide with.
        return Ok(Some(candidate));
    };

    let mut clamp = Clamp::default();
    let mut blocking = Vec::new();
    let others = world.pawn_hit_boxes(mover.id);
    let obstacles = world.level_hit_boxes().iter().chain(others.iter());
    for obstacle in obstacles {
        if !moved.overlaps(obstacle) {
            continue;
        }
        if !allow_partial || !clamp.tighten(step, start, unmoved, obstacle) {
            return Ok(None);
        }
        blocking.push(*obstacle);
    }

    if blocking.is_empty() {
        return Ok(Some(candidate));
    }
    settle(mover, clamp.apply(candidate), start, &clamp, &blocking, now_ms)
}

/// Resolve a move of `mover` towards `target`.
///
/// Returns the position to commit, or `None` when no strategy managed a single
/// step. Pawns without a hitbox always reach `target`.
pub fn resolve_move(
    mover: &Mover,
    target: GridPosition,
    allow_partial: bool,
    now_ms: u64,
    world: &impl CollisionWorld,
) -> Result<Option<GridPosition>, SimError> {
    let start = mover.position;
    // Clamp math is anchored to the box at the current position: the box at the
    // destination may belong to another animation frame.
    let Some(unmoved) = mover.hit_box_at(start, now_ms)? else {
        return Ok(Some(target));
    };

    let mut best: Option<(usize, GridPosition)> = None;
    for strategy in strategies(target, allow_partial) {
        let mut successes = 0;
        let mut position = start;
        for step in &strategy {
            match try_step(mover, *step, position, start, &unmoved, allow_partial, now_ms, world)? {
                Some(reached) => {
                    successes += 1;
                    position = reached;
                }
                None => break,
            }
        }

        if successes > best.map_or(0, |(count, _)| count) {
            best = Some((successes, position));
            if successes == strategy.len() {
                break;
            }
        }
    }

    match best {
        Some((successes, position)) => {
            debug!(
                "pawn \"{}\" move ({}, {}) -> ({}, {}) resolved to ({}, {}) after {} steps",
                mover.name, start.x, start.y, target.x, target.y, position.x, position.y, successes
            );
            Ok(Some(position))
        }
        None => {
            debug!(
                "pawn \"{}\" move ({}, {}) -> ({}, {}) denied",
                mover.name, start.x, start.y, target.x, target.y
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::animation::{AnimationDef, PixelPoint, PixelRect, TimelineItemDef};
    use crate::resources::animationstore::AnimationStore;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Components of one test pawn.
    struct Body {
        position: GridPosition,
        collider: Collider,
        animator: Animator,
    }

    impl Body {
        fn new(collider: Collider, x: f32, y: f32) -> Self {
            Self {
                position: GridPosition::new(x, y),
                collider,
                animator: Animator::default(),
            }
        }

        fn at(&self, position: GridPosition) -> Body {
            Body {
                position,
                collider: self.collider,
                animator: self.animator.clone(),
            }
        }

        fn mover(&self) -> Mover<'_> {
            Mover {
                id: PawnId(1),
                name: "mover",
                position: self.position,
                collider: &self.collider,
                animator: &self.animator,
            }
        }

        fn placed(&self) -> HitBox {
            self.collider
                .hit_box_at(&self.animator, self.position, 0)
                .unwrap()
                .unwrap()
        }
    }

    fn unit_pawn(x: f32, y: f32) -> Body {
        Body::new(Collider::new().with_hit_box(HitBox::new(0.0, 0.0, 1.0, 1.0)), x, y)
    }

    fn level(boxes: &[HitBox]) -> Obstacles<'_> {
        Obstacles {
            level: boxes,
            pawns: Vec::new(),
        }
    }

    fn partial(body: &Body, x: f32, y: f32, walls: &[HitBox]) -> GridPosition {
        resolve_move(&body.mover(), GridPosition::new(x, y), true, 0, &level(walls))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn free_move_reaches_target() {
        let pawn = unit_pawn(0.0, 0.0);
        let result = resolve_move(&pawn.mover(), GridPosition::new(3.0, 2.0), false, 0, &level(&[])).unwrap();
        assert_eq!(result, Some(GridPosition::new(3.0, 2.0)));
    }

    #[test]
    fn pawn_without_hit_box_ignores_walls() {
        let pawn = Body::new(Collider::new(), 0.0, 0.0);
        let walls = [HitBox::new(-10.0, -10.0, 20.0, 20.0)];
        let result = resolve_move(&pawn.mover(), GridPosition::new(1.0, 1.0), false, 0, &level(&walls)).unwrap();
        assert_eq!(result, Some(GridPosition::new(1.0, 1.0)));
    }

    #[test]
    fn atomic_move_into_wall_is_denied() {
        let pawn = unit_pawn(0.0, 0.0);
        let walls = [HitBox::new(2.0, 0.0, 1.0, 1.0)];
        let result = resolve_move(&pawn.mover(), GridPosition::new(2.0, 0.0), false, 0, &level(&walls)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn partial_move_stops_flush() {
        let pawn = unit_pawn(0.0, 0.0);
        let result = partial(&pawn, 2.0, 0.0, &[HitBox::new(2.0, 0.0, 1.0, 1.0)]);
        assert_eq!(result.x, 1.0);
        assert_eq!(result.y, 0.0);
    }

    #[test]
    fn partial_move_leftwards_and_upwards() {
        let pawn = unit_pawn(5.0, 5.0);
        let walls = [HitBox::new(2.0, 5.0, 1.0, 1.0), HitBox::new(5.0, 1.0, 1.0, 2.0)];
        assert!(approx_eq(partial(&pawn, 2.5, 5.0, &walls).x, 3.0));
        assert!(approx_eq(partial(&pawn, 5.0, 2.0, &walls).y, 3.0));
    }

    #[test]
    fn flush_stop_clears_the_wall_from_any_start() {
        for wall_left in [7.0_f32, 7.3] {
            let wall = [HitBox::new(wall_left, -100.0, 1.0, 200.0)];
            for i in 0..1000 {
                let start_x = 2.0 + i as f32 * 0.0037 + 0.013;
                let pawn = unit_pawn(start_x, 0.0);
                let stop = partial(&pawn, wall_left - 0.5, 0.0, &wall);
                let parked = pawn.at(stop);
                let placed = parked.placed();
                assert!(
                    !placed.overlaps(&wall[0]),
                    "start {start_x}: parked at {} overlaps wall at {wall_left}",
                    stop.x
                );
                assert!(placed.right() <= wall_left);
                assert!(stop.x > wall_left - 1.0 - 1e-4);

                // Parked flush, the pawn can still slide along the wall.
                let slid = partial(&parked, stop.x, 3.0, &wall);
                assert_eq!(slid, GridPosition::new(stop.x, 3.0));
            }
        }
    }

    #[test]
    fn flush_stop_clears_the_wall_moving_left() {
        for wall_right in [-7.0_f32, -7.3] {
            let wall = [HitBox::new(wall_right - 1.0, -100.0, 1.0, 200.0)];
            for i in 0..1000 {
                let start_x = -2.0 - i as f32 * 0.0037 - 0.013;
                let pawn = unit_pawn(start_x, 0.0);
                let stop = partial(&pawn, wall_right - 0.5, 0.0, &wall);
                let placed = pawn.at(stop).placed();
                assert!(
                    !placed.overlaps(&wall[0]),
                    "start {start_x}: parked at {} overlaps wall at {wall_right}",
                    stop.x
                );
                assert!(placed.left() >= wall_right);
                assert!(stop.x < wall_right + 1e-4);
            }
        }
    }

    #[test]
    fn offset_collider_stops_flush_on_x() {
        // Anchor at (0.5, 0) inside a box starting 0.25 right of the sprite corner:
        // the placed box spans [x - 0.25, x + 0.75].
        let collider = Collider::new()
            .with_hit_box(HitBox::new(0.25, 0.0, 1.0, 1.0))
            .with_origin(0.5, 0.0);
        let pawn = Body::new(collider, 0.0, 0.0);

        let right_wall = [HitBox::new(3.0, -10.0, 1.0, 20.0)];
        let stop = partial(&pawn, 5.0, 0.0, &right_wall);
        assert_eq!(stop, GridPosition::new(2.25, 0.0));
        assert_eq!(pawn.at(stop).placed().right(), 3.0);

        let left_wall = [HitBox::new(-4.0, -10.0, 1.0, 20.0)];
        let stop = partial(&pawn, -5.0, 0.0, &left_wall);
        assert_eq!(stop, GridPosition::new(-2.75, 0.0));
        assert_eq!(pawn.at(stop).placed().left(), -3.0);
    }

    #[test]
    fn animation_origin_offsets_stop_flush_on_y() {
        // Anchor at the sprite's bottom centre, hitbox on the lower half: the placed
        // box spans [y - 0.5, y] vertically.
        let mut store = AnimationStore::new();
        store
            .insert_def(
                AnimationDef {
                    name: "stand".into(),
                    sheets: vec!["hero.png".into()],
                    width: 16.0,
                    height: 16.0,
                    origin: PixelPoint { x: 8.0, y: 16.0 },
                    hit_box: Some(PixelRect {
                        x: 0.0,
                        y: 8.0,
                        width: 16.0,
                        height: 8.0,
                    }),
                    hit_box_timeline: None,
                    timelines: vec![vec![TimelineItemDef::frame(0.0, 0.0, 16.0, 16.0, 100)]],
                },
                16.0,
            )
            .unwrap();
        let mut pawn = Body::new(Collider::new(), 0.0, 0.0);
        pawn.animator.play(&store, "stand", 0, "mover").unwrap();

        let ceiling = [HitBox::new(-10.0, -3.0, 20.0, 1.0)];
        let stop = partial(&pawn, 0.0, -2.2, &ceiling);
        assert_eq!(stop, GridPosition::new(0.0, -1.5));
        assert_eq!(pawn.at(stop).placed().top(), -2.0);

        let floor = [HitBox::new(-10.0, 2.0, 20.0, 1.0)];
        let stop = partial(&pawn, 0.0, 2.3, &floor);
        assert_eq!(stop, GridPosition::new(0.0, 2.0));
        assert_eq!(pawn.at(stop).placed().bottom(), 2.0);
    }

    #[test]
    fn slides_along_floor() {
        // Standing on a floor: the diagonal keeps all of X and none of Y.
        let pawn = unit_pawn(0.0, 0.0);
        let result = partial(&pawn, 1.5, 0.75, &[HitBox::new(-10.0, 1.0, 20.0, 1.0)]);
        assert!(approx_eq(result.x, 1.5));
        assert!(approx_eq(result.y, 0.0));
    }

    #[test]
    fn slides_along_wall_with_y_first_strategy() {
        // Wall to the right, flush: X fails in both orders, Y-then-X still moves Y.
        let pawn = unit_pawn(0.0, 0.0);
        let result = partial(&pawn, 0.5, 2.0, &[HitBox::new(1.0, -10.0, 1.0, 20.0)]);
        assert!(approx_eq(result.x, 0.0));
        assert!(approx_eq(result.y, 2.0));
    }

    #[test]
    fn nearest_obstacle_wins_the_clamp() {
        let pawn = unit_pawn(0.0, 0.0);
        let walls = [HitBox::new(4.0, 0.0, 1.0, 1.0), HitBox::new(2.5, 0.0, 2.0, 1.0)];
        assert!(approx_eq(partial(&pawn, 4.0, 0.0, &walls).x, 1.5));
    }

    #[test]
    fn already_flush_partial_move_does_not_advance() {
        let pawn = unit_pawn(0.0, 0.0);
        // The X step fails in both orderings, the zero-length Y step still counts.
        let result = partial(&pawn, 2.0, 0.0, &[HitBox::new(1.0, 0.0, 2.0, 1.0)]);
        assert_eq!(result, GridPosition::new(0.0, 0.0));
    }

    #[test]
    fn other_pawns_block() {
        let pawn = unit_pawn(0.0, 0.0);
        let world = Obstacles {
            level: &[],
            pawns: vec![(PawnId(2), HitBox::new(3.0, 0.0, 1.0, 1.0))],
        };
        let result = resolve_move(&pawn.mover(), GridPosition::new(3.0, 0.0), true, 0, &world)
            .unwrap()
            .unwrap();
        assert!(approx_eq(result.x, 2.0));
        assert_eq!(
            resolve_move(&pawn.mover(), GridPosition::new(3.0, 0.0), false, 0, &world).unwrap(),
            None
        );
    }

    #[test]
    fn own_hit_box_is_ignored() {
        let pawn = unit_pawn(0.0, 0.0);
        let world = Obstacles {
            level: &[],
            pawns: vec![(PawnId(1), HitBox::new(0.0, 0.0, 1.0, 1.0))],
        };
        let result = resolve_move(&pawn.mover(), GridPosition::new(0.5, 0.0), false, 0, &world).unwrap();
        assert_eq!(result, Some(GridPosition::new(0.5, 0.0)));
    }

    #[test]
    fn atomic_diagonal_into_corner_is_denied() {
        let pawn = unit_pawn(0.0, 0.0);
        let walls = [HitBox::new(1.0, 1.0, 1.0, 1.0)];
        let result = resolve_move(&pawn.mover(), GridPosition::new(1.0, 1.0), false, 0, &level(&walls)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn nudging_moves_towards_the_anchor() {
        assert!(nudge_towards(6.0, 2.0) < 6.0);
        assert!(nudge_towards(-6.0, -2.0) > -6.0);
        assert_eq!(nudge_towards(1.0, 1.0), 1.0);
    }
}
