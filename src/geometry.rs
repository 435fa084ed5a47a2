//! Small numeric helpers shared by movement resolution.
//!
//! The rectangle overlap test itself lives on
//! [`HitBox::overlaps`](crate::components::hitbox::HitBox::overlaps).

use crate::components::mapposition::GridPosition;

/// Pick whichever of `a` and `b` lies closer to `target`. Ties go to `b`.
pub fn closer_to_target(target: f32, a: f32, b: f32) -> f32 {
    if (a - target).abs() < (b - target).abs() {
        a
    } else {
        b
    }
}

/// Pick whichever of `a` and `b` is smaller in magnitude. Ties go to `b`.
pub fn closer_to_zero(a: f32, b: f32) -> f32 {
    closer_to_target(0.0, a, b)
}

/// Scale a two-axis step so its length never exceeds `max_distance`.
///
/// Single-axis steps are returned untouched; diagonal steps are shrunk so moving
/// diagonally is never faster than moving along one axis.
pub fn limit_diagonal(dx: f32, dy: f32, max_distance: f32) -> (f32, f32) {
    if dx == 0.0 || dy == 0.0 {
        return (dx, dy);
    }
    let length = (dx * dx + dy * dy).sqrt();
    if length <= max_distance {
        return (dx, dy);
    }
    let ratio = max_distance / length;
    (dx * ratio, dy * ratio)
}

/// Compute where a pawn at `from` should aim to land when heading for `to` with at
/// most `max_distance` of travel this tick.
///
/// Each axis steps by `max_distance` towards the destination, the combined step is
/// limited with [`limit_diagonal`], and each axis is finally clamped so it never
/// crosses past the destination coordinate.
pub fn step_towards(from: GridPosition, to: GridPosition, max_distance: f32) -> GridPosition {
    let axis_step = |current: f32, destination: f32| {
        if current == destination {
            0.0
        } else if current > destination {
            -max_distance
        } else {
            max_distance
        }
    };
    let dx = axis_step(from.x, to.x);
    let dy = axis_step(from.y, to.y);
    let (dx, dy) = limit_diagonal(dx, dy, max_distance);

    let clamp_axis = |current: f32, step: f32, destination: f32| {
        if step == 0.0 {
            current
        } else if step < 0.0 {
            (current + step).max(destination)
        } else {
            (current + step).min(destination)
        }
    };
    GridPosition::new(clamp_axis(from.x, dx, to.x), clamp_axis(from.y, dy, to.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn closer_to_zero_prefers_smaller_magnitude() {
        assert_eq!(closer_to_zero(-0.5, 2.0), -0.5);
        assert_eq!(closer_to_zero(3.0, -1.0), -1.0);
        assert_eq!(closer_to_zero(f32::INFINITY, 0.25), 0.25);
    }

    #[test]
    fn closer_to_target_picks_nearest() {
        assert_eq!(closer_to_target(10.0, 9.0, 12.0), 9.0);
        assert_eq!(closer_to_target(10.0, 7.0, 11.5), 11.5);
    }

    #[test]
    fn limit_diagonal_keeps_single_axis() {
        assert_eq!(limit_diagonal(3.0, 0.0, 1.0), (3.0, 0.0));
        assert_eq!(limit_diagonal(0.0, -2.0, 1.0), (0.0, -2.0));
    }

    #[test]
    fn limit_diagonal_caps_magnitude() {
        let (dx, dy) = limit_diagonal(1.0, -1.0, 1.0);
        assert!(approx_eq((dx * dx + dy * dy).sqrt(), 1.0));
        assert!(approx_eq(dx, -dy));
    }

    #[test]
    fn step_towards_moves_full_distance_on_one_axis() {
        let next = step_towards(GridPosition::new(0.0, 0.0), GridPosition::new(5.0, 0.0), 2.0);
        assert!(approx_eq(next.x, 2.0));
        assert!(approx_eq(next.y, 0.0));
    }

    #[test]
    fn step_towards_never_overshoots() {
        let from = GridPosition::new(0.0, 0.0);
        let to = GridPosition::new(0.3, -0.1);
        for max in [0.05_f32, 0.1, 0.2, 0.5, 1.0, 10.0] {
            let next = step_towards(from, to, max);
            let travelled = ((next.x - from.x).powi(2) + (next.y - from.y).powi(2)).sqrt();
            assert!(travelled <= max + EPSILON, "max {max}: travelled {travelled}");
            assert!(next.x >= 0.0 && next.x <= 0.3);
            assert!(next.y <= 0.0 && next.y >= -0.1);
        }
    }

    #[test]
    fn step_towards_lands_exactly_on_destination() {
        let to = GridPosition::new(4.0, 4.0);
        let next = step_towards(GridPosition::new(3.9, 4.0), to, 1.0);
        assert_eq!(next, to);
    }

    #[test]
    fn step_towards_diagonal_is_not_faster() {
        let next = step_towards(GridPosition::new(0.0, 0.0), GridPosition::new(10.0, 10.0), 1.0);
        let travelled = (next.x * next.x + next.y * next.y).sqrt();
        assert!(approx_eq(travelled, 1.0));
    }
}
