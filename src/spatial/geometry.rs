//! Circle/point collision and direction helpers shared by combat and AI

use std::f32::consts::PI;

use crate::core::types::Vec2;

/// Sum-of-radii overlap test
#[inline]
pub fn circle_collide(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(&b) < a_radius + b_radius
}

/// Inclusive point-in-rectangle test
#[inline]
pub fn point_in_rect(p: Vec2, origin: Vec2, size: Vec2) -> bool {
    p.x >= origin.x && p.x <= origin.x + size.x && p.y >= origin.y && p.y <= origin.y + size.y
}

/// Unit vector from `from` toward `to`, zero when they coincide
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    let d = to - from;
    let len = d.length();
    if len == 0.0 {
        Vec2::ZERO
    } else {
        d * (1.0 / len)
    }
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(&b)
}

/// Wrap an angle into [-PI, PI]
pub fn wrap_angle(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Arc hit test for a melee swing.
///
/// The target is hit when it lies within `range + target_radius` of the
/// attacker and the bearing to it is inside half of `arc_degrees` either side
/// of `facing`. A zero facing vector swings to the right.
pub fn melee_arc_hit(
    attacker: Vec2,
    facing: Vec2,
    range: f32,
    arc_degrees: f32,
    target: Vec2,
    target_radius: f32,
) -> bool {
    let dist = attacker.distance(&target);
    if dist > range + target_radius {
        return false;
    }
    if dist == 0.0 {
        return true;
    }
    let facing_angle = if facing.is_zero() { 0.0 } else { facing.angle() };
    let to_target = (target - attacker).angle();
    let diff = wrap_angle(to_target - facing_angle);
    diff.abs() < arc_degrees.to_radians() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_collide_strict() {
        let a = Vec2::new(0.0, 0.0);
        assert!(circle_collide(a, 3.0, Vec2::new(5.0, 0.0), 3.0));
        // Touching exactly is not an overlap
        assert!(!circle_collide(a, 3.0, Vec2::new(6.0, 0.0), 3.0));
    }

    #[test]
    fn test_point_in_rect_inclusive() {
        let origin = Vec2::new(10.0, 10.0);
        let size = Vec2::new(5.0, 5.0);
        assert!(point_in_rect(Vec2::new(15.0, 10.0), origin, size));
        assert!(!point_in_rect(Vec2::new(15.1, 10.0), origin, size));
    }

    #[test]
    fn test_direction_of_coincident_points_is_zero() {
        let p = Vec2::new(4.0, 4.0);
        assert_eq!(direction(p, p), Vec2::ZERO);
        let d = direction(Vec2::ZERO, Vec2::new(0.0, -10.0));
        assert!((d.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_melee_arc_front_and_back() {
        let origin = Vec2::ZERO;
        let facing = Vec2::new(1.0, 0.0);
        assert!(melee_arc_hit(origin, facing, 28.0, 120.0, Vec2::new(20.0, 5.0), 7.0));
        assert!(!melee_arc_hit(origin, facing, 28.0, 120.0, Vec2::new(-20.0, 0.0), 7.0));
        // 59 degrees off-axis is inside a 120 degree arc, 61 is not
        let inside = Vec2::from_angle(59f32.to_radians()) * 20.0;
        let outside = Vec2::from_angle(61f32.to_radians()) * 20.0;
        assert!(melee_arc_hit(origin, facing, 28.0, 120.0, inside, 0.0));
        assert!(!melee_arc_hit(origin, facing, 28.0, 120.0, outside, 0.0));
    }

    #[test]
    fn test_melee_range_includes_target_radius() {
        let facing = Vec2::new(0.0, 1.0);
        assert!(melee_arc_hit(Vec2::ZERO, facing, 28.0, 120.0, Vec2::new(0.0, 34.0), 7.0));
        assert!(!melee_arc_hit(Vec2::ZERO, facing, 28.0, 120.0, Vec2::new(0.0, 36.0), 7.0));
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);
    }
}
