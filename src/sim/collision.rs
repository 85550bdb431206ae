//! Overlap tests used to produce contact results
//!
//! Collision *resolution* belongs to the physics collaborator. The simulation
//! only needs to know which shapes touched this tick.

use glam::Vec2;

/// Circle-vs-circle overlap (touching counts)
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) <= r * r
}

/// Closest point to `p` on the segment `start..end`
pub fn closest_point_on_segment(p: Vec2, start: Vec2, end: Vec2) -> Vec2 {
    let seg = end - start;
    let len_sq = seg.length_squared();
    if len_sq <= f32::EPSILON {
        return start;
    }
    let t = ((p - start).dot(seg) / len_sq).clamp(0.0, 1.0);
    start + seg * t
}

/// Capsule (segment with half-width) vs circle
pub fn capsule_circle_overlap(start: Vec2, end: Vec2, half_width: f32, center: Vec2, radius: f32) -> bool {
    let closest = closest_point_on_segment(center, start, end);
    circles_overlap(closest, half_width, center, radius)
}

/// Reflect velocity off a surface with the given normal
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
