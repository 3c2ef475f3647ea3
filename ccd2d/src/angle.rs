//! Degree helpers shared by the chain model and the solver.
//!
//! Angles are degrees everywhere in the public surface. `0°` points along `+x` and angles grow
//! counter-clockwise.

use glam::Vec2;

/// Normalizes `degrees` into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Maps `degrees` onto the equivalent rotation in `(-180, 180]`.
pub fn shortest_rotation(degrees: f32) -> f32 {
    let degrees = normalize_degrees(degrees);
    if degrees > 180.0 {
        degrees - 360.0
    } else {
        degrees
    }
}

/// Unit vector pointing along `degrees`.
pub fn direction(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}
