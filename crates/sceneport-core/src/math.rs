//! Coordinate conversion, rounding and name sanitizing
//!
//! The host scene is right-handed Z-up; the viewer is right-handed Y-up.
//! Every vector that ends up in the JSON document goes through [`remap`],
//! which swaps the axes and rounds each component to [`DECIMALS`] places.

use glam::{DMat3, DQuat, DVec3, EulerRot};

/// Number of decimal places kept in emitted numbers
pub const DECIMALS: usize = 4;

/// Round to [`DECIMALS`] places, normalizing negative zero
///
/// Rounds the exact stored value (ties to even), so `0.00035`, which is
/// stored just below the tie, becomes `0.0003`. Scaling by `10^4` first
/// would round the inexact product instead.
pub fn round4(value: f64) -> f64 {
    let rounded = format!("{:.*}", DECIMALS, value)
        .parse::<f64>()
        .unwrap_or(value);
    // Adding +0.0 turns -0.0 into 0.0 and leaves everything else unchanged
    rounded + 0.0
}

/// Replace every space and hyphen with an underscore
pub fn safe_name(name: &str) -> String {
    name.replace([' ', '-'], "_")
}

/// Convert a Z-up vector to Y-up: `(x, y, z) -> (x, z, -y)`
pub fn z_up_to_y_up(v: DVec3) -> DVec3 {
    DVec3::new(v.x, v.z, -v.y)
}

/// Convert a Z-up rotation to Y-up
///
/// The basis change is a proper rotation, so the quaternion's vector part
/// maps exactly like a point.
pub fn quat_z_up_to_y_up(q: DQuat) -> DQuat {
    DQuat::from_xyzw(q.x, q.z, -q.y, q.w)
}

/// Axis-remap and round a vector for emission
pub fn remap(v: DVec3) -> [f64; 3] {
    let v = z_up_to_y_up(v);
    [round4(v.x), round4(v.y), round4(v.z)]
}

/// Rotation for host XYZ Euler angles (X applied first, then Y, then Z)
pub fn euler_rotation(euler: DVec3) -> DQuat {
    DQuat::from_euler(EulerRot::ZYX, euler.z, euler.y, euler.x)
}

/// Point one unit along the object's local -Z axis, in host space
///
/// Used as the aim point of a spot light that has no tracking constraint.
pub fn forward_target(location: DVec3, euler: DVec3) -> DVec3 {
    location + DMat3::from_quat(euler_rotation(euler)) * DVec3::NEG_Z
}

/// First three channels of an RGBA color, rounded
pub fn rgb_rounded(rgba: [f64; 4]) -> [f64; 3] {
    [round4(rgba[0]), round4(rgba[1]), round4(rgba[2])]
}
