//! Unit-vector helpers and the swing-then-tilt rotation operator.
//!
//! Directions are unit vectors with x toward azimuth 90, y toward azimuth 0
//! (the meridian), and z toward the zenith or pole depending on the frame.
//! The same component layout serves both the horizon frame and the
//! pole-aligned equatorial frame.

use nalgebra::Vector3;

use crate::error::GeometryError;
use crate::spherical::wrap_degrees;
use crate::types::AltAz;

/// Norms below this are considered zero for normalization purposes.
const NORM_EPSILON: f64 = 1e-12;

/// Unit vector in the direction of an altitude/azimuth pair.
pub fn unit_from_alt_az(position: &AltAz) -> Vector3<f64> {
    let alt = position.altitude_degrees.to_radians();
    let az = position.azimuth_degrees.to_radians();
    Vector3::new(alt.cos() * az.sin(), alt.cos() * az.cos(), alt.sin())
}

/// Altitude/azimuth of a unit vector, azimuth in (-180, 180].
pub fn alt_az_from_unit(v: &Vector3<f64>) -> AltAz {
    AltAz {
        altitude_degrees: v.z.clamp(-1.0, 1.0).asin().to_degrees(),
        azimuth_degrees: wrap_degrees(v.x.atan2(v.y).to_degrees()),
    }
}

/// Rotate `v` by `swing_degrees` counter-clockwise about the Z axis, then by
/// `tilt_degrees` about the X axis.
///
/// The composition order is load-bearing: swing first models rotating the
/// whole mount in azimuth, tilt second models tipping the polar axis. With
/// the axis's alt/az offset from the pole as input, this carries the
/// telescope axis back onto the pole.
pub fn rotate_alt_az(v: &Vector3<f64>, tilt_degrees: f64, swing_degrees: f64) -> Vector3<f64> {
    let tilt = tilt_degrees.to_radians();
    let swing = swing_degrees.to_radians();

    let swung = Vector3::new(
        swing.cos() * v.x - swing.sin() * v.y,
        swing.sin() * v.x + swing.cos() * v.y,
        v.z,
    );

    Vector3::new(
        swung.x,
        tilt.cos() * swung.y + tilt.sin() * swung.z,
        -tilt.sin() * swung.y + tilt.cos() * swung.z,
    )
}

/// Unit vector in the direction of `v`, or an error if `v` is too short to
/// carry a direction.
pub fn try_unit(v: &Vector3<f64>) -> Result<Vector3<f64>, GeometryError> {
    let norm = v.norm();
    if norm < NORM_EPSILON {
        return Err(GeometryError::DegenerateVector { norm });
    }
    Ok(v / norm)
}
