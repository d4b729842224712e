//! Two-image polar-axis solver.
//!
//! Between two exposures taken at the same commanded declination the mount
//! performs a rigid rotation about its own polar axis, so both solved sky
//! positions stay at a fixed angular distance from that axis. The axis must
//! therefore lie on the great circle equidistant from the two positions, and
//! its location along that circle is pinned down by requiring the angle
//! swept around the candidate axis to match the mount-reported hour-angle
//! separation. That last condition is a transcendental equation in the
//! circle parameter, solved here by Newton-Raphson with a numerical
//! derivative.

use nalgebra::Vector3;

use crate::error::GeometryError;
use crate::spherical::{self, HOURS_TO_RADIANS};
use crate::types::{Observation, PoleOffset};
use crate::vector::try_unit;

/// Observation pairs closer than this (chord length) cannot define the
/// equidistant great circle.
const MIN_SEPARATION: f64 = 1e-9;

/// Derivatives flatter than this abort the Newton step.
const MIN_GRADIENT: f64 = 1e-300;

/// Solver for the mount-axis location from two baseline observations.
#[derive(Debug, Clone)]
pub struct PoleSolver {
    max_iterations: usize,
    derivative_step: f64,
    residual_tolerance: f64,
}

impl Default for PoleSolver {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            derivative_step: 1e-4,
            residual_tolerance: 1e-7,
        }
    }
}

/// A great circle on the unit sphere, stored as the rotation taking the
/// y-z unit circle onto it.
struct GreatCircle {
    sin_tilt: f64,
    cos_tilt: f64,
    sin_azimuth: f64,
    cos_azimuth: f64,
}

impl GreatCircle {
    /// The great circle whose plane is perpendicular to `direction`.
    fn perpendicular_to(direction: &Vector3<f64>) -> Self {
        let sin_tilt = direction.z;
        let cos_tilt = (1.0 - sin_tilt * sin_tilt).max(0.0).sqrt();
        let azimuth = direction.y.atan2(direction.x);
        Self {
            sin_tilt,
            cos_tilt,
            sin_azimuth: azimuth.sin(),
            cos_azimuth: azimuth.cos(),
        }
    }

    /// Point on the circle at parameter `phi`. `phi = 0` is the point
    /// nearest the +z pole.
    fn point_at(&self, phi: f64) -> Vector3<f64> {
        Vector3::new(
            -self.sin_tilt * self.cos_azimuth * phi.cos() - self.sin_azimuth * phi.sin(),
            -self.sin_tilt * self.sin_azimuth * phi.cos() + self.cos_azimuth * phi.sin(),
            self.cos_tilt * phi.cos(),
        )
    }
}

/// Cosine of the angle between `v1` and `v2` as swept around `axis`.
fn cos_separation_about(
    axis: &Vector3<f64>,
    v1: &Vector3<f64>,
    v2: &Vector3<f64>,
) -> Result<f64, GeometryError> {
    let a1 = try_unit(&axis.cross(v1))?;
    let a2 = try_unit(&axis.cross(v2))?;
    Ok(a1.dot(&a2))
}

impl PoleSolver {
    /// Create a solver with custom Newton-Raphson parameters.
    pub fn new(max_iterations: usize, derivative_step: f64, residual_tolerance: f64) -> Self {
        Self {
            max_iterations,
            derivative_step,
            residual_tolerance,
        }
    }

    /// Recover the mount-axis location from two baseline observations.
    pub fn solve(
        &self,
        first: &Observation,
        second: &Observation,
    ) -> Result<PoleOffset, GeometryError> {
        let v1 = spherical::unit_from_ha_dec(first.hour_angle_hours(), first.position.dec_degrees);
        let v2 =
            spherical::unit_from_ha_dec(second.hour_angle_hours(), second.position.dec_degrees);

        let difference = v2 - v1;
        let chord = difference.norm();
        if chord < MIN_SEPARATION {
            let separation_degrees = 2.0 * (chord / 2.0).asin().to_degrees();
            return Err(GeometryError::InsufficientSeparation { separation_degrees });
        }
        let circle = GreatCircle::perpendicular_to(&(difference / chord));

        // Angle the mount claims to have rotated between the two exposures.
        let reported_cos =
            ((first.telescope_ha_hours - second.telescope_ha_hours) * HOURS_TO_RADIANS).cos();

        let residual_at = |phi: f64| -> Result<f64, GeometryError> {
            Ok(cos_separation_about(&circle.point_at(phi), &v1, &v2)? - reported_cos)
        };

        // The axis sits near the pole, which is near phi = 0 by construction.
        let mut phi = 0.0;
        let mut residual = residual_at(phi)?;
        let mut iterations = 0;
        while residual.abs() > self.residual_tolerance {
            if iterations >= self.max_iterations {
                return Err(GeometryError::SolverDiverged {
                    iterations,
                    residual,
                });
            }
            let ahead = residual_at(phi + self.derivative_step)?;
            let behind = residual_at(phi - self.derivative_step)?;
            let gradient = (ahead - behind) / (2.0 * self.derivative_step);
            if !gradient.is_finite() || gradient.abs() < MIN_GRADIENT {
                return Err(GeometryError::SolverDiverged {
                    iterations,
                    residual,
                });
            }
            phi -= residual / gradient;
            residual = residual_at(phi)?;
            iterations += 1;
        }

        let axis = circle.point_at(phi);
        let (hour_angle_hours, axis_dec_degrees) = spherical::ha_dec_from_unit(&axis);
        Ok(PoleOffset {
            hour_angle_hours,
            declination_offset_degrees: 90.0 - axis_dec_degrees,
        })
    }
}
