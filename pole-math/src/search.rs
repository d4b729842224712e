//! Brute-force search for the tilt/swing rotation carrying one sky
//! direction onto another.
//!
//! The altitude and azimuth adjustment bolts of an equatorial mount act as
//! two successive rotations, a swing about the vertical followed by a tilt
//! about the east-west horizontal. Given where the polar axis currently
//! points and where it should point, this module scans that two-parameter
//! family for the best match: a coarse pass over the full mechanical range
//! of the bolts, then a fine pass around the coarse minimum.

use crate::types::{AltAz, RotationOffset};
use crate::vector::{rotate_alt_az, unit_from_alt_az};

const ARCSECONDS_PER_DEGREE: f64 = 3600.0;

/// Two-stage grid search over tilt/swing rotations.
#[derive(Debug, Clone)]
pub struct RotationSearch {
    coarse_step_degrees: f64,
    fine_step_degrees: f64,
    tilt_range_degrees: f64,
    swing_range_degrees: f64,
    fine_window_degrees: f64,
}

impl Default for RotationSearch {
    fn default() -> Self {
        Self {
            coarse_step_degrees: 0.1,
            fine_step_degrees: 10.0 / ARCSECONDS_PER_DEGREE,
            tilt_range_degrees: 10.0,
            swing_range_degrees: 25.0,
            fine_window_degrees: 0.2,
        }
    }
}

impl RotationSearch {
    /// Find the tilt/swing pair that best carries `from` onto `to`.
    ///
    /// The fine pass resolves to `fine_step_degrees`, 10 arcseconds by
    /// default. Targets outside the scanned range saturate at the range
    /// boundary rather than failing.
    pub fn solve(&self, from: &AltAz, to: &AltAz) -> RotationOffset {
        let source = unit_from_alt_az(from);
        let target = unit_from_alt_az(to);

        let coarse = scan(
            &source,
            &target,
            RotationOffset {
                tilt_degrees: 0.0,
                swing_degrees: 0.0,
            },
            self.tilt_range_degrees,
            self.swing_range_degrees,
            self.coarse_step_degrees,
        );
        scan(
            &source,
            &target,
            coarse,
            self.fine_window_degrees,
            self.fine_window_degrees,
            self.fine_step_degrees,
        )
    }
}

/// Exhaustive grid scan centred on `center`, returning the offset whose
/// rotated source has the largest dot product with the target. Ties keep
/// the earliest grid point.
fn scan(
    source: &nalgebra::Vector3<f64>,
    target: &nalgebra::Vector3<f64>,
    center: RotationOffset,
    tilt_half_width: f64,
    swing_half_width: f64,
    step: f64,
) -> RotationOffset {
    let tilt_steps = (tilt_half_width / step).round() as i64;
    let swing_steps = (swing_half_width / step).round() as i64;

    let mut best = center;
    let mut best_alignment = f64::NEG_INFINITY;
    for i in -tilt_steps..=tilt_steps {
        let tilt = center.tilt_degrees + i as f64 * step;
        for j in -swing_steps..=swing_steps {
            let swing = center.swing_degrees + j as f64 * step;
            let alignment = rotate_alt_az(source, tilt, swing).dot(target);
            if alignment > best_alignment {
                best_alignment = alignment;
                best = RotationOffset {
                    tilt_degrees: tilt,
                    swing_degrees: swing,
                };
            }
        }
    }
    best
}
