//! Core coordinate types shared across the alignment math.

use serde::{Deserialize, Serialize};

use crate::spherical::{wrap_degrees, wrap_hours};

/// A plate-solved sky position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialPosition {
    /// Right ascension in hours. Treated modulo 24h wherever differences are taken.
    pub ra_hours: f64,
    /// Declination in degrees, in [-90, 90].
    pub dec_degrees: f64,
}

impl EquatorialPosition {
    /// Create a new equatorial position.
    pub fn new(ra_hours: f64, dec_degrees: f64) -> Self {
        Self {
            ra_hours,
            dec_degrees,
        }
    }
}

/// One captured-and-solved data point: the solved position plus the timing
/// keywords recorded with the image. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Plate-solved sky position.
    pub position: EquatorialPosition,
    /// Local sidereal time at capture, in hours.
    pub lst_hours: f64,
    /// Hour angle the mount reported at capture, in hours. Only the
    /// difference between two reports enters the pole solve, so a constant
    /// encoder offset cannot bias it.
    pub telescope_ha_hours: f64,
}

impl Observation {
    /// True hour angle of the solved position, derived from the sidereal
    /// time rather than the mount's self-report. Wrapped to (-12, 12].
    pub fn hour_angle_hours(&self) -> f64 {
        wrap_hours(self.lst_hours - self.position.ra_hours)
    }
}

/// A direction in the horizon frame.
///
/// Azimuth follows this system's (-180, 180] convention rather than
/// [0, 360), so clockwise-versus-counter-clockwise decisions are sign-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltAz {
    /// Altitude above the horizon, in degrees.
    pub altitude_degrees: f64,
    /// Azimuth in degrees, measured from north.
    pub azimuth_degrees: f64,
}

impl AltAz {
    /// Create a new altitude/azimuth pair.
    pub fn new(altitude_degrees: f64, azimuth_degrees: f64) -> Self {
        Self {
            altitude_degrees,
            azimuth_degrees,
        }
    }

    /// The same direction with azimuth wrapped into (-180, 180].
    pub fn normalized(self) -> Self {
        Self {
            altitude_degrees: self.altitude_degrees,
            azimuth_degrees: wrap_degrees(self.azimuth_degrees),
        }
    }
}

/// Offset of the mount's rotation axis from the assumed celestial pole,
/// expressed as an equatorial-style coordinate pair. Produced by
/// [`crate::PoleSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoleOffset {
    /// Hour angle of the mount axis, in hours.
    pub hour_angle_hours: f64,
    /// Angular distance of the axis from the north celestial pole, in
    /// degrees.
    pub declination_offset_degrees: f64,
}

impl PoleOffset {
    /// The equatorial declination the mount axis actually points at.
    pub fn axis_declination_degrees(&self) -> f64 {
        90.0 - self.declination_offset_degrees
    }
}

/// The physical two-axis correction to apply to the mount's polar-axis
/// adjustment hardware.
///
/// After hemisphere adjustment, positive tilt means "lower the axis" and
/// positive swing means "rotate counter-clockwise".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationOffset {
    /// Altitude-like correction in degrees.
    pub tilt_degrees: f64,
    /// Azimuth-like correction in degrees.
    pub swing_degrees: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalized_wraps_azimuth_only() {
        let position = AltAz::new(42.0, 270.0).normalized();
        assert_relative_eq!(position.altitude_degrees, 42.0);
        assert_relative_eq!(position.azimuth_degrees, -90.0);

        // 180 is inside the convention and must stay put
        let position = AltAz::new(10.0, 180.0).normalized();
        assert_relative_eq!(position.azimuth_degrees, 180.0);
    }

    #[test]
    fn observation_hour_angle_wraps_near_day_boundary() {
        let observation = Observation {
            position: EquatorialPosition::new(23.0, 60.0),
            lst_hours: 1.0,
            telescope_ha_hours: 2.0,
        };
        assert_relative_eq!(observation.hour_angle_hours(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn pole_offset_axis_declination() {
        let offset = PoleOffset {
            hour_angle_hours: 3.0,
            declination_offset_degrees: 1.25,
        };
        assert_relative_eq!(offset.axis_declination_degrees(), 88.75);
    }

    #[test]
    fn equatorial_position_serde_round_trip() {
        let position = EquatorialPosition::new(12.345, -30.5);
        let json = serde_json::to_string(&position).unwrap();
        let parsed: EquatorialPosition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, position);
    }
}
