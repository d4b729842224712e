//! Conversions between equatorial and horizon coordinates, and the angle
//! arithmetic around sidereal time.
//!
//! Hour angles are normalized to (-12, 12] everywhere they are derived, so
//! behavior is continuous across the 24h boundary.

use nalgebra::Vector3;

use crate::types::AltAz;

/// Radians per hour of hour angle.
pub const HOURS_TO_RADIANS: f64 = std::f64::consts::PI / 12.0;

/// Hours of hour angle per radian.
pub const RADIANS_TO_HOURS: f64 = 12.0 / std::f64::consts::PI;

/// Wrap an hour quantity into (-12, 12].
pub fn wrap_hours(hours: f64) -> f64 {
    let wrapped = hours.rem_euclid(24.0);
    if wrapped > 12.0 {
        wrapped - 24.0
    } else {
        wrapped
    }
}

/// Wrap a degree quantity into (-180, 180].
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Hour angle of a position with right ascension `ra_hours` at sidereal time
/// `lst_hours`, wrapped to (-12, 12].
pub fn hour_angle_from_ra_lst(ra_hours: f64, lst_hours: f64) -> f64 {
    wrap_hours(lst_hours - ra_hours)
}

/// Unit vector of an hour-angle/declination pair in the pole-aligned frame
/// (Z toward the north celestial pole, Y along the meridian, X toward the
/// horizon perpendicular to both).
pub fn unit_from_ha_dec(ha_hours: f64, dec_degrees: f64) -> Vector3<f64> {
    let ha = ha_hours * HOURS_TO_RADIANS;
    let dec = dec_degrees.to_radians();
    Vector3::new(dec.cos() * ha.sin(), dec.cos() * ha.cos(), dec.sin())
}

/// Hour angle (hours) and declination (degrees) of a unit vector in the
/// pole-aligned frame.
pub fn ha_dec_from_unit(v: &Vector3<f64>) -> (f64, f64) {
    let ha = v.x.atan2(v.y) * RADIANS_TO_HOURS;
    let dec = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    (ha, dec)
}

/// The equatorial/horizon coordinate swap in radians.
///
/// The relation between (hour angle, declination) and (azimuth, altitude)
/// at a given latitude is an involution: the same formula converts in both
/// directions, and applying it twice returns the input.
fn swap_frames(x: f64, y: f64, lat: f64) -> (f64, f64) {
    let y2 = (y.sin() * lat.sin() + y.cos() * lat.cos() * x.cos())
        .clamp(-1.0, 1.0)
        .asin();
    let x2 = (-y.cos() * lat.cos() * x.sin()).atan2(y.sin() - lat.sin() * y2.sin());
    (x2, y2)
}

/// Altitude/azimuth of an hour-angle/declination pair at the given latitude.
///
/// Azimuth comes straight from the two-argument arctangent; callers apply
/// [`AltAz::normalized`] where the (-180, 180] convention matters.
pub fn alt_az_from_ha_dec_lat(ha_hours: f64, dec_degrees: f64, lat_degrees: f64) -> AltAz {
    let (az, alt) = swap_frames(
        ha_hours * HOURS_TO_RADIANS,
        dec_degrees.to_radians(),
        lat_degrees.to_radians(),
    );
    AltAz {
        altitude_degrees: alt.to_degrees(),
        azimuth_degrees: az.to_degrees(),
    }
}

/// Hour angle (hours) and declination (degrees) of a horizon-frame
/// direction at the given latitude. Inverse of [`alt_az_from_ha_dec_lat`].
pub fn ha_dec_from_alt_az_lat(position: &AltAz, lat_degrees: f64) -> (f64, f64) {
    let (ha, dec) = swap_frames(
        position.azimuth_degrees.to_radians(),
        position.altitude_degrees.to_radians(),
        lat_degrees.to_radians(),
    );
    (ha * RADIANS_TO_HOURS, dec.to_degrees())
}
