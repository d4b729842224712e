use serde::{Deserialize, Serialize};

/// Configuration for a polar alignment session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Declination both baseline points are slewed to, in degrees
    pub declination_degrees: f64,
    /// Hour angle of the first baseline point, in hours
    pub first_hour_angle_hours: f64,
    /// Hour angle of the second baseline point, in hours
    pub second_hour_angle_hours: f64,
    /// Exposure length per image, in seconds
    pub exposure_seconds: f64,
    /// Camera binning used for alignment images
    pub binning: u32,
    /// Image scale handed to the plate solver, in arcsec per pixel
    pub solve_scale_arcsec_per_pixel: f64,
    /// Filter to select by name, if the setup has a filter wheel
    pub filter: Option<String>,
    /// Cap on refinement iterations; `None` refines until cancelled
    pub refine_limit: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            declination_degrees: 60.0,
            first_hour_angle_hours: 1.0,
            second_hour_angle_hours: 5.0,
            exposure_seconds: 4.0,
            binning: 4,
            solve_scale_arcsec_per_pixel: 6.872,
            filter: None,
            refine_limit: None,
        }
    }
}
