//! Simulated observatory with a configurable polar-axis error.
//!
//! Models a rigid equatorial mount whose polar axis misses the pole by a
//! chosen altitude/azimuth offset: slews land where the mount thinks they
//! should in its own frame, plate solves report where the sky actually is,
//! and a sidereal clock advances with every operation. Used by the CLI for
//! dry runs and by the integration tests.

use std::collections::HashSet;

use nalgebra::Vector3;

use pole_math::spherical::{ha_dec_from_alt_az_lat, ha_dec_from_unit, unit_from_ha_dec, wrap_hours};
use pole_math::{AltAz, EquatorialPosition};

use crate::error::{EquipmentError, SolveError};
use crate::observatory::{ImageTiming, Observatory, Site};

/// Sidereal seconds per UT second.
const SIDEREAL_RATE: f64 = 1.002_737_9;

/// Wall-clock cost charged per slew, in seconds.
const SLEW_SECONDS: f64 = 15.0;

/// Readout overhead charged per exposure, in seconds.
const READOUT_SECONDS: f64 = 2.0;

pub struct SimulatedObservatory {
    latitude_degrees: f64,
    longitude_degrees: f64,
    /// Mount frame axes expressed in the sky HA/Dec frame
    mount_x: Vector3<f64>,
    mount_y: Vector3<f64>,
    mount_z: Vector3<f64>,
    start_lst_hours: f64,
    start_ut_hours: f64,
    elapsed_seconds: f64,
    /// Commanded pointing of the last slew
    commanded: Option<EquatorialPosition>,
    last_timing: Option<ImageTiming>,
    binning: u32,
    filters: Vec<String>,
    filter_slot: usize,
    mount_offline: bool,
    mount_connected: bool,
    camera_connected: bool,
    wheel_connected: bool,
    /// 1-based exposure indices whose plate solve will fail
    solve_failures: HashSet<usize>,
    exposures_taken: usize,
    solves_attempted: usize,
}

impl SimulatedObservatory {
    /// A mount at the given site whose polar axis sits `alt_error_degrees`
    /// above and `az_error_degrees` east of the pole.
    pub fn new(
        latitude_degrees: f64,
        longitude_degrees: f64,
        alt_error_degrees: f64,
        az_error_degrees: f64,
    ) -> Self {
        let axis = AltAz::new(latitude_degrees + alt_error_degrees, az_error_degrees);
        let (axis_ha, axis_dec) = ha_dec_from_alt_az_lat(&axis, latitude_degrees);
        let mount_z = unit_from_ha_dec(axis_ha, axis_dec);
        let rejected = Vector3::y() - mount_z * Vector3::y().dot(&mount_z);
        let mount_y = rejected / rejected.norm();
        let mount_x = mount_y.cross(&mount_z);

        Self {
            latitude_degrees,
            longitude_degrees,
            mount_x,
            mount_y,
            mount_z,
            start_lst_hours: 0.0,
            start_ut_hours: 0.0,
            elapsed_seconds: 0.0,
            commanded: None,
            last_timing: None,
            binning: 1,
            filters: vec![
                "Luminance".to_string(),
                "Red".to_string(),
                "Green".to_string(),
                "Blue".to_string(),
            ],
            filter_slot: 0,
            mount_offline: false,
            mount_connected: false,
            camera_connected: false,
            wheel_connected: false,
            solve_failures: HashSet::new(),
            exposures_taken: 0,
            solves_attempted: 0,
        }
    }

    pub fn with_initial_lst(mut self, lst_hours: f64) -> Self {
        self.start_lst_hours = lst_hours;
        self
    }

    /// Fail the plate solve of the given 1-based exposure indices.
    pub fn with_solve_failures(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.solve_failures = indices.into_iter().collect();
        self
    }

    pub fn with_filters(mut self, names: Vec<String>) -> Self {
        self.filters = names;
        self
    }

    /// Make mount connection fail, as if the driver were not running.
    pub fn with_mount_offline(mut self) -> Self {
        self.mount_offline = true;
        self
    }

    pub fn camera_binning(&self) -> u32 {
        self.binning
    }

    pub fn selected_filter(&self) -> usize {
        self.filter_slot
    }

    pub fn exposures_taken(&self) -> usize {
        self.exposures_taken
    }

    pub fn solves_attempted(&self) -> usize {
        self.solves_attempted
    }

    fn lst_hours(&self) -> f64 {
        (self.start_lst_hours + self.elapsed_seconds * SIDEREAL_RATE / 3600.0).rem_euclid(24.0)
    }

    fn require_mount(&self) -> Result<(), EquipmentError> {
        if self.mount_connected {
            Ok(())
        } else {
            Err(EquipmentError::CommandFailed {
                operation: "mount command".to_string(),
                reason: "mount not connected".to_string(),
            })
        }
    }

    fn require_wheel(&self) -> Result<(), EquipmentError> {
        if self.wheel_connected {
            Ok(())
        } else {
            Err(EquipmentError::CommandFailed {
                operation: "filter wheel command".to_string(),
                reason: "filter wheel not connected".to_string(),
            })
        }
    }

    fn require_camera(&self) -> Result<(), EquipmentError> {
        if self.camera_connected {
            Ok(())
        } else {
            Err(EquipmentError::CommandFailed {
                operation: "camera command".to_string(),
                reason: "camera not connected".to_string(),
            })
        }
    }

}

impl Observatory for SimulatedObservatory {
    fn connect_mount(&mut self) -> Result<(), EquipmentError> {
        if self.mount_offline {
            return Err(EquipmentError::ConnectFailed {
                device: "mount".to_string(),
                reason: "driver not responding".to_string(),
            });
        }
        self.mount_connected = true;
        Ok(())
    }

    fn connect_camera(&mut self) -> Result<(), EquipmentError> {
        self.camera_connected = true;
        Ok(())
    }

    fn connect_filter_wheel(&mut self) -> Result<(), EquipmentError> {
        self.wheel_connected = true;
        Ok(())
    }

    fn unpark(&mut self) -> Result<(), EquipmentError> {
        self.require_mount()
    }

    fn site(&mut self) -> Result<Site, EquipmentError> {
        self.require_mount()?;
        Ok(Site {
            latitude_degrees: self.latitude_degrees,
            longitude_degrees: self.longitude_degrees,
            lst_hours: self.lst_hours(),
            ut_hours: (self.start_ut_hours + self.elapsed_seconds / 3600.0).rem_euclid(24.0),
        })
    }

    fn slew_to(&mut self, ra_hours: f64, dec_degrees: f64) -> Result<(), EquipmentError> {
        self.require_mount()?;
        self.elapsed_seconds += SLEW_SECONDS;
        self.commanded = Some(EquatorialPosition::new(ra_hours, dec_degrees));
        Ok(())
    }

    fn expose(&mut self, exposure_seconds: f64, binning: u32) -> Result<(), EquipmentError> {
        self.require_camera()?;
        self.binning = binning;

        // Keywords are stamped at mid-exposure
        self.elapsed_seconds += exposure_seconds / 2.0;
        let lst = self.lst_hours();
        let commanded = self.commanded.ok_or_else(|| EquipmentError::CommandFailed {
            operation: "exposure".to_string(),
            reason: "no slew commanded".to_string(),
        })?;
        self.last_timing = Some(ImageTiming {
            telescope_ha_hours: wrap_hours(lst - commanded.ra_hours),
            lst_hours: lst,
        });
        self.elapsed_seconds += exposure_seconds / 2.0 + READOUT_SECONDS;
        self.exposures_taken += 1;
        Ok(())
    }

    fn image_timing(&mut self) -> Result<ImageTiming, EquipmentError> {
        self.last_timing.ok_or_else(|| EquipmentError::CommandFailed {
            operation: "image timing query".to_string(),
            reason: "no exposure taken".to_string(),
        })
    }

    fn plate_solve(
        &mut self,
        _scale_arcsec_per_pixel: f64,
    ) -> Result<EquatorialPosition, SolveError> {
        self.solves_attempted += 1;
        if self.solve_failures.contains(&self.exposures_taken) {
            return Err(SolveError::PlateSolve("no star match".to_string()));
        }
        // The solved position belongs to the exposure, not to now; shift
        // back to the mid-exposure clock for the computation.
        let timing = self.image_timing().map_err(SolveError::Hardware)?;
        let commanded = self
            .commanded
            .ok_or_else(|| {
                SolveError::Hardware(EquipmentError::CommandFailed {
                    operation: "plate solve".to_string(),
                    reason: "no slew commanded".to_string(),
                })
            })?;
        let u = unit_from_ha_dec(timing.telescope_ha_hours, commanded.dec_degrees);
        let w = self.mount_x * u.x + self.mount_y * u.y + self.mount_z * u.z;
        let (true_ha, true_dec) = ha_dec_from_unit(&w);
        let ra_hours = (timing.lst_hours - true_ha).rem_euclid(24.0);
        Ok(EquatorialPosition::new(ra_hours, true_dec))
    }

    fn binning(&mut self) -> Result<u32, EquipmentError> {
        self.require_camera()?;
        Ok(self.binning)
    }

    fn set_binning(&mut self, binning: u32) -> Result<(), EquipmentError> {
        self.require_camera()?;
        self.binning = binning;
        Ok(())
    }

    fn filter_names(&mut self) -> Result<Vec<String>, EquipmentError> {
        self.require_wheel()?;
        Ok(self.filters.clone())
    }

    fn current_filter(&mut self) -> Result<usize, EquipmentError> {
        self.require_wheel()?;
        Ok(self.filter_slot)
    }

    fn select_filter(&mut self, slot: usize) -> Result<(), EquipmentError> {
        self.require_wheel()?;
        if slot >= self.filters.len() {
            return Err(EquipmentError::CommandFailed {
                operation: "filter selection".to_string(),
                reason: format!("slot {slot} out of range"),
            });
        }
        self.filter_slot = slot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn connected(mut sim: SimulatedObservatory) -> SimulatedObservatory {
        sim.connect_mount().unwrap();
        sim.connect_camera().unwrap();
        sim
    }

    #[test]
    fn aligned_mount_solves_where_commanded() {
        let mut sim = connected(SimulatedObservatory::new(50.0, -3.0, 0.0, 0.0));
        sim.slew_to(20.0, 60.0).unwrap();
        sim.expose(4.0, 4).unwrap();
        let solved = sim.plate_solve(6.872).unwrap();

        // Perfect axis: reported and true pointing agree
        assert_relative_eq!(solved.ra_hours, 20.0, epsilon = 1e-9);
        assert_relative_eq!(solved.dec_degrees, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn axis_error_shifts_the_solved_position() {
        let mut sim = connected(SimulatedObservatory::new(50.0, -3.0, 0.7, -1.2));
        sim.slew_to(20.0, 60.0).unwrap();
        sim.expose(4.0, 4).unwrap();
        let solved = sim.plate_solve(6.872).unwrap();

        let separation = (solved.ra_hours - 20.0).abs() + (solved.dec_degrees - 60.0).abs();
        assert!(separation > 0.01, "axis error should move the solve");
    }

    #[test]
    fn sidereal_clock_advances_with_operations() {
        let mut sim = connected(SimulatedObservatory::new(50.0, -3.0, 0.0, 0.0).with_initial_lst(6.0));
        let before = sim.site().unwrap().lst_hours;
        sim.slew_to(4.0, 60.0).unwrap();
        sim.expose(4.0, 4).unwrap();
        let after = sim.site().unwrap().lst_hours;
        assert!(after > before);
        assert!(after - before < 0.1);
    }

    #[test]
    fn injected_solve_failures_hit_the_right_exposure() {
        let mut sim = connected(
            SimulatedObservatory::new(50.0, -3.0, 0.0, 0.0).with_solve_failures([2]),
        );
        sim.slew_to(20.0, 60.0).unwrap();
        sim.expose(4.0, 4).unwrap();
        assert!(sim.plate_solve(6.872).is_ok());
        sim.expose(4.0, 4).unwrap();
        assert!(matches!(
            sim.plate_solve(6.872),
            Err(SolveError::PlateSolve(_))
        ));
    }
}
