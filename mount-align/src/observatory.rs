//! Equipment abstraction for the alignment session.
//!
//! All mount, camera and filter-wheel access goes through one trait so the
//! session logic can be driven by real equipment drivers or by the simulator
//! in [`crate::simulate`].

use pole_math::EquatorialPosition;

use crate::error::{EquipmentError, SolveError};

/// Observing-site report from the mount.
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub latitude_degrees: f64,
    pub longitude_degrees: f64,
    /// Local sidereal time in hours
    pub lst_hours: f64,
    /// Universal time in hours
    pub ut_hours: f64,
}

/// Timing keywords recorded with the most recent exposure.
#[derive(Debug, Clone, Copy)]
pub struct ImageTiming {
    /// Hour angle the mount reported at mid-exposure, in hours
    pub telescope_ha_hours: f64,
    /// Local sidereal time at mid-exposure, in hours
    pub lst_hours: f64,
}

/// Unified interface to the observatory equipment.
///
/// Connection is split per device so failures carry a device-specific
/// message. The session snapshots `binning` and `current_filter` before
/// changing them and restores both on every exit path.
pub trait Observatory: Send {
    fn connect_mount(&mut self) -> Result<(), EquipmentError>;
    fn connect_camera(&mut self) -> Result<(), EquipmentError>;
    fn connect_filter_wheel(&mut self) -> Result<(), EquipmentError>;

    /// Ensure the mount will accept slew commands.
    fn unpark(&mut self) -> Result<(), EquipmentError>;

    /// Current site coordinates and clocks from the mount.
    fn site(&mut self) -> Result<Site, EquipmentError>;

    fn slew_to(&mut self, ra_hours: f64, dec_degrees: f64) -> Result<(), EquipmentError>;

    /// Take one exposure at the given binning and wait for readout.
    fn expose(&mut self, exposure_seconds: f64, binning: u32) -> Result<(), EquipmentError>;

    /// Timing keywords of the most recent exposure.
    fn image_timing(&mut self) -> Result<ImageTiming, EquipmentError>;

    /// Plate-solve the most recent exposure.
    fn plate_solve(
        &mut self,
        scale_arcsec_per_pixel: f64,
    ) -> Result<EquatorialPosition, SolveError>;

    fn binning(&mut self) -> Result<u32, EquipmentError>;
    fn set_binning(&mut self, binning: u32) -> Result<(), EquipmentError>;

    /// Slot names of the filter wheel, in slot order.
    fn filter_names(&mut self) -> Result<Vec<String>, EquipmentError>;
    fn current_filter(&mut self) -> Result<usize, EquipmentError>;
    fn select_filter(&mut self, slot: usize) -> Result<(), EquipmentError>;
}
