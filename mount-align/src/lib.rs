//! Polar alignment session control for equatorial mounts.
//!
//! Drives a full alignment run against an [`Observatory`]: slew to two
//! baseline points, plate-solve both, recover the mount-axis error with
//! `pole_math`, then image repeatedly while the operator turns the altitude
//! and azimuth bolts, reporting the remaining correction after every image.
//! Progress streams over a channel as [`SessionEvent`]s; a shared
//! [`CancelToken`] stops the run cleanly at the next step boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};

use pole_math::spherical::{alt_az_from_ha_dec_lat, ha_dec_from_alt_az_lat, wrap_hours};
use pole_math::vector::{alt_az_from_unit, rotate_alt_az, unit_from_alt_az};
use pole_math::{
    format_degrees, format_hours, EquatorialPosition, Observation, PoleSolver, RotationOffset,
    RotationSearch,
};

pub mod config;
pub mod error;
pub mod event;
pub mod observatory;
pub mod simulate;
pub mod state;

pub use crate::config::SessionConfig;
pub use crate::error::{AlignmentError, EquipmentError, SolveError};
pub use crate::event::SessionEvent;
pub use crate::observatory::{ImageTiming, Observatory, Site};
pub use crate::state::SessionState;

/// Shared flag requesting a clean stop at the next step boundary.
///
/// Never polled mid-exposure or mid-solve, so cancellation latency is one
/// equipment operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a session ended when no hard error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The refinement limit was reached
    Completed,
    /// Cancellation was observed at a step boundary
    Cancelled,
}

/// Equipment settings captured before the run, restored on every exit.
struct EquipmentSnapshot {
    binning: u32,
    filter_slot: Option<usize>,
}

/// Sky location the second image would occupy under a perfectly aligned
/// mount, used as the refinement target. The target hour angle advances
/// with sidereal time.
struct BaselineTarget {
    target_ha_hours: f64,
    target_dec_degrees: f64,
    baseline_lst_hours: f64,
}

/// Polar alignment session state machine
pub struct AlignmentSession<O: Observatory> {
    config: SessionConfig,
    observatory: O,
    events: Sender<SessionEvent>,
    cancel: CancelToken,
    state: SessionState,
    solver: PoleSolver,
    search: RotationSearch,
}

impl<O: Observatory> AlignmentSession<O> {
    pub fn new(
        config: SessionConfig,
        observatory: O,
        events: Sender<SessionEvent>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            config,
            observatory,
            events,
            cancel,
            state: SessionState::Idle,
            solver: PoleSolver::default(),
            search: RotationSearch::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn observatory(&self) -> &O {
        &self.observatory
    }

    /// Run the session to completion, cancellation or failure.
    ///
    /// Equipment settings changed by the run (binning, filter) are restored
    /// on every exit path once the snapshot has been taken.
    pub fn run(&mut self) -> Result<SessionOutcome, AlignmentError> {
        let result = self.run_connected();
        match &result {
            Ok(SessionOutcome::Completed) => {
                self.state = SessionState::Completed;
            }
            Ok(SessionOutcome::Cancelled) => {
                // State already moved to Stopping when the flag was seen
            }
            Err(error) => {
                warn!("Polar alignment session failed: {error}");
                self.emit(SessionEvent::Error(error.to_string()));
                self.state = SessionState::Failed;
            }
        }
        result
    }

    fn run_connected(&mut self) -> Result<SessionOutcome, AlignmentError> {
        self.state = SessionState::Connecting;
        self.connect()?;

        let snapshot = self.capture_equipment_state()?;
        let outcome = self
            .select_configured_filter()
            .and_then(|()| self.align());
        self.restore_equipment_state(&snapshot);
        outcome
    }

    fn connect(&mut self) -> Result<(), AlignmentError> {
        info!("Connecting to observatory equipment");
        self.observatory.connect_mount()?;
        self.observatory.connect_camera()?;
        if self.config.filter.is_some() {
            self.observatory.connect_filter_wheel()?;
        }
        Ok(())
    }

    fn capture_equipment_state(&mut self) -> Result<EquipmentSnapshot, AlignmentError> {
        let binning = self.observatory.binning()?;
        let filter_slot = if self.config.filter.is_some() {
            Some(self.observatory.current_filter()?)
        } else {
            None
        };
        Ok(EquipmentSnapshot {
            binning,
            filter_slot,
        })
    }

    fn select_configured_filter(&mut self) -> Result<(), AlignmentError> {
        let Some(name) = self.config.filter.clone() else {
            return Ok(());
        };
        let names = self.observatory.filter_names()?;
        let slot = names
            .iter()
            .position(|candidate| candidate == &name)
            .ok_or_else(|| AlignmentError::FilterNotFound(name.clone()))?;
        info!("Selecting filter {name} in slot {slot}");
        self.observatory.select_filter(slot)?;
        Ok(())
    }

    fn restore_equipment_state(&mut self, snapshot: &EquipmentSnapshot) {
        if let Err(error) = self.observatory.set_binning(snapshot.binning) {
            warn!("Could not restore camera binning: {error}");
        }
        if let Some(slot) = snapshot.filter_slot {
            if let Err(error) = self.observatory.select_filter(slot) {
                warn!("Could not restore filter slot {slot}: {error}");
            }
        }
    }

    fn align(&mut self) -> Result<SessionOutcome, AlignmentError> {
        let site = self.observatory.site()?;
        let latitude = site.latitude_degrees;

        if self.cancelled() {
            return Ok(SessionOutcome::Cancelled);
        }
        let Some((first_timing, first_position)) = self.baseline_point(
            1,
            site.lst_hours,
            self.config.first_hour_angle_hours,
            SessionState::SlewingPoint1,
            SessionState::ImagingPoint1,
            SessionState::SolvingPoint1,
        )?
        else {
            return Ok(SessionOutcome::Cancelled);
        };

        // LST has advanced during the first exposure; reread it so the
        // second slew lands at the commanded hour angle.
        let site = self.observatory.site()?;
        if self.cancelled() {
            return Ok(SessionOutcome::Cancelled);
        }
        let Some((second_timing, second_position)) = self.baseline_point(
            2,
            site.lst_hours,
            self.config.second_hour_angle_hours,
            SessionState::SlewingPoint2,
            SessionState::ImagingPoint2,
            SessionState::SolvingPoint2,
        )?
        else {
            return Ok(SessionOutcome::Cancelled);
        };

        if self.cancelled() {
            return Ok(SessionOutcome::Cancelled);
        }
        let baseline = self.compute_baseline(
            latitude,
            &Observation {
                position: first_position,
                lst_hours: first_timing.lst_hours,
                telescope_ha_hours: first_timing.telescope_ha_hours,
            },
            &Observation {
                position: second_position,
                lst_hours: second_timing.lst_hours,
                telescope_ha_hours: second_timing.telescope_ha_hours,
            },
        )?;

        self.refine(latitude, &baseline)
    }

    /// Slew to one baseline point, expose and plate-solve it.
    ///
    /// Cancellation is checked between the slew, the exposure and the
    /// solve; `Ok(None)` means the run was cancelled. A solve failure here
    /// is fatal: without both baseline images there is no axis solution.
    fn baseline_point(
        &mut self,
        point: u8,
        lst_hours: f64,
        hour_angle_hours: f64,
        slewing: SessionState,
        imaging: SessionState,
        solving: SessionState,
    ) -> Result<Option<(ImageTiming, EquatorialPosition)>, AlignmentError> {
        let ra_hours = (lst_hours - hour_angle_hours).rem_euclid(24.0);

        self.state = slewing;
        self.emit_info(format!("Slewing to alignment point {point}"));
        if point == 1 {
            self.observatory.unpark()?;
        }
        self.observatory
            .slew_to(ra_hours, self.config.declination_degrees)?;

        if self.cancelled() {
            return Ok(None);
        }
        self.state = imaging;
        self.emit_info(format!("Taking image {point}"));
        self.observatory
            .expose(self.config.exposure_seconds, self.config.binning)?;

        if self.cancelled() {
            return Ok(None);
        }
        self.state = solving;
        let timing = self.observatory.image_timing()?;
        self.emit_info(format!(
            "Image HA: {} LST: {}",
            format_hours(timing.telescope_ha_hours),
            format_hours(timing.lst_hours)
        ));

        let position = self
            .observatory
            .plate_solve(self.config.solve_scale_arcsec_per_pixel)
            .map_err(|source| AlignmentError::BaselineSolve { point, source })?;
        self.emit_info(format!(
            "Solved image RA: {} and Dec: {}",
            format_hours(position.ra_hours),
            format_degrees(position.dec_degrees)
        ));

        Ok(Some((timing, position)))
    }

    /// Solve for the axis, report the first correction and build the
    /// refinement target from the second image.
    fn compute_baseline(
        &mut self,
        latitude: f64,
        first: &Observation,
        second: &Observation,
    ) -> Result<BaselineTarget, AlignmentError> {
        self.state = SessionState::ComputingBaseline;

        let offset = self.solver.solve(first, second)?;
        let axis = alt_az_from_ha_dec_lat(
            offset.hour_angle_hours,
            offset.axis_declination_degrees(),
            latitude,
        )
        .normalized();

        self.emit_info(format!(
            "Polar axis Alt: {} Az: {}",
            format_degrees(axis.altitude_degrees),
            format_degrees(axis.azimuth_degrees)
        ));
        self.emit_info(format!(
            "Alt change: {} Az change: {}",
            format_degrees(axis.altitude_degrees - latitude),
            format_degrees(axis.azimuth_degrees)
        ));

        // Where the second image actually is, by the solved coordinates
        let image_ha = wrap_hours(second.lst_hours - second.position.ra_hours);
        let image =
            alt_az_from_ha_dec_lat(image_ha, second.position.dec_degrees, latitude).normalized();

        // Where it would be if the axis sat exactly on the pole: undo the
        // axis error by rotating through it
        let target = alt_az_from_unit(&rotate_alt_az(
            &unit_from_alt_az(&image),
            axis.altitude_degrees - latitude,
            axis.azimuth_degrees,
        ))
        .normalized();
        let (target_ha_hours, target_dec_degrees) = ha_dec_from_alt_az_lat(&target, latitude);

        let rotation = self.search.solve(&image, &target);
        self.report_adjustment(latitude, rotation);

        Ok(BaselineTarget {
            target_ha_hours,
            target_dec_degrees,
            baseline_lst_hours: second.lst_hours,
        })
    }

    /// Image repeatedly while the operator adjusts the bolts.
    ///
    /// The mount-reported hour angle is not trusted here: the bolts move the
    /// whole mount, so the true hour angle comes from the solved right
    /// ascension. A failed plate solve warns and tries again; only equipment
    /// errors end the loop.
    fn refine(
        &mut self,
        latitude: f64,
        baseline: &BaselineTarget,
    ) -> Result<SessionOutcome, AlignmentError> {
        self.state = SessionState::Refining;

        let mut iterations = 0;
        loop {
            if let Some(limit) = self.config.refine_limit {
                if iterations >= limit {
                    break;
                }
            }
            if self.cancelled() {
                return Ok(SessionOutcome::Cancelled);
            }
            iterations += 1;

            self.emit_info("Taking image".to_string());
            self.observatory
                .expose(self.config.exposure_seconds, self.config.binning)?;
            let timing = self.observatory.image_timing()?;

            let position = match self
                .observatory
                .plate_solve(self.config.solve_scale_arcsec_per_pixel)
            {
                Ok(position) => position,
                Err(SolveError::PlateSolve(reason)) => {
                    warn!("Refinement plate solve failed: {reason}");
                    self.emit(SessionEvent::Warning(format!(
                        "Could not plate solve image: {reason}"
                    )));
                    continue;
                }
                Err(SolveError::Hardware(error)) => return Err(error.into()),
            };

            let image_ha = wrap_hours(timing.lst_hours - position.ra_hours);
            let image =
                alt_az_from_ha_dec_lat(image_ha, position.dec_degrees, latitude).normalized();

            // The target rotates with the sky
            let advanced_ha = wrap_hours(
                timing.lst_hours - baseline.baseline_lst_hours + baseline.target_ha_hours,
            );
            let target =
                alt_az_from_ha_dec_lat(advanced_ha, baseline.target_dec_degrees, latitude)
                    .normalized();

            let rotation = self.search.solve(&image, &target);
            self.report_adjustment(latitude, rotation);
        }

        self.emit_info("Completed polar alignment".to_string());
        Ok(SessionOutcome::Completed)
    }

    /// Emit the machine-readable correction plus operator-facing wording.
    ///
    /// In the southern hemisphere both bolt senses invert, so the reported
    /// angles carry the sign of the latitude.
    fn report_adjustment(&mut self, latitude: f64, rotation: RotationOffset) {
        let sign = 1.0f64.copysign(latitude);
        let tilt = rotation.tilt_degrees * sign;
        let swing = rotation.swing_degrees * sign;

        info!("Adjustment: tilt {tilt:.4} swing {swing:.4}");
        self.emit(SessionEvent::Adjustment {
            tilt_degrees: tilt,
            swing_degrees: swing,
        });

        if swing > 0.0 {
            self.emit_info(format!(
                "Azimuth: rotate mount counter-clockwise by {}",
                format_degrees(swing.abs())
            ));
        } else {
            self.emit_info(format!(
                "Azimuth: rotate mount clockwise by {}",
                format_degrees(swing.abs())
            ));
        }
        if tilt > 0.0 {
            self.emit_info(format!(
                "Altitude: lower mount by {}",
                format_degrees(tilt.abs())
            ));
        } else {
            self.emit_info(format!(
                "Altitude: raise mount by {}",
                format_degrees(tilt.abs())
            ));
        }
    }

    fn cancelled(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            info!("Cancellation observed, stopping session");
            self.state = SessionState::Stopping;
            self.emit_info("Stopped polar alignment".to_string());
            true
        } else {
            false
        }
    }

    fn emit_info(&self, message: String) {
        info!("{message}");
        self.emit(SessionEvent::Info(message));
    }

    /// The consumer may have gone away; events are best-effort.
    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

/// Handle to a session running on a worker thread.
pub struct SessionHandle {
    worker: JoinHandle<Result<SessionOutcome, AlignmentError>>,
    cancel: CancelToken,
}

impl SessionHandle {
    /// Start a session on a new thread, returning the handle and the event
    /// stream.
    pub fn spawn<O>(config: SessionConfig, observatory: O) -> (Self, Receiver<SessionEvent>)
    where
        O: Observatory + 'static,
    {
        let (sender, receiver) = unbounded();
        let cancel = CancelToken::new();
        let mut session = AlignmentSession::new(config, observatory, sender, cancel.clone());
        let worker = std::thread::spawn(move || session.run());
        (Self { worker, cancel }, receiver)
    }

    /// Request a clean stop at the next step boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the session to finish.
    pub fn join(self) -> Result<SessionOutcome, AlignmentError> {
        self.worker
            .join()
            .map_err(|_| AlignmentError::WorkerPanicked)?
    }
}
