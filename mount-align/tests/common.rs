//! Common utilities for mount-align tests

use crossbeam_channel::unbounded;

use mount_align::simulate::SimulatedObservatory;
use mount_align::{
    AlignmentError, AlignmentSession, CancelToken, EquipmentError, ImageTiming, Observatory,
    SessionConfig, SessionEvent, SessionOutcome, Site, SolveError,
};
use pole_math::EquatorialPosition;

/// Default session config with a bounded refinement loop.
pub fn test_config(refine_limit: Option<usize>) -> SessionConfig {
    SessionConfig {
        refine_limit,
        ..SessionConfig::default()
    }
}

/// Run a session to the end on the calling thread, collecting every event.
pub fn run_collecting<O: Observatory>(
    config: SessionConfig,
    observatory: O,
    cancel: CancelToken,
) -> (
    AlignmentSession<O>,
    Result<SessionOutcome, AlignmentError>,
    Vec<SessionEvent>,
) {
    let (sender, receiver) = unbounded();
    let mut session = AlignmentSession::new(config, observatory, sender, cancel);
    let result = session.run();
    let events = receiver.try_iter().collect();
    (session, result, events)
}

pub fn adjustments(events: &[SessionEvent]) -> Vec<(f64, f64)> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Adjustment {
                tilt_degrees,
                swing_degrees,
            } => Some((*tilt_degrees, *swing_degrees)),
            _ => None,
        })
        .collect()
}

pub fn warnings(events: &[SessionEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Warning(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Simulator wrapper that trips a cancel token once a chosen exposure has
/// completed, so cancellation lands at a known step boundary.
pub struct CancellingObservatory {
    pub inner: SimulatedObservatory,
    token: CancelToken,
    cancel_after_exposure: usize,
}

impl CancellingObservatory {
    pub fn new(inner: SimulatedObservatory, token: CancelToken, cancel_after_exposure: usize) -> Self {
        Self {
            inner,
            token,
            cancel_after_exposure,
        }
    }
}

impl Observatory for CancellingObservatory {
    fn connect_mount(&mut self) -> Result<(), EquipmentError> {
        self.inner.connect_mount()
    }

    fn connect_camera(&mut self) -> Result<(), EquipmentError> {
        self.inner.connect_camera()
    }

    fn connect_filter_wheel(&mut self) -> Result<(), EquipmentError> {
        self.inner.connect_filter_wheel()
    }

    fn unpark(&mut self) -> Result<(), EquipmentError> {
        self.inner.unpark()
    }

    fn site(&mut self) -> Result<Site, EquipmentError> {
        self.inner.site()
    }

    fn slew_to(&mut self, ra_hours: f64, dec_degrees: f64) -> Result<(), EquipmentError> {
        self.inner.slew_to(ra_hours, dec_degrees)
    }

    fn expose(&mut self, exposure_seconds: f64, binning: u32) -> Result<(), EquipmentError> {
        self.inner.expose(exposure_seconds, binning)?;
        if self.inner.exposures_taken() == self.cancel_after_exposure {
            self.token.cancel();
        }
        Ok(())
    }

    fn image_timing(&mut self) -> Result<ImageTiming, EquipmentError> {
        self.inner.image_timing()
    }

    fn plate_solve(
        &mut self,
        scale_arcsec_per_pixel: f64,
    ) -> Result<EquatorialPosition, SolveError> {
        self.inner.plate_solve(scale_arcsec_per_pixel)
    }

    fn binning(&mut self) -> Result<u32, EquipmentError> {
        self.inner.binning()
    }

    fn set_binning(&mut self, binning: u32) -> Result<(), EquipmentError> {
        self.inner.set_binning(binning)
    }

    fn filter_names(&mut self) -> Result<Vec<String>, EquipmentError> {
        self.inner.filter_names()
    }

    fn current_filter(&mut self) -> Result<usize, EquipmentError> {
        self.inner.current_filter()
    }

    fn select_filter(&mut self, slot: usize) -> Result<(), EquipmentError> {
        self.inner.select_filter(slot)
    }
}
