//! End-to-end alignment session tests against the simulated observatory.

mod common;

use approx::assert_relative_eq;

use common::{adjustments, run_collecting, test_config, warnings, CancellingObservatory};
use mount_align::simulate::SimulatedObservatory;
use mount_align::{
    AlignmentError, CancelToken, EquipmentError, SessionEvent, SessionHandle, SessionOutcome,
    SessionState,
};

const LATITUDE: f64 = 50.0;
const LONGITUDE: f64 = -3.0;

#[test]
fn session_reports_the_injected_axis_error() {
    let observatory = SimulatedObservatory::new(LATITUDE, LONGITUDE, 0.7, -1.2)
        .with_initial_lst(6.0);

    let (session, result, events) =
        run_collecting(test_config(Some(2)), observatory, CancelToken::new());

    assert_eq!(result.unwrap(), SessionOutcome::Completed);
    assert_eq!(session.state(), SessionState::Completed);

    // One adjustment from the baseline, one per refinement image
    let corrections = adjustments(&events);
    assert_eq!(corrections.len(), 3);
    for (tilt, swing) in corrections {
        assert_relative_eq!(tilt, 0.7, epsilon = 0.01);
        assert_relative_eq!(swing, -1.2, epsilon = 0.01);
    }

    assert!(events
        .iter()
        .any(|event| matches!(event, SessionEvent::Info(m) if m == "Completed polar alignment")));
}

#[test]
fn southern_latitude_flips_the_reported_directions() {
    let observatory = SimulatedObservatory::new(-35.0, 149.0, 0.5, 0.8);

    let (_, result, events) =
        run_collecting(test_config(Some(0)), observatory, CancelToken::new());

    assert_eq!(result.unwrap(), SessionOutcome::Completed);
    let corrections = adjustments(&events);
    assert_eq!(corrections.len(), 1);
    let (tilt, swing) = corrections[0];
    assert_relative_eq!(tilt, -0.5, epsilon = 0.01);
    assert_relative_eq!(swing, -0.8, epsilon = 0.01);
}

#[test]
fn selected_filter_and_binning_are_restored() {
    let mut config = test_config(Some(1));
    config.filter = Some("Red".to_string());
    let observatory = SimulatedObservatory::new(LATITUDE, LONGITUDE, 0.3, 0.4);

    let (session, result, _) = run_collecting(config, observatory, CancelToken::new());

    assert_eq!(result.unwrap(), SessionOutcome::Completed);
    // The simulator starts at binning 1 and slot 0; the run used binning 4
    // and the Red filter
    assert_eq!(session.observatory().camera_binning(), 1);
    assert_eq!(session.observatory().selected_filter(), 0);
}

#[test]
fn cancellation_during_first_image_stops_before_solving() {
    let token = CancelToken::new();
    let inner = SimulatedObservatory::new(LATITUDE, LONGITUDE, 0.7, -1.2);
    let observatory = CancellingObservatory::new(inner, token.clone(), 1);

    let (session, result, events) = run_collecting(test_config(None), observatory, token);

    assert_eq!(result.unwrap(), SessionOutcome::Cancelled);
    assert_eq!(session.state(), SessionState::Stopping);
    assert_eq!(session.observatory().inner.solves_attempted(), 0);
    assert_eq!(session.observatory().inner.camera_binning(), 1);
    assert!(adjustments(&events).is_empty());
}

#[test]
fn refinement_solve_failure_warns_and_continues() {
    // Exposures 1 and 2 are the baseline; 3 is the first refinement image
    let observatory = SimulatedObservatory::new(LATITUDE, LONGITUDE, 0.7, -1.2)
        .with_solve_failures([3]);

    let (session, result, events) =
        run_collecting(test_config(Some(3)), observatory, CancelToken::new());

    assert_eq!(result.unwrap(), SessionOutcome::Completed);
    assert_eq!(warnings(&events).len(), 1);
    // Baseline adjustment plus the two refinement images that solved
    assert_eq!(adjustments(&events).len(), 3);
    assert_eq!(session.observatory().exposures_taken(), 5);
}

#[test]
fn baseline_solve_failure_is_fatal() {
    let observatory = SimulatedObservatory::new(LATITUDE, LONGITUDE, 0.7, -1.2)
        .with_solve_failures([1]);

    let (session, result, events) =
        run_collecting(test_config(None), observatory, CancelToken::new());

    assert!(matches!(
        result,
        Err(AlignmentError::BaselineSolve { point: 1, .. })
    ));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(events
        .iter()
        .any(|event| matches!(event, SessionEvent::Error(_))));
    // Restore still ran
    assert_eq!(session.observatory().camera_binning(), 1);
}

#[test]
fn unknown_filter_fails_before_any_exposure() {
    let mut config = test_config(None);
    config.filter = Some("H-alpha".to_string());
    let observatory = SimulatedObservatory::new(LATITUDE, LONGITUDE, 0.7, -1.2);

    let (session, result, _) = run_collecting(config, observatory, CancelToken::new());

    assert!(matches!(result, Err(AlignmentError::FilterNotFound(name)) if name == "H-alpha"));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.observatory().exposures_taken(), 0);
}

#[test]
fn offline_mount_fails_to_connect() {
    let observatory =
        SimulatedObservatory::new(LATITUDE, LONGITUDE, 0.0, 0.0).with_mount_offline();

    let (session, result, _) = run_collecting(test_config(None), observatory, CancelToken::new());

    assert!(matches!(
        result,
        Err(AlignmentError::Equipment(EquipmentError::ConnectFailed { device, .. }))
            if device == "mount"
    ));
    assert_eq!(session.state(), SessionState::Failed);
}

#[test]
fn spawned_session_cancels_through_the_handle() {
    let observatory = SimulatedObservatory::new(LATITUDE, LONGITUDE, 0.7, -1.2);
    let (handle, events) = SessionHandle::spawn(test_config(None), observatory);

    // Let the unbounded refinement loop produce one correction, then stop it
    for event in events.iter() {
        if matches!(event, SessionEvent::Adjustment { .. }) {
            handle.cancel();
            break;
        }
    }
    // Drain until the worker drops its sender
    for _ in events.iter() {}

    assert_eq!(handle.join().unwrap(), SessionOutcome::Cancelled);
}
