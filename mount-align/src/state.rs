use serde::{Deserialize, Serialize};

/// Polar alignment session states
///
/// A run walks the happy path top to bottom. `Stopping` is entered from any
/// non-terminal state when cancellation is observed at a step boundary;
/// `Failed` on any hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for the session to start
    Idle,
    /// Connecting mount, camera and filter wheel
    Connecting,
    /// Slewing to the first baseline point
    SlewingPoint1,
    /// Exposing the first baseline image
    ImagingPoint1,
    /// Plate-solving the first baseline image
    SolvingPoint1,
    /// Slewing to the second baseline point
    SlewingPoint2,
    /// Exposing the second baseline image
    ImagingPoint2,
    /// Plate-solving the second baseline image
    SolvingPoint2,
    /// Running the axis solver and the first rotation search
    ComputingBaseline,
    /// Imaging repeatedly while the user turns the adjustment bolts
    Refining,
    /// Cancellation observed, restoring equipment
    Stopping,
    /// Finished cleanly
    Completed,
    /// Ended on a hard error
    Failed,
}
