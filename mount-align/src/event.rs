use serde::{Deserialize, Serialize};

/// Progress reports delivered to the session's consumer.
///
/// `Adjustment` carries the machine-readable bolt corrections; the string
/// variants carry operator-facing text. Events arrive in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Corrections to apply to the mount's adjustment bolts, in degrees.
    /// Positive tilt means lower the axis; positive swing means rotate the
    /// mount counter-clockwise as seen from above.
    Adjustment {
        tilt_degrees: f64,
        swing_degrees: f64,
    },
    /// Routine progress text
    Info(String),
    /// A recoverable problem, the session continues
    Warning(String),
    /// A fatal problem, the session is ending
    Error(String),
}
