use pole_math::GeometryError;
use thiserror::Error;

/// Equipment-layer failures. Always fatal to the session.
#[derive(Error, Debug)]
pub enum EquipmentError {
    #[error("Failed to connect to {device}: {reason}")]
    ConnectFailed { device: String, reason: String },

    #[error("{operation} failed: {reason}")]
    CommandFailed { operation: String, reason: String },

    #[error("Timed out waiting for {operation}")]
    Timeout { operation: String },
}

/// Plate-solve failures. Distinguishes a solver that could not match the
/// field (recoverable during refinement) from broken equipment.
#[derive(Error, Debug)]
pub enum SolveError {
    #[error("Plate solve failed: {0}")]
    PlateSolve(String),

    #[error(transparent)]
    Hardware(#[from] EquipmentError),
}

/// Session-level errors returned to the caller when a run ends in `Failed`.
#[derive(Error, Debug)]
pub enum AlignmentError {
    #[error(transparent)]
    Equipment(#[from] EquipmentError),

    #[error("Filter not found in wheel: {0}")]
    FilterNotFound(String),

    #[error("Could not plate solve baseline image {point}: {source}")]
    BaselineSolve { point: u8, source: SolveError },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Alignment worker thread panicked")]
    WorkerPanicked,
}
