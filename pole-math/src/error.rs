use thiserror::Error;

/// Errors raised by the pure geometry routines.
///
/// These only occur on genuinely degenerate input; classifying them as fatal
/// or recoverable is the session layer's job.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Vector norm too close to zero to normalize.
    #[error("degenerate vector: norm is {norm:.3e}")]
    DegenerateVector {
        /// The offending norm.
        norm: f64,
    },

    /// The two baseline observations are too close together to define the
    /// great circle equidistant from both.
    #[error("observations separated by only {separation_degrees:.6}\u{b0}, too close to solve")]
    InsufficientSeparation {
        /// Angular separation of the two observations in degrees.
        separation_degrees: f64,
    },

    /// Newton-Raphson failed to converge within the iteration cap.
    #[error("pole solve did not converge after {iterations} iterations (residual {residual:.3e})")]
    SolverDiverged {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Residual at the last candidate.
        residual: f64,
    },
}
