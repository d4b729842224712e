//! pole-math - Spherical geometry for telescope polar-axis alignment
//!
//! This crate provides the pure math behind two-image polar alignment:
//!
//! - **Vectors** - unit vectors in horizon and pole-aligned frames, and the
//!   swing-then-tilt rotation operator used to model mount adjustments
//! - **Spherical** - hour-angle/declination and altitude/azimuth conversions,
//!   sidereal-time arithmetic, angle wrapping
//! - **PoleSolver** - recovers where the mount's rotation axis actually
//!   points from two plate-solved observations
//! - **RotationSearch** - coarse-then-fine brute-force search for the
//!   tilt/swing correction mapping one sky direction onto another
//! - **Formatting** - sexagesimal rendering rounded to the nearest arcsecond
//!
//! # Example
//!
//! ```
//! use pole_math::{AltAz, RotationSearch};
//!
//! let current = AltAz::new(50.0, 0.5);
//! let target = AltAz::new(50.7, -0.8);
//! let correction = RotationSearch::default().solve(&current, &target);
//! assert!(correction.tilt_degrees.abs() < 10.0);
//! ```

pub mod error;
pub mod format;
pub mod search;
pub mod solver;
pub mod spherical;
pub mod types;
pub mod vector;

pub use error::GeometryError;
pub use format::{format_degrees, format_hours};
pub use search::RotationSearch;
pub use solver::PoleSolver;
pub use types::{AltAz, EquatorialPosition, Observation, PoleOffset, RotationOffset};
