//! Error types for driftfield.
//!
//! The steady-state simulation path never fails: progress is clamped,
//! out-of-phase gestures are ignored, and redundant teardown is a no-op.
//! The one genuinely fallible operation is unprojecting a screen point
//! onto the particle plane, which degenerates when the pick ray runs
//! parallel to the plane or the view-projection matrix cannot be
//! inverted.

use std::fmt;

/// Errors that can occur when projecting a screen point into world space.
///
/// Callers are expected to skip behavior generation for the offending
/// gesture rather than abort the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    /// The viewport has zero area, so pixel coordinates are meaningless.
    EmptyViewport,
    /// The combined view-projection matrix is singular and cannot be
    /// inverted (e.g. a zero field of view or coincident near/far planes).
    SingularMatrix,
    /// The pick ray is parallel to the particle plane; there is no
    /// intersection point.
    RayParallelToPlane,
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::EmptyViewport => {
                write!(f, "cannot unproject: viewport has zero area")
            }
            ProjectionError::SingularMatrix => {
                write!(f, "cannot unproject: view-projection matrix is not invertible")
            }
            ProjectionError::RayParallelToPlane => {
                write!(f, "cannot unproject: pick ray is parallel to the particle plane")
            }
        }
    }
}

impl std::error::Error for ProjectionError {}
