//! # driftfield - gesture-driven particle field animation core
//!
//! A CPU-side core for an interactive point-cloud animation: particles
//! start on a grid, dissolve into free-floating drift, and assemble into
//! parametric shapes (swarm, circle, line, triangle) centered on a tap.
//! A rapid double tap reverses the dissolve and ends the session.
//!
//! The crate owns the simulation only. Rendering, windowing, and the
//! frame scheduler are host collaborators: the host calls
//! [`Session::tick`] once per display refresh, forwards pointer-down and
//! resize events, and uploads the position/color buffers as a point
//! cloud after each tick.
//!
//! ## Quick Start
//!
//! ```
//! use driftfield::Session;
//!
//! let mut session = Session::new()
//!     .with_viewport(800.0, 600.0)
//!     .with_seed(7);
//! session.start();
//!
//! let mut now_ms = 0.0;
//! for _ in 0..180 {
//!     now_ms += 16.0;
//!     session.tick(0.016, now_ms);
//! }
//!
//! // Once the dissolve has settled, a tap triggers a shape behavior.
//! session.handle_pointer_down(400.0, 300.0, now_ms);
//! assert!(session.behavior_active());
//!
//! // A rapid second tap reverses the dissolve.
//! session.handle_pointer_down(400.0, 300.0, now_ms + 100.0);
//! assert!(!session.behavior_active());
//! ```
//!
//! ## Core Concepts
//!
//! ### Dissolve
//!
//! Positions interpolate between each particle's grid seed and a random
//! scatter destination, shaped by an ease-out quadratic over a progress
//! value the state machine advances ([`Phase::Forming`]) or rewinds
//! ([`Phase::Reversing`]).
//!
//! ### Drift and wrap
//!
//! Settled particles move by a fixed per-particle velocity each frame
//! and wrap toroidally on x/y against the world bounds the camera
//! currently sees. Depth is deliberately unbounded.
//!
//! ### Behaviors
//!
//! An eligible single tap recolors the field, unprojects the tap onto
//! the particle plane, and aims every particle at a parametric shape for
//! 2.4 seconds ([`BehaviorKind`]).
//!
//! ### Buffers
//!
//! Per-particle data lives in parallel `f32` buffers, 3 floats per
//! particle, with dirty flags and [`bytemuck`] byte views so the
//! rendering collaborator can upload them without copying.

pub mod behavior;
pub mod camera;
pub mod error;
pub mod field;
pub mod gesture;
pub mod session;
pub mod time;

pub use behavior::{BehaviorKind, APPROACH_FACTOR, BEHAVIOR_DURATION_MS};
pub use camera::{Camera, WorldBounds};
pub use error::ProjectionError;
pub use field::{ParticleField, GRID_SPACING, MIN_PARTICLES};
pub use gesture::{Gesture, GestureDetector, DOUBLE_TAP_WINDOW_MS};
pub use glam::{Vec2, Vec3};
pub use session::{ease_out_quad, Phase, Session, TickOutcome};
pub use time::{FrameClock, FrameSample};

/// Convenient re-exports for common usage.
///
/// ```
/// use driftfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::behavior::BehaviorKind;
    pub use crate::camera::{Camera, WorldBounds};
    pub use crate::field::ParticleField;
    pub use crate::gesture::{Gesture, GestureDetector};
    pub use crate::session::{Phase, Session, TickOutcome};
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3};
}
