//! Session: dissolve state machine and composition root.
//!
//! A [`Session`] owns one [`ParticleField`], a [`Camera`], a
//! [`GestureDetector`], and the seeded RNG, and wires them together
//! behind five host-facing operations: [`Session::start`],
//! [`Session::stop`], [`Session::handle_pointer_down`],
//! [`Session::handle_resize`], and [`Session::tick`].
//!
//! The dissolve state machine:
//!
//! ```text
//! NotStarted -> Forming -> Settled <-> BehaviorActive
//!                  |          |             |
//!                  +-----> Reversing <------+   (double tap, any state)
//!                              |
//!                          NotStarted           (progress back at 0)
//! ```
//!
//! All buffer mutation happens inside `tick`; pointer and resize events
//! run on the same cooperative queue and only record state the next tick
//! (or, for gestures, the event handler itself) consumes.
//!
//! # Example
//!
//! ```
//! use driftfield::Session;
//!
//! let mut session = Session::new()
//!     .with_viewport(800.0, 600.0)
//!     .with_seed(42);
//! session.start();
//!
//! // Host frame loop: advance one frame at 60 fps.
//! session.tick(1.0 / 60.0, 16.6);
//! let positions = session.positions();
//! assert_eq!(positions.len(), session.particle_count() * 3);
//! ```

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::behavior::{self, BehaviorKind, APPROACH_FACTOR, BEHAVIOR_DURATION_MS};
use crate::camera::Camera;
use crate::field::{ParticleField, GRID_SPACING, MIN_PARTICLES};
use crate::gesture::{Gesture, GestureDetector};

/// Dissolve progress gained per second while forming.
pub const FORMING_RATE: f32 = 0.6;

/// Dissolve progress lost per second while reversing.
pub const REVERSING_RATE: f32 = 0.7;

/// Ease-out quadratic shaping the dissolve interpolation.
///
/// Monotonic on [0, 1] with `ease(0) = 0` and `ease(1) = 1`.
#[inline]
pub fn ease_out_quad(p: f32) -> f32 {
    p * (2.0 - p)
}

/// Where the session is in the dissolve lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No field allocated; ticks are no-ops.
    NotStarted,
    /// Progress rising from 0 toward 1; particles leave the grid.
    Forming,
    /// Progress at 1, no behavior; free drift with toroidal wrap.
    Settled,
    /// Progress at 1, particles converging on a behavior shape.
    BehaviorActive,
    /// Progress falling toward 0; particles return to the grid.
    Reversing,
}

/// What a call to [`Session::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session not running; nothing happened.
    Idle,
    /// Buffers were advanced one frame.
    Running,
    /// The reverse dissolve just completed; the field was released and
    /// the host may restart the session.
    Ended,
}

/// One interactive particle-field session.
///
/// Configure with the builder methods, then `start`. The particle count
/// is fixed when `start` allocates the field; resizes afterwards only
/// change the wrap bounds and projection.
pub struct Session {
    camera: Camera,
    spacing: f32,
    min_count: usize,
    rng: SmallRng,
    detector: GestureDetector,
    field: Option<ParticleField>,
    phase: Phase,
    progress: f32,
    /// Deadline for the running behavior; only meaningful in
    /// `Phase::BehaviorActive`.
    behavior_deadline_ms: f64,
    /// Viewport size recorded by `handle_resize`, consumed by the next tick.
    pending_viewport: Option<(f32, f32)>,
}

impl Session {
    /// Create an unstarted session with default camera and field settings.
    pub fn new() -> Self {
        Self {
            camera: Camera::default(),
            spacing: GRID_SPACING,
            min_count: MIN_PARTICLES,
            rng: SmallRng::from_entropy(),
            detector: GestureDetector::new(),
            field: None,
            phase: Phase::NotStarted,
            progress: 0.0,
            behavior_deadline_ms: 0.0,
            pending_viewport: None,
        }
    }

    /// Seed the internal RNG so scatter targets, drift velocities,
    /// behavior picks, and colors are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Replace the default camera.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Set the initial viewport size in pixels.
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.camera.set_viewport(width, height);
        self
    }

    /// Override the grid spacing in world units.
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Override the minimum particle count.
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    // ========== Host-facing operations ==========

    /// Allocate the particle field and begin the forming dissolve.
    ///
    /// A no-op if the session is already running.
    pub fn start(&mut self) {
        if self.field.is_some() {
            return;
        }

        let bounds = self.camera.visible_bounds();
        let field = ParticleField::new(bounds, self.spacing, self.min_count, &mut self.rng);
        debug!(
            "session started: {} particles in {:.0}x{:.0} world bounds",
            field.count(),
            bounds.width,
            bounds.height
        );

        self.field = Some(field);
        self.phase = Phase::Forming;
        self.progress = 0.0;
    }

    /// Tear the session down, releasing all particle buffers.
    ///
    /// Idempotent: calling it twice, or before `start`, is a no-op.
    pub fn stop(&mut self) {
        if self.field.is_none() && self.phase == Phase::NotStarted {
            return;
        }
        debug!("session stopped");
        self.field = None;
        self.phase = Phase::NotStarted;
        self.progress = 0.0;
        self.pending_viewport = None;
        self.detector.reset();
    }

    /// Record a new viewport size in pixels.
    ///
    /// Applied at the start of the next tick, so the wrap box changes on
    /// the next frame. Ignored while the session is inactive.
    pub fn handle_resize(&mut self, width: f32, height: f32) {
        if self.field.is_none() {
            return;
        }
        self.pending_viewport = Some((width, height));
    }

    /// Classify and react to a pointer-down at screen pixel `(x, y)`.
    ///
    /// `now_ms` comes from the host's monotonic timestamp source and must
    /// share its epoch with the timestamps passed to `tick`. Gestures
    /// before `start` are ignored.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32, now_ms: f64) {
        if self.field.is_none() {
            return;
        }

        match self.detector.classify(x, y, now_ms) {
            Gesture::DoubleTap => {
                debug!("double tap: reversing dissolve");
                self.enter_reversing();
            }
            Gesture::Tap { x, y } => {
                if self.progress >= 1.0 {
                    let kind = BehaviorKind::random(&mut self.rng);
                    self.trigger_behavior(kind, x, y, now_ms);
                }
            }
        }
    }

    /// Advance the simulation one frame.
    ///
    /// `dt_secs` is the time since the previous tick; `now_ms` is the
    /// host's monotonic timestamp for this frame. This is the only place
    /// particle positions are mutated after initialization.
    pub fn tick(&mut self, dt_secs: f32, now_ms: f64) -> TickOutcome {
        if let Some((width, height)) = self.pending_viewport.take() {
            self.camera.set_viewport(width, height);
        }

        let Some(field) = self.field.as_mut() else {
            return TickOutcome::Idle;
        };

        match self.phase {
            Phase::NotStarted => TickOutcome::Idle,
            Phase::Forming => {
                self.progress = (self.progress + dt_secs * FORMING_RATE).clamp(0.0, 1.0);
                field.blend_toward_scatter(ease_out_quad(self.progress));
                if self.progress >= 1.0 {
                    debug!("dissolve complete: settled");
                    self.phase = Phase::Settled;
                }
                TickOutcome::Running
            }
            Phase::Settled => {
                field.drift_and_wrap(self.camera.visible_bounds());
                TickOutcome::Running
            }
            Phase::BehaviorActive => {
                if now_ms >= self.behavior_deadline_ms {
                    debug!("behavior expired: resuming drift");
                    self.phase = Phase::Settled;
                    field.drift_and_wrap(self.camera.visible_bounds());
                } else {
                    field.approach_targets(APPROACH_FACTOR);
                }
                TickOutcome::Running
            }
            Phase::Reversing => {
                self.progress = (self.progress - dt_secs * REVERSING_RATE).clamp(0.0, 1.0);
                field.blend_toward_scatter(ease_out_quad(self.progress));
                if self.progress <= 0.0 {
                    debug!("reverse dissolve complete: session ended");
                    self.field = None;
                    self.phase = Phase::NotStarted;
                    self.detector.reset();
                    return TickOutcome::Ended;
                }
                TickOutcome::Running
            }
        }
    }

    // ========== State queries ==========

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Dissolve progress in [0, 1].
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether a behavior is currently running.
    #[inline]
    pub fn behavior_active(&self) -> bool {
        self.phase == Phase::BehaviorActive
    }

    /// Whether the session has a live particle field.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.field.is_some()
    }

    /// Number of particles, or 0 before `start`.
    pub fn particle_count(&self) -> usize {
        self.field.as_ref().map_or(0, ParticleField::count)
    }

    /// Current positions (3 floats per particle), empty before `start`.
    pub fn positions(&self) -> &[f32] {
        self.field.as_ref().map_or(&[], ParticleField::positions)
    }

    /// Current linear-RGB colors (3 floats per particle), empty before `start`.
    pub fn colors(&self) -> &[f32] {
        self.field.as_ref().map_or(&[], ParticleField::colors)
    }

    /// The live particle field, if any. Gives the rendering collaborator
    /// access to dirty flags and byte views.
    pub fn field_mut(&mut self) -> Option<&mut ParticleField> {
        self.field.as_mut()
    }

    /// The camera used for projection and bounds.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Start a behavior of a specific kind at screen pixel `(x, y)`:
    /// recolor the field, project the point onto the particle plane, and
    /// aim every particle at the generated shape.
    ///
    /// `handle_pointer_down` routes eligible single taps here with a
    /// randomly picked kind; hosts and tests can call it directly to
    /// choose the shape. Ignored unless the dissolve has settled, or if
    /// the point cannot be projected.
    pub fn trigger_behavior(&mut self, kind: BehaviorKind, x: f32, y: f32, now_ms: f64) {
        // Taps mid-dissolve are ignored outright.
        if self.progress < 1.0 || matches!(self.phase, Phase::Reversing) {
            return;
        }
        let Some(field) = self.field.as_mut() else {
            return;
        };

        field.randomize_colors(&mut self.rng);

        let center = match self.camera.screen_to_world(x, y) {
            Ok(center) => center,
            Err(err) => {
                debug!("tap at ({x:.0}, {y:.0}) not projectable: {err}");
                return;
            }
        };

        let size = self.camera.visible_bounds().size();
        behavior::write_targets(kind, center, size, &mut self.rng, field.behavior_targets_mut());

        self.phase = Phase::BehaviorActive;
        self.behavior_deadline_ms = now_ms + BEHAVIOR_DURATION_MS;
        debug!("behavior {kind:?} at ({:.1}, {:.1})", center.x, center.y);
    }

    /// Enter the reverse dissolve from any state, cancelling any active
    /// behavior immediately.
    fn enter_reversing(&mut self) {
        self.phase = Phase::Reversing;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_session() -> Session {
        let mut session = Session::new()
            .with_seed(42)
            .with_camera(Camera::new(
                Camera::fov_for_pixel_match(600.0, 400.0),
                0.1,
                2000.0,
                400.0,
            ))
            .with_viewport(800.0, 600.0);
        session.start();
        session
    }

    /// Run the session to Settled (progress 1).
    fn settle(session: &mut Session, now_ms: &mut f64) {
        for _ in 0..200 {
            *now_ms += 16.0;
            session.tick(0.016, *now_ms);
            if session.phase() == Phase::Settled {
                return;
            }
        }
        panic!("session never settled");
    }

    #[test]
    fn test_ease_endpoints_and_monotonicity() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);

        let mut previous = 0.0;
        for step in 1..=100 {
            let eased = ease_out_quad(step as f32 / 100.0);
            assert!(eased > previous);
            previous = eased;
        }
    }

    #[test]
    fn test_tick_before_start_is_idle() {
        let mut session = Session::new().with_seed(1);
        assert_eq!(session.tick(0.016, 16.0), TickOutcome::Idle);
        assert_eq!(session.particle_count(), 0);
    }

    #[test]
    fn test_start_allocates_pixel_matched_grid() {
        let session = started_session();
        // 800x600 world bounds at spacing 18: 44 columns x 33 rows.
        assert_eq!(session.particle_count(), 44 * 33);
        assert_eq!(session.phase(), Phase::Forming);
    }

    #[test]
    fn test_start_twice_keeps_field() {
        let mut session = started_session();
        let count = session.particle_count();
        session.start();
        assert_eq!(session.particle_count(), count);
    }

    #[test]
    fn test_forming_progress_is_monotonic() {
        let mut session = started_session();
        let mut previous = session.progress();
        for frame in 0..150 {
            session.tick(0.016, frame as f64 * 16.0);
            assert!(session.progress() >= previous);
            assert!(session.progress() <= 1.0);
            previous = session.progress();
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn test_tap_before_start_is_ignored() {
        let mut session = Session::new().with_seed(1);
        session.handle_pointer_down(100.0, 100.0, 50.0);
        assert_eq!(session.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_tap_while_forming_is_ignored() {
        let mut session = started_session();
        session.tick(0.016, 16.0);
        assert!(session.progress() < 1.0);

        session.handle_pointer_down(400.0, 300.0, 20.0);
        assert_eq!(session.phase(), Phase::Forming);
        assert!(!session.behavior_active());
    }

    #[test]
    fn test_tap_when_settled_starts_behavior() {
        let mut session = started_session();
        let mut now = 0.0;
        settle(&mut session, &mut now);

        session.handle_pointer_down(400.0, 300.0, now);
        assert!(session.behavior_active());
    }

    #[test]
    fn test_behavior_expires_after_duration() {
        let mut session = started_session();
        let mut now = 0.0;
        settle(&mut session, &mut now);

        session.handle_pointer_down(400.0, 300.0, now);
        let deadline = now + BEHAVIOR_DURATION_MS;

        // Strictly before the deadline the behavior stays active.
        now = deadline - 1.0;
        session.tick(0.016, now);
        assert!(session.behavior_active());

        // At the deadline it is gone.
        now = deadline;
        session.tick(0.016, now);
        assert!(!session.behavior_active());
        assert_eq!(session.phase(), Phase::Settled);
    }

    #[test]
    fn test_double_tap_reverses_and_cancels_behavior() {
        let mut session = started_session();
        let mut now = 0.0;
        settle(&mut session, &mut now);

        session.handle_pointer_down(400.0, 300.0, now);
        assert!(session.behavior_active());

        // Second tap 100 ms later: double tap.
        session.handle_pointer_down(400.0, 300.0, now + 100.0);
        assert!(!session.behavior_active());
        assert_eq!(session.phase(), Phase::Reversing);
    }

    #[test]
    fn test_reversing_runs_back_to_not_started() {
        let mut session = started_session();
        let mut now = 0.0;
        settle(&mut session, &mut now);

        session.handle_pointer_down(10.0, 10.0, now);
        session.handle_pointer_down(10.0, 10.0, now + 50.0);
        assert_eq!(session.phase(), Phase::Reversing);

        let mut ended = false;
        for _ in 0..200 {
            now += 16.0;
            if session.tick(0.016, now) == TickOutcome::Ended {
                ended = true;
                break;
            }
        }
        assert!(ended);
        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(!session.is_running());
        assert_eq!(session.particle_count(), 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut session = Session::new().with_seed(5);
        session.stop();
        session.stop();

        session.start();
        session.stop();
        session.stop();
        assert!(!session.is_running());
        assert_eq!(session.tick(0.016, 16.0), TickOutcome::Idle);
    }

    #[test]
    fn test_resize_while_inactive_is_ignored() {
        let mut session = Session::new().with_seed(5);
        session.handle_resize(1920.0, 1080.0);
        session.start();
        // Field was seeded from the builder viewport, not the ignored resize.
        assert_eq!(session.camera().viewport().x, 800.0);
    }

    #[test]
    fn test_resize_applies_on_next_tick() {
        let mut session = started_session();
        session.handle_resize(1000.0, 500.0);
        assert_eq!(session.camera().viewport().x, 800.0);

        session.tick(0.016, 16.0);
        assert_eq!(session.camera().viewport().x, 1000.0);
    }

    #[test]
    fn test_restart_after_end() {
        let mut session = started_session();
        let mut now = 0.0;
        settle(&mut session, &mut now);

        session.handle_pointer_down(0.0, 0.0, now);
        session.handle_pointer_down(0.0, 0.0, now + 50.0);
        loop {
            now += 16.0;
            if session.tick(0.016, now) == TickOutcome::Ended {
                break;
            }
        }

        session.start();
        assert!(session.is_running());
        assert_eq!(session.phase(), Phase::Forming);
    }

    #[test]
    fn test_seeded_sessions_are_deterministic() {
        let run = |seed| {
            let mut session = Session::new().with_seed(seed).with_viewport(640.0, 480.0);
            session.start();
            let mut now = 0.0;
            for _ in 0..120 {
                now += 16.0;
                session.tick(0.016, now);
            }
            session.handle_pointer_down(320.0, 240.0, now);
            for _ in 0..30 {
                now += 16.0;
                session.tick(0.016, now);
            }
            (session.positions().to_vec(), session.colors().to_vec())
        };

        assert_eq!(run(9), run(9));
    }
}
