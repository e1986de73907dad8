//! Frame timing for hosts driving a session.
//!
//! The simulation core never reads the wall clock; every operation takes
//! host-supplied timestamps. [`FrameClock`] is a small helper for hosts
//! that do not already have a timing source: call [`FrameClock::frame`]
//! once per display refresh and feed the sample into
//! [`Session::tick`](crate::Session::tick).
//!
//! ```no_run
//! use driftfield::FrameClock;
//!
//! let mut clock = FrameClock::new();
//! loop {
//!     let frame = clock.frame();
//!     // session.tick(frame.delta_secs, frame.now_ms);
//! }
//! ```

use std::time::Instant;

/// Timestamps for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameSample {
    /// Monotonic milliseconds since the clock was created.
    pub now_ms: f64,
    /// Seconds since the previous frame.
    pub delta_secs: f32,
}

/// Monotonic per-frame clock backed by [`Instant`].
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
        }
    }

    /// Sample the clock for a new frame. Call once per frame.
    pub fn frame(&mut self) -> FrameSample {
        let now = Instant::now();
        let delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        FrameSample {
            now_ms: now.duration_since(self.start).as_secs_f64() * 1000.0,
            delta_secs,
        }
    }

    /// Milliseconds since the clock was created, without advancing it.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
