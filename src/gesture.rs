//! Pointer gesture classification.
//!
//! A pointer-down is either a single tap (trigger a behavior at that
//! point) or the second half of a double tap (reverse the dissolve).
//! Classification is purely a matter of inter-event timing; the detector
//! never looks at pointer movement.

/// Two pointer-downs closer together than this are a double tap.
pub const DOUBLE_TAP_WINDOW_MS: f64 = 320.0;

/// A classified pointer-down event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Single tap at the given screen coordinates (pixels).
    Tap { x: f32, y: f32 },
    /// Second tap of a rapid pair; screen position is irrelevant.
    DoubleTap,
}

/// Classifies pointer-down events by inter-event timing.
#[derive(Debug, Default)]
pub struct GestureDetector {
    /// Timestamp of the previous tap, cleared after a double tap so a
    /// third tap starts a fresh sequence.
    last_tap_at: Option<f64>,
}

impl GestureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a pointer-down at `now_ms` (host monotonic milliseconds).
    pub fn classify(&mut self, x: f32, y: f32, now_ms: f64) -> Gesture {
        match self.last_tap_at {
            Some(last) if now_ms - last < DOUBLE_TAP_WINDOW_MS => {
                self.last_tap_at = None;
                Gesture::DoubleTap
            }
            _ => {
                self.last_tap_at = Some(now_ms);
                Gesture::Tap { x, y }
            }
        }
    }

    /// Forget any pending tap, e.g. when the session tears down.
    pub fn reset(&mut self) {
        self.last_tap_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tap_is_single() {
        let mut detector = GestureDetector::new();
        assert_eq!(
            detector.classify(5.0, 6.0, 0.0),
            Gesture::Tap { x: 5.0, y: 6.0 }
        );
    }

    #[test]
    fn test_rapid_second_tap_is_double() {
        let mut detector = GestureDetector::new();
        detector.classify(0.0, 0.0, 1000.0);
        assert_eq!(detector.classify(0.0, 0.0, 1200.0), Gesture::DoubleTap);
    }

    #[test]
    fn test_slow_second_tap_is_single() {
        let mut detector = GestureDetector::new();
        detector.classify(0.0, 0.0, 1000.0);
        assert!(matches!(
            detector.classify(0.0, 0.0, 1320.0),
            Gesture::Tap { .. }
        ));
    }

    #[test]
    fn test_double_tap_resets_the_sequence() {
        let mut detector = GestureDetector::new();
        detector.classify(0.0, 0.0, 1000.0);
        assert_eq!(detector.classify(0.0, 0.0, 1100.0), Gesture::DoubleTap);

        // Without the reset this would pair with the tap at 1100.
        assert!(matches!(
            detector.classify(0.0, 0.0, 1150.0),
            Gesture::Tap { .. }
        ));
    }

    #[test]
    fn test_reset_forgets_pending_tap() {
        let mut detector = GestureDetector::new();
        detector.classify(0.0, 0.0, 1000.0);
        detector.reset();
        assert!(matches!(
            detector.classify(0.0, 0.0, 1100.0),
            Gesture::Tap { .. }
        ));
    }
}
