//! Frame-to-frame wrist speed
//!
//! Single-sample derivative of the wrist position. No history beyond the
//! previous frame and no smoothing.

use std::time::Instant;

use crate::landmarks::HandLandmarks;

/// Previous-frame state, owned and mutated only by [`MotionTracker`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    previous_hand: Option<HandLandmarks>,
    previous_timestamp: Option<Instant>,
}

impl MotionState {
    pub fn previous_hand(&self) -> Option<&HandLandmarks> {
        self.previous_hand.as_ref()
    }

    pub fn previous_timestamp(&self) -> Option<Instant> {
        self.previous_timestamp
    }

    pub fn is_empty(&self) -> bool {
        self.previous_hand.is_none()
    }
}

/// Wrist velocity tracker
#[derive(Debug, Default)]
pub struct MotionTracker {
    state: MotionState,
}

impl MotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with the current frame and return the wrist speed in
    /// normalized units per second.
    ///
    /// Returns 0 when there is no hand, on the first frame after acquisition,
    /// and when no time has elapsed since the previous frame. Timestamps that
    /// run backwards saturate to a zero delta.
    pub fn update(&mut self, hand: Option<&HandLandmarks>, now: Instant) -> f64 {
        let Some(hand) = hand else {
            self.reset();
            return 0.0;
        };

        let velocity = match (self.state.previous_hand, self.state.previous_timestamp) {
            (Some(previous), Some(previous_time)) => {
                let dt = now.saturating_duration_since(previous_time).as_secs_f64();
                if dt == 0.0 {
                    0.0
                } else {
                    hand.wrist().distance(&previous.wrist()) / dt
                }
            }
            _ => 0.0,
        };

        self.state = MotionState {
            previous_hand: Some(*hand),
            previous_timestamp: Some(now),
        };

        velocity
    }

    /// Forget the previous frame (hand lost, pipeline stopped)
    pub fn reset(&mut self) {
        self.state = MotionState::default();
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::test_support::{fist, hand_at, CURLED};
    use crate::landmarks::Point3;
    use std::time::Duration;

    #[test]
    fn test_first_frame_is_zero() {
        let mut tracker = MotionTracker::new();
        assert_eq!(tracker.update(Some(&fist()), Instant::now()), 0.0);
        assert!(!tracker.state().is_empty());
    }

    #[test]
    fn test_wrist_speed() {
        let mut tracker = MotionTracker::new();
        let t0 = Instant::now();
        let first = hand_at(Point3::new(0.5, 0.5, 0.0), [CURLED; 5]);
        let second = hand_at(Point3::new(0.5, 0.6, 0.0), [CURLED; 5]);

        tracker.update(Some(&first), t0);
        let velocity = tracker.update(Some(&second), t0 + Duration::from_millis(100));
        assert!((velocity - 1.0).abs() < 1e-3, "velocity = {}", velocity);
    }

    #[test]
    fn test_identical_frames_have_no_velocity() {
        let mut tracker = MotionTracker::new();
        let t0 = Instant::now();
        tracker.update(Some(&fist()), t0);
        assert_eq!(tracker.update(Some(&fist()), t0 + Duration::from_millis(33)), 0.0);
    }

    #[test]
    fn test_zero_delta_time_is_zero() {
        let mut tracker = MotionTracker::new();
        let t0 = Instant::now();
        let moved = hand_at(Point3::new(0.2, 0.2, 0.0), [CURLED; 5]);
        tracker.update(Some(&fist()), t0);
        assert_eq!(tracker.update(Some(&moved), t0), 0.0);
        // State still advances to the latest frame
        assert_eq!(tracker.state().previous_hand(), Some(&moved));
    }

    #[test]
    fn test_backwards_timestamp_is_zero() {
        let mut tracker = MotionTracker::new();
        let t0 = Instant::now();
        let moved = hand_at(Point3::new(0.2, 0.2, 0.0), [CURLED; 5]);
        tracker.update(Some(&fist()), t0 + Duration::from_millis(50));
        assert_eq!(tracker.update(Some(&moved), t0), 0.0);
    }

    #[test]
    fn test_hand_loss_resets_state() {
        let mut tracker = MotionTracker::new();
        let t0 = Instant::now();
        let far = hand_at(Point3::new(0.9, 0.9, 0.0), [CURLED; 5]);

        tracker.update(Some(&fist()), t0);
        assert_eq!(tracker.update(None, t0 + Duration::from_millis(33)), 0.0);
        assert!(tracker.state().is_empty());

        // Reacquired far away: no spurious jump
        assert_eq!(tracker.update(Some(&far), t0 + Duration::from_millis(66)), 0.0);
    }

    #[test]
    fn test_depth_contributes_to_speed() {
        let mut tracker = MotionTracker::new();
        let t0 = Instant::now();
        tracker.update(Some(&hand_at(Point3::new(0.5, 0.5, 0.0), [CURLED; 5])), t0);
        let velocity = tracker.update(
            Some(&hand_at(Point3::new(0.5, 0.5, 0.5), [CURLED; 5])),
            t0 + Duration::from_secs(1),
        );
        assert!((velocity - 0.5).abs() < 1e-5);
    }
}
