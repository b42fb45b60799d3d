//! Per-frame aggregation of the hand and face detection streams
//!
//! Hand events drive output: each one produces exactly one [`SignalResult`].
//! Face events only refresh a single-slot cache that the next hand event reads
//! (latest-value join, no waiting for frame alignment).

use serde::{Deserialize, Serialize};

use crate::landmarks::{FaceLandmarks, HandLandmarks, Handedness};
use crate::signal::cursor::{CursorMapper, CursorPosition};
use crate::signal::eyes::{EyePositionExtractor, EyePositions};
use crate::signal::gesture::{GestureCategory, GestureClassifier};
use crate::signal::motion::MotionTracker;
use crate::tracking::{DetectionEvent, FaceDetection, HandDetection};

/// Combined control signal delivered to the consumer once per hand event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResult {
    hand_detected: bool,
    landmarks: Option<HandLandmarks>,
    cursor_position: Option<CursorPosition>,
    gesture: GestureCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handedness: Option<Handedness>,
    eye_positions: Option<EyePositions>,
}

impl SignalResult {
    /// Result for a frame without a hand
    pub fn no_hand(eye_positions: Option<EyePositions>) -> Self {
        Self {
            hand_detected: false,
            landmarks: None,
            cursor_position: None,
            gesture: GestureCategory::Idle,
            velocity: None,
            handedness: None,
            eye_positions,
        }
    }

    /// Result for a frame with a hand
    pub fn hand(
        landmarks: HandLandmarks,
        cursor_position: CursorPosition,
        gesture: GestureCategory,
        velocity: f64,
        handedness: Handedness,
        eye_positions: Option<EyePositions>,
    ) -> Self {
        Self {
            hand_detected: true,
            landmarks: Some(landmarks),
            cursor_position: Some(cursor_position),
            gesture,
            velocity: Some(velocity),
            handedness: Some(handedness),
            eye_positions,
        }
    }

    pub fn hand_detected(&self) -> bool {
        self.hand_detected
    }

    pub fn landmarks(&self) -> Option<&HandLandmarks> {
        self.landmarks.as_ref()
    }

    pub fn cursor_position(&self) -> Option<CursorPosition> {
        self.cursor_position
    }

    pub fn gesture(&self) -> GestureCategory {
        self.gesture
    }

    /// Wrist speed; `None` when no hand was detected
    pub fn velocity(&self) -> Option<f64> {
        self.velocity
    }

    /// Handedness label; `None` when no hand was detected
    pub fn handedness(&self) -> Option<Handedness> {
        self.handedness
    }

    pub fn eye_positions(&self) -> Option<EyePositions> {
        self.eye_positions
    }
}

/// Joins the hand and face streams and runs the signal components
#[derive(Debug, Default)]
pub struct FrameAggregator {
    classifier: GestureClassifier,
    cursor: CursorMapper,
    eyes: EyePositionExtractor,
    motion: MotionTracker,
    latest_face: Option<FaceLandmarks>,
    last_gesture: GestureCategory,
}

impl FrameAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch one detection event. Only hand events yield a result.
    pub fn handle(&mut self, event: DetectionEvent) -> Option<SignalResult> {
        match event {
            DetectionEvent::Hand(detection) => Some(self.on_hand(detection)),
            DetectionEvent::Face(detection) => {
                self.on_face(detection);
                None
            }
        }
    }

    pub fn on_hand(&mut self, detection: HandDetection) -> SignalResult {
        let eye_positions = self.eyes.extract(self.latest_face.as_ref());

        let Some(hand) = detection.hand else {
            self.motion.reset();
            self.note_gesture(GestureCategory::Idle);
            return SignalResult::no_hand(eye_positions);
        };

        let gesture = self.classifier.classify(&hand.landmarks);
        let cursor = self.cursor.project(&hand.landmarks);
        let velocity = self
            .motion
            .update(Some(&hand.landmarks), detection.timestamp);
        self.note_gesture(gesture);

        SignalResult::hand(
            hand.landmarks,
            cursor,
            gesture,
            velocity,
            hand.handedness.unwrap_or_default(),
            eye_positions,
        )
    }

    /// Overwrite the face cache; an event without a face clears it
    pub fn on_face(&mut self, detection: FaceDetection) {
        self.latest_face = detection.face;
    }

    /// Drop the previous frame and the cached face
    pub fn reset(&mut self) {
        self.motion.reset();
        self.latest_face = None;
        self.last_gesture = GestureCategory::Idle;
    }

    pub fn motion(&self) -> &MotionTracker {
        &self.motion
    }

    pub fn has_face(&self) -> bool {
        self.latest_face.is_some()
    }

    fn note_gesture(&mut self, gesture: GestureCategory) {
        if gesture != self.last_gesture {
            tracing::debug!("Gesture change: {} -> {}", self.last_gesture, gesture);
            self.last_gesture = gesture;
        }
    }
}
