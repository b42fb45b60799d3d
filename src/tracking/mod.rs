//! Tracking module
//!
//! Detection sources feeding the signal layer:
//! - MediaPipe hand/face landmarker helper (JSON over UDP)
//! - Recorded packet replay for offline runs and tests
//!
//! Sources deliver [`DetectionEvent`]s over an mpsc channel. Hand and face
//! events arrive independently and may interleave in any order.

pub mod mediapipe;
pub mod replay;
pub mod subprocess;

use async_trait::async_trait;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::error::HandSignalError;
use crate::landmarks::{FaceLandmarks, HandLandmarks, Handedness};

/// A hand found in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedHand {
    pub landmarks: HandLandmarks,
    /// Upstream label, if the model reported one
    pub handedness: Option<Handedness>,
}

/// Outcome of the hand landmarker for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct HandDetection {
    pub hand: Option<DetectedHand>,
    pub timestamp: Instant,
}

/// Outcome of the face landmarker for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetection {
    pub face: Option<FaceLandmarks>,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    Hand(HandDetection),
    Face(FaceDetection),
}

impl DetectionEvent {
    pub fn timestamp(&self) -> Instant {
        match self {
            DetectionEvent::Hand(d) => d.timestamp,
            DetectionEvent::Face(d) => d.timestamp,
        }
    }
}

/// An external landmark producer (camera + estimation model).
///
/// `start` must fail before delivering any event if the model or camera cannot
/// be initialized. After `stop` returns the source sends nothing further.
#[async_trait]
pub trait DetectionSource: Send {
    fn name(&self) -> &str;

    async fn start(&mut self) -> Result<mpsc::Receiver<DetectionEvent>, HandSignalError>;

    async fn stop(&mut self);
}
