//! Rule-based hand gesture classification
//!
//! Works purely on landmark geometry of a single frame: each finger is either
//! extended or curled depending on how far its tip reaches from the wrist
//! relative to its knuckle, and the resulting finger pattern is matched against
//! an ordered list of gestures.

use serde::{Deserialize, Serialize};

use crate::landmarks::{
    HandLandmarks, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP, RING_MCP,
    RING_TIP, THUMB_MCP, THUMB_TIP, WRIST,
};

/// Tip must reach this many times the wrist-to-MCP distance for a finger to count as extended
pub const FINGER_EXTENSION_RATIO: f64 = 1.1;

/// Thumb uses a looser joint chain, so it needs a larger reach to count as extended
pub const THUMB_EXTENSION_RATIO: f64 = 1.3;

/// Thumb tip and index tip closer than this (3D, normalized units) form a pinch
pub const PINCH_THRESHOLD: f64 = 0.03;

/// Detected gesture types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureCategory {
    #[default]
    Idle,
    Pinch,
    Pointing,
    Peace,
    OpenPalm,
    ClosedFist,
    ThumbsUp,
    ThumbsDown,
}

impl GestureCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Pinch => "PINCH",
            Self::Pointing => "POINTING",
            Self::Peace => "PEACE",
            Self::OpenPalm => "OPEN_PALM",
            Self::ClosedFist => "CLOSED_FIST",
            Self::ThumbsUp => "THUMBS_UP",
            Self::ThumbsDown => "THUMBS_DOWN",
        }
    }
}

impl std::fmt::Display for GestureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-finger extension state of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub fn from_hand(hand: &HandLandmarks) -> Self {
        Self {
            thumb: is_extended(hand, THUMB_MCP, THUMB_TIP, THUMB_EXTENSION_RATIO),
            index: is_extended(hand, INDEX_MCP, INDEX_TIP, FINGER_EXTENSION_RATIO),
            middle: is_extended(hand, MIDDLE_MCP, MIDDLE_TIP, FINGER_EXTENSION_RATIO),
            ring: is_extended(hand, RING_MCP, RING_TIP, FINGER_EXTENSION_RATIO),
            pinky: is_extended(hand, PINKY_MCP, PINKY_TIP, FINGER_EXTENSION_RATIO),
        }
    }

    /// Number of extended fingers, thumb excluded (0-4)
    pub fn extended_count(&self) -> usize {
        [self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|extended| **extended)
            .count()
    }
}

/// Tip-to-wrist reach compared against knuckle-to-wrist reach, in the image plane
fn is_extended(hand: &HandLandmarks, mcp: usize, tip: usize, ratio: f64) -> bool {
    let wrist = hand.point(WRIST);
    let tip_to_wrist = hand.point(tip).planar_distance(&wrist);
    let mcp_to_wrist = hand.point(mcp).planar_distance(&wrist);
    tip_to_wrist > mcp_to_wrist * ratio
}

fn is_pinching(hand: &HandLandmarks) -> bool {
    hand.point(THUMB_TIP).distance(&hand.point(INDEX_TIP)) < PINCH_THRESHOLD
}

/// Stateless gesture classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier;

impl GestureClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a complete hand. First matching rule wins.
    pub fn classify(&self, hand: &HandLandmarks) -> GestureCategory {
        let fingers = FingerState::from_hand(hand);
        let extended = fingers.extended_count();

        if is_pinching(hand) && fingers.index && extended <= 1 {
            return GestureCategory::Pinch;
        }

        if fingers.index && !fingers.middle && !fingers.ring && !fingers.pinky {
            return GestureCategory::Pointing;
        }

        if fingers.index && fingers.middle && !fingers.ring && !fingers.pinky {
            return GestureCategory::Peace;
        }

        if extended >= 4 {
            return GestureCategory::OpenPalm;
        }

        if extended == 0 && !fingers.thumb {
            return GestureCategory::ClosedFist;
        }

        if fingers.thumb && extended == 0 {
            // Image y grows downward: "up" is a smaller y than the wrist
            let thumb_y = hand.point(THUMB_TIP).y;
            let wrist_y = hand.point(WRIST).y;
            if thumb_y < wrist_y {
                return GestureCategory::ThumbsUp;
            }
            if thumb_y > wrist_y {
                return GestureCategory::ThumbsDown;
            }
        }

        GestureCategory::Idle
    }
}
