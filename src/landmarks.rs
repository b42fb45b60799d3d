//! Landmark data model shared by the signal layer and the detection sources.
//!
//! Coordinates follow the MediaPipe convention: `x`/`y` are normalized to the
//! image frame (y grows downward) and `z` is a relative depth where smaller
//! values are closer to the camera.

use serde::{Deserialize, Serialize};

use crate::error::TrackingError;

// ============================================================================
// HAND LANDMARK INDICES (MediaPipe Hands - 21 total)
// ============================================================================

pub const HAND_LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

// ============================================================================
// FACE LANDMARK INDICES (MediaPipe Face Mesh)
// ============================================================================

/// Upper lid of the left eye
pub const LEFT_EYE: usize = 159;
/// Upper lid of the right eye
pub const RIGHT_EYE: usize = 386;
/// Smallest face mesh that still contains both eye references
pub const FACE_MIN_LANDMARKS: usize = RIGHT_EYE + 1;

/// A single 3D landmark point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64, // 0-1 normalized
    pub y: f64, // 0-1 normalized
    pub z: f64, // Relative depth
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in the image plane, ignoring depth
    pub fn planar_distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Full 3D Euclidean distance
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// A complete hand: always exactly 21 landmarks.
///
/// "No hand" is modelled as `Option<HandLandmarks>::None` by callers, never as
/// a partial set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks([Point3; HAND_LANDMARK_COUNT]);

impl HandLandmarks {
    pub fn new(points: [Point3; HAND_LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    pub fn point(&self, index: usize) -> Point3 {
        self.0[index]
    }

    pub fn wrist(&self) -> Point3 {
        self.0[WRIST]
    }

    /// Return a copy with one landmark replaced
    pub fn with_point(mut self, index: usize, point: Point3) -> Self {
        self.0[index] = point;
        self
    }
}

impl TryFrom<Vec<Point3>> for HandLandmarks {
    type Error = TrackingError;

    fn try_from(points: Vec<Point3>) -> Result<Self, Self::Error> {
        let actual = points.len();
        let points: [Point3; HAND_LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| TrackingError::MalformedLandmarks {
                    kind: "hand",
                    expected: HAND_LANDMARK_COUNT,
                    actual,
                })?;
        Ok(Self(points))
    }
}

/// A face mesh guaranteed to contain both eye reference points
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FaceLandmarks(Vec<Point3>);

impl FaceLandmarks {
    pub fn new(points: Vec<Point3>) -> Result<Self, TrackingError> {
        if points.len() < FACE_MIN_LANDMARKS {
            return Err(TrackingError::MalformedLandmarks {
                kind: "face",
                expected: FACE_MIN_LANDMARKS,
                actual: points.len(),
            });
        }
        Ok(Self(points))
    }

    pub fn point(&self, index: usize) -> Point3 {
        self.0[index]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which hand the upstream model believes it saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    /// Map an optional upstream label; anything other than Left/Right is Unknown
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some(l) if l.eq_ignore_ascii_case("left") => Self::Left,
            Some(l) if l.eq_ignore_ascii_case("right") => Self::Right,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handedness::Left => write!(f, "Left"),
            Handedness::Right => write!(f, "Right"),
            Handedness::Unknown => write!(f, "Unknown"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_requires_exactly_21_points() {
        let short = vec![Point3::default(); 20];
        let err = HandLandmarks::try_from(short).unwrap_err();
        assert!(matches!(
            err,
            TrackingError::MalformedLandmarks {
                kind: "hand",
                expected: 21,
                actual: 20
            }
        ));

        let long = vec![Point3::default(); 22];
        assert!(HandLandmarks::try_from(long).is_err());

        let exact = vec![Point3::new(0.1, 0.2, 0.3); 21];
        let hand = HandLandmarks::try_from(exact).unwrap();
        assert_eq!(hand.point(PINKY_TIP), Point3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_face_requires_eye_indices() {
        assert!(FaceLandmarks::new(vec![Point3::default(); RIGHT_EYE]).is_err());
        let face = FaceLandmarks::new(vec![Point3::default(); 468]).unwrap();
        assert_eq!(face.len(), 468);
    }

    #[test]
    fn test_planar_distance_ignores_depth() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.3, 0.4, 5.0);
        assert!((a.planar_distance(&b) - 0.5).abs() < 1e-6);
        assert!((a.distance(&b) - (0.25f64 + 25.0).sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_handedness_labels() {
        assert_eq!(Handedness::from_label(Some("Left")), Handedness::Left);
        assert_eq!(Handedness::from_label(Some("right")), Handedness::Right);
        assert_eq!(Handedness::from_label(Some("Ambidextrous")), Handedness::Unknown);
        assert_eq!(Handedness::from_label(None), Handedness::Unknown);
        assert_eq!(Handedness::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_hand_serializes_as_point_array() {
        let hand = test_support::fist();
        let json = serde_json::to_value(hand).unwrap();
        let points = json.as_array().unwrap();
        assert_eq!(points.len(), 21);
        assert!(points[0].get("x").is_some());
    }
}
