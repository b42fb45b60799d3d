//! Eye positions from the face mesh

use serde::{Deserialize, Serialize};

use crate::landmarks::{FaceLandmarks, LEFT_EYE, RIGHT_EYE};
use crate::signal::cursor::CursorPosition;

/// Normalized positions of both eye reference points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyePositions {
    pub left_eye: CursorPosition,
    pub right_eye: CursorPosition,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EyePositionExtractor;

impl EyePositionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// `None` when no face is available
    pub fn extract(&self, face: Option<&FaceLandmarks>) -> Option<EyePositions> {
        let face = face?;
        let left = face.point(LEFT_EYE);
        let right = face.point(RIGHT_EYE);
        Some(EyePositions {
            left_eye: CursorPosition { x: left.x, y: left.y },
            right_eye: CursorPosition { x: right.x, y: right.y },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::test_support::face;

    #[test]
    fn test_no_face() {
        assert!(EyePositionExtractor::new().extract(None).is_none());
    }

    #[test]
    fn test_reads_eye_indices() {
        let mesh = face((0.4, 0.3), (0.6, 0.31));
        let eyes = EyePositionExtractor::new().extract(Some(&mesh)).unwrap();
        assert_eq!(eyes.left_eye, CursorPosition { x: 0.4, y: 0.3 });
        assert_eq!(eyes.right_eye, CursorPosition { x: 0.6, y: 0.31 });
    }

    #[test]
    fn test_serializes_camel_case() {
        let mesh = face((0.4, 0.3), (0.6, 0.3));
        let eyes = EyePositionExtractor::new().extract(Some(&mesh)).unwrap();
        let json = serde_json::to_value(eyes).unwrap();
        assert!(json.get("leftEye").is_some());
        assert!(json.get("rightEye").is_some());
    }
}
