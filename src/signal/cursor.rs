//! Cursor projection from the index fingertip

use serde::{Deserialize, Serialize};

use crate::landmarks::{HandLandmarks, INDEX_TIP};

/// Normalized 2D position (0-1 relative to the image frame)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

/// Maps a hand to a cursor position. The fingertip coordinates are passed
/// through unchanged: no scaling, no smoothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorMapper;

impl CursorMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn project(&self, hand: &HandLandmarks) -> CursorPosition {
        let tip = hand.point(INDEX_TIP);
        CursorPosition { x: tip.x, y: tip.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::test_support::fist;
    use crate::landmarks::Point3;

    #[test]
    fn test_projects_index_tip() {
        let hand = fist().with_point(INDEX_TIP, Point3::new(0.25, 0.75, -0.4));
        let cursor = CursorMapper::new().project(&hand);
        assert_eq!(cursor, CursorPosition { x: 0.25, y: 0.75 });
    }
}
