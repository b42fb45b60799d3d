//! Signal derivation
//!
//! Turns landmark frames into the control signal consumed by effects:
//! - Gesture classification from finger geometry
//! - Wrist velocity from the previous frame
//! - Cursor position from the index fingertip
//! - Eye positions from the face mesh
//! - Latest-value join of the hand and face streams

pub mod aggregator;
pub mod cursor;
pub mod eyes;
pub mod gesture;
pub mod motion;

pub use aggregator::{FrameAggregator, SignalResult};
pub use cursor::{CursorMapper, CursorPosition};
pub use eyes::{EyePositionExtractor, EyePositions};
pub use gesture::{FingerState, GestureCategory, GestureClassifier};
pub use motion::{MotionState, MotionTracker};
