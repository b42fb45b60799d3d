//! Recorded landmark replay
//!
//! Plays back a recording of MediaPipe packets as a detection source. Useful
//! for offline runs and as a deterministic stand-in for the camera in tests.
//!
//! Recordings are JSON lines, one frame per line:
//!
//! ```json
//! {"offset_ms":0,"packet":{"type":"hand","hand_detected":false}}
//! {"offset_ms":33,"packet":{"type":"face","face_detected":false}}
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{HandSignalError, TrackingError};
use crate::tracking::mediapipe::MpPacket;
use crate::tracking::{DetectionEvent, DetectionSource};

/// One recorded packet and its offset from the start of the recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub offset_ms: u64,
    pub packet: MpPacket,
}

/// Parse a JSON-lines recording. Blank lines and `#` comments are skipped.
pub fn parse_recording(contents: &str) -> Result<Vec<ReplayFrame>, TrackingError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            serde_json::from_str(line)
                .map_err(|e| TrackingError::Parse(format!("line {}: {}", number + 1, e)))
        })
        .collect()
}

/// Detection source replaying recorded frames
pub struct ReplaySource {
    frames: Vec<ReplayFrame>,
    realtime: bool,
    channel_capacity: usize,
    task: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(frames: Vec<ReplayFrame>) -> Self {
        Self {
            frames,
            realtime: false,
            channel_capacity: 64,
            task: None,
        }
    }

    /// Load a JSON-lines recording from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HandSignalError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            TrackingError::Receiver(format!(
                "Failed to read recording {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self::new(parse_recording(&contents)?))
    }

    /// Sleep until each frame's offset instead of replaying as fast as possible
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl DetectionSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<DetectionEvent>, HandSignalError> {
        // Convert everything up front so a bad recording fails before any event
        let base = Instant::now();
        let events = self
            .frames
            .iter()
            .cloned()
            .map(|frame| {
                let offset = Duration::from_millis(frame.offset_ms);
                frame
                    .packet
                    .into_event((base + offset).into_std())
                    .map(|event| (offset, event))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Replaying {} recorded frames (realtime: {})",
            events.len(),
            self.realtime
        );

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let realtime = self.realtime;
        self.task = Some(tokio::spawn(async move {
            for (offset, event) in events {
                if realtime {
                    tokio::time::sleep_until(base + offset).await;
                }
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            tracing::debug!("Replay finished");
        }));

        Ok(rx)
    }

    async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}
