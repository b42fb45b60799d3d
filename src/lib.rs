//! handsignal - hand and face landmark control signals
//!
//! Turns per-frame MediaPipe hand and face landmarks into a control signal
//! for interactive visual effects:
//! - Gesture category from finger extension and pinch geometry
//! - Wrist velocity between consecutive hand frames
//! - Cursor position from the index fingertip
//! - Eye positions from the face mesh
//! - Latest-value join of the asynchronous hand and face streams
//!
//! Results are delivered to a callback and, in the binary, served over
//! HTTP/SSE for a browser effects layer.
//!
//! Landmarks come from an external producer that runs the MediaPipe hand and
//! face landmarkers and sends one JSON object per UDP datagram to
//! `tracking.listen_address:tracking.port`:
//!
//! ```json
//! {"type":"hand","hand_detected":true,"landmarks":[[x,y,z], ...21],"handedness":"Right"}
//! {"type":"face","face_detected":true,"landmarks":[[x,y,z], ...]}
//! ```
//!
//! No producer ships with this crate. With `tracking.auto_launch` set, the
//! receiver starts `tracking.python tracking.tracker_script` itself; otherwise
//! it only listens. `--replay` feeds a JSON-lines recording instead.

pub mod config;
pub mod error;
pub mod landmarks;
pub mod output;
pub mod pipeline;
pub mod signal;
pub mod tracking;
pub mod web;

pub use config::Config;
pub use error::{HandSignalError, Result};
pub use pipeline::SignalPipeline;
pub use signal::SignalResult;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};

/// Application state shared between the pipeline callback and the web server
#[derive(Debug)]
pub struct AppState {
    /// Current configuration
    pub config: RwLock<Config>,
    /// Most recent result
    latest_tx: watch::Sender<Option<SignalResult>>,
    /// Result stream for SSE subscribers
    result_tx: broadcast::Sender<SignalResult>,
    /// Shutdown signal
    shutdown_tx: broadcast::Sender<()>,
    /// Whether a detection source is currently feeding the pipeline
    tracking_active: AtomicBool,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let (latest_tx, _) = watch::channel(None);
        let (result_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);

        Arc::new(Self {
            config: RwLock::new(config),
            latest_tx,
            result_tx,
            shutdown_tx,
            tracking_active: AtomicBool::new(false),
        })
    }

    /// Record a new result and fan it out to stream subscribers.
    ///
    /// Non-blocking, so it can be called straight from the pipeline callback.
    pub fn publish_result(&self, result: SignalResult) {
        self.latest_tx.send_replace(Some(result.clone()));
        // No subscribers is fine
        let _ = self.result_tx.send(result);
    }

    /// Get the most recent result, if any
    pub fn latest_result(&self) -> Option<SignalResult> {
        self.latest_tx.borrow().clone()
    }

    /// Subscribe to every published result
    pub fn subscribe_results(&self) -> broadcast::Receiver<SignalResult> {
        self.result_tx.subscribe()
    }

    /// Number of live result stream subscribers
    pub fn subscriber_count(&self) -> usize {
        self.result_tx.receiver_count()
    }

    /// Subscribe to shutdown signal
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    pub fn set_tracking_active(&self, active: bool) {
        self.tracking_active.store(active, Ordering::Relaxed);
    }

    pub fn tracking_active(&self) -> bool {
        self.tracking_active.load(Ordering::Relaxed)
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::EyePositions;

    #[tokio::test]
    async fn test_publish_updates_latest_and_stream() {
        let state = AppState::new(Config::default());
        assert!(state.latest_result().is_none());

        let mut rx = state.subscribe_results();
        let result = SignalResult::no_hand(None::<EyePositions>);
        state.publish_result(result.clone());

        assert_eq!(state.latest_result(), Some(result.clone()));
        assert_eq!(rx.recv().await.unwrap(), result);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let state = AppState::new(Config::default());
        state.publish_result(SignalResult::no_hand(None));
        assert!(state.latest_result().is_some());
    }
}
