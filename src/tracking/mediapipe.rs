//! MediaPipe hand/face landmark receiver
//!
//! Receives JSON-over-UDP packets from the `scripts/hand_tracker.py` helper,
//! which runs the MediaPipe hand and face landmarkers on the camera stream.
//! Hand and face results are sent as separate packets as soon as each model
//! finishes a frame:
//!
//! ```json
//! {"type":"hand","hand_detected":true,"landmarks":[[0.5,0.8,0.0], ...],"handedness":"Right"}
//! {"type":"face","face_detected":true,"landmarks":[[0.41,0.3,-0.02], ...]}
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::TrackingConfig;
use crate::error::{HandSignalError, TrackingError};
use crate::landmarks::{FaceLandmarks, HandLandmarks, Handedness, Point3};
use crate::tracking::subprocess::TrackerSubprocess;
use crate::tracking::{DetectedHand, DetectionEvent, DetectionSource, FaceDetection, HandDetection};

/// A single JSON packet from the MediaPipe tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MpPacket {
    Hand(HandPacket),
    Face(FacePacket),
}

/// Hand landmarker result for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPacket {
    /// Whether a hand was detected this frame
    pub hand_detected: bool,
    /// 21 landmarks as [x, y, z]
    #[serde(default)]
    pub landmarks: Vec<[f64; 3]>,
    /// "Left" / "Right" when the model reports it
    #[serde(default)]
    pub handedness: Option<String>,
}

/// Face landmarker result for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacePacket {
    /// Whether a face was detected this frame
    pub face_detected: bool,
    /// Face mesh landmarks as [x, y, z]
    #[serde(default)]
    pub landmarks: Vec<[f64; 3]>,
}

impl MpPacket {
    /// Convert into a detection event stamped with `timestamp`.
    ///
    /// Landmarks are ignored when the packet reports no detection; a detection
    /// with a wrong-sized landmark set is rejected.
    pub fn into_event(self, timestamp: Instant) -> Result<DetectionEvent, TrackingError> {
        match self {
            MpPacket::Hand(packet) => {
                let hand = if packet.hand_detected {
                    let points: Vec<Point3> = packet.landmarks.into_iter().map(Point3::from).collect();
                    Some(DetectedHand {
                        landmarks: HandLandmarks::try_from(points)?,
                        handedness: packet
                            .handedness
                            .as_deref()
                            .map(|label| Handedness::from_label(Some(label))),
                    })
                } else {
                    None
                };
                Ok(DetectionEvent::Hand(HandDetection { hand, timestamp }))
            }
            MpPacket::Face(packet) => {
                let face = if packet.face_detected {
                    let points = packet.landmarks.into_iter().map(Point3::from).collect();
                    Some(FaceLandmarks::new(points)?)
                } else {
                    None
                };
                Ok(DetectionEvent::Face(FaceDetection { face, timestamp }))
            }
        }
    }
}

/// Decode one datagram into an event stamped with its arrival time
pub fn decode_packet(bytes: &[u8]) -> Result<DetectionEvent, TrackingError> {
    let packet: MpPacket = serde_json::from_slice(bytes)
        .map_err(|e| TrackingError::Parse(format!("JSON parse error: {}", e)))?;
    packet.into_event(Instant::now())
}

/// Decode a datagram for the live stream.
///
/// A face packet with a truncated mesh becomes "no face" so the cached eyes
/// do not outlive the face they came from. Everything else malformed is an error.
fn decode_datagram(bytes: &[u8]) -> Result<DetectionEvent, TrackingError> {
    match decode_packet(bytes) {
        Err(TrackingError::MalformedLandmarks {
            kind: "face",
            actual,
            ..
        }) => {
            tracing::warn!("Face packet with {} landmarks treated as no face", actual);
            Ok(DetectionEvent::Face(FaceDetection {
                face: None,
                timestamp: Instant::now(),
            }))
        }
        other => other,
    }
}

/// Outcome of one tracker health check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrackerHealth {
    Running,
    Restarted,
    Down,
    ShuttingDown,
}

/// Relaunch the helper after `restart_delay_secs` if it exited and
/// `auto_restart` is set. The delay is cut short by shutdown.
pub(crate) async fn supervise_tracker(
    sp: &mut TrackerSubprocess,
    config: &TrackingConfig,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> TrackerHealth {
    if sp.is_running() {
        return TrackerHealth::Running;
    }
    if !config.auto_restart {
        return TrackerHealth::Down;
    }

    tracing::info!(
        "Tracker subprocess crashed, restarting in {}s",
        config.restart_delay_secs
    );
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(config.restart_delay_secs)) => {}
        _ = &mut *shutdown_rx => return TrackerHealth::ShuttingDown,
    }

    match sp.start() {
        Ok(()) => TrackerHealth::Restarted,
        Err(e) => {
            tracing::error!("Failed to restart tracker: {}", e);
            TrackerHealth::Down
        }
    }
}

/// MediaPipe JSON-over-UDP detection source
pub struct MediaPipeSource {
    config: TrackingConfig,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MediaPipeSource {
    /// Create a new MediaPipe source (does not bind or launch yet)
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            config: config.clone(),
            local_addr: None,
            shutdown_tx: None,
            task: None,
        }
    }

    /// Address the UDP socket is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Launch the helper and wait out its startup grace period.
    ///
    /// A helper that already exited by then could not open the camera or load
    /// its models.
    async fn launch_tracker(&self) -> Result<TrackerSubprocess, HandSignalError> {
        let mut sp = TrackerSubprocess::new(&self.config);
        sp.start()?;

        tokio::time::sleep(Duration::from_millis(self.config.startup_grace_ms)).await;

        if !sp.is_running() {
            return Err(TrackingError::Startup(format!(
                "tracker '{}' exited during startup (camera or model unavailable)",
                self.config.tracker_script
            ))
            .into());
        }
        Ok(sp)
    }
}

#[async_trait]
impl DetectionSource for MediaPipeSource {
    fn name(&self) -> &str {
        "mediapipe"
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<DetectionEvent>, HandSignalError> {
        let subprocess = if self.config.auto_launch {
            Some(self.launch_tracker().await?)
        } else {
            None
        };

        let addr = format!("{}:{}", self.config.listen_address, self.config.port);
        let socket = UdpSocket::bind(&addr).await.map_err(|e| {
            TrackingError::Receiver(format!("Failed to bind to {}: {}", addr, e))
        })?;
        self.local_addr = socket.local_addr().ok();

        tracing::info!(
            "MediaPipe receiver listening on {} (auto_launch: {}, face: {})",
            addr,
            self.config.auto_launch,
            self.config.enable_face
        );

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(tokio::spawn(receive_loop(
            socket,
            tx,
            shutdown_rx,
            subprocess,
            self.config.clone(),
        )));

        Ok(rx)
    }

    async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.local_addr = None;
        tracing::info!("MediaPipe receiver stopped");
    }
}

async fn receive_loop(
    socket: UdpSocket,
    tx: mpsc::Sender<DetectionEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
    mut subprocess: Option<TrackerSubprocess>,
    config: TrackingConfig,
) {
    let mut buf = vec![0u8; 65536];
    let mut health_check = tokio::time::interval(Duration::from_secs(1));
    let mut dropped: u64 = 0;

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((size, _peer)) => match decode_datagram(&buf[..size]) {
                        Ok(event) => {
                            if tx.send(event).await.is_err() {
                                tracing::debug!("Detection consumer dropped, stopping receiver");
                                break;
                            }
                        }
                        Err(e) => {
                            dropped += 1;
                            tracing::warn!("Dropping MediaPipe packet ({} so far): {}", dropped, e);
                        }
                    },
                    Err(e) => {
                        tracing::error!("MediaPipe receive error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
            _ = health_check.tick() => {
                if let Some(ref mut sp) = subprocess {
                    if supervise_tracker(sp, &config, &mut shutdown_rx).await
                        == TrackerHealth::ShuttingDown
                    {
                        tracing::info!("MediaPipe tracking shutting down");
                        break;
                    }
                }
            }
            _ = &mut shutdown_rx => {
                tracing::info!("MediaPipe tracking shutting down");
                break;
            }
        }
    }

    if let Some(ref mut sp) = subprocess {
        sp.stop().await;
    }
}
