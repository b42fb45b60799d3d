//! Tracker subprocess manager
//!
//! Launches the MediaPipe hand/face landmarker helper (`scripts/hand_tracker.py`)
//! as a child process with automatic cleanup on drop. The helper owns the
//! camera and the estimation models and streams JSON packets back over UDP.

use tokio::process::{Child, Command};

use crate::config::TrackingConfig;
use crate::error::{HandSignalError, TrackingError};

/// Manages the MediaPipe tracker subprocess
pub struct TrackerSubprocess {
    child: Option<Child>,
    config: TrackingConfig,
    launches: u32,
}

impl TrackerSubprocess {
    /// Create a new subprocess manager (does not start the process)
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            child: None,
            config: config.clone(),
            launches: 0,
        }
    }

    /// Command-line arguments passed to the tracker script
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            self.config.tracker_script.clone(),
            "--ip".to_string(),
            self.config.listen_address.clone(),
            "--port".to_string(),
            self.config.port.to_string(),
            "--capture".to_string(),
            self.config.camera_device.to_string(),
            "--width".to_string(),
            self.config.capture_width.to_string(),
            "--height".to_string(),
            self.config.capture_height.to_string(),
            "--fps".to_string(),
            self.config.capture_fps.to_string(),
            "--model-dir".to_string(),
            self.config.model_dir.clone(),
            "--max-hands".to_string(),
            "1".to_string(),
        ];
        if !self.config.enable_face {
            args.push("--no-face".to_string());
        }
        args
    }

    /// Launch the tracker subprocess.
    ///
    /// Runs: `<python> <tracker_script> --ip <listen_address> --port <port>
    ///        --capture <camera_device> --width <w> --height <h> --fps <fps>
    ///        --model-dir <model_dir> --max-hands 1 [--no-face]`
    pub fn start(&mut self) -> Result<(), HandSignalError> {
        if self.is_running() {
            return Ok(());
        }

        let child = Command::new(&self.config.python)
            .args(self.args())
            .kill_on_drop(true)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| {
                TrackingError::Subprocess(format!(
                    "Failed to launch tracker at '{}': {}",
                    self.config.tracker_script, e
                ))
            })?;

        tracing::info!(
            "Tracker subprocess started (pid: {:?}, camera: {}, port: {})",
            child.id(),
            self.config.camera_device,
            self.config.port,
        );

        self.child = Some(child);
        self.launches += 1;
        Ok(())
    }

    /// How many times the tracker has been launched, restarts included
    pub fn launches(&self) -> u32 {
        self.launches
    }

    /// Check if the subprocess is still running (non-blocking)
    pub fn is_running(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    tracing::warn!("Tracker subprocess exited with: {}", status);
                    self.child = None;
                    false
                }
                Err(e) => {
                    tracing::error!("Failed to check tracker subprocess status: {}", e);
                    false
                }
            },
            None => false,
        }
    }

    /// Stop the subprocess by killing it
    pub async fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            tracing::info!("Stopping tracker subprocess (pid: {:?})", child.id());
            let _ = child.kill().await;
            let _ = child.wait().await;
        }
    }
}

/// Check if the `mediapipe` Python package is available.
///
/// Runs `<python> -c "import mediapipe"` and returns true if it succeeds.
pub fn check_mediapipe_available(python: &str) -> bool {
    match std::process::Command::new(python)
        .args(["-c", "import mediapipe"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_config() {
        let config = TrackingConfig {
            port: 4000,
            camera_device: 2,
            enable_face: true,
            ..TrackingConfig::default()
        };
        let args = TrackerSubprocess::new(&config).args();
        assert_eq!(args[0], config.tracker_script);
        let port = args.iter().position(|a| a == "--port").unwrap();
        assert_eq!(args[port + 1], "4000");
        let capture = args.iter().position(|a| a == "--capture").unwrap();
        assert_eq!(args[capture + 1], "2");
        assert!(!args.contains(&"--no-face".to_string()));
    }

    #[test]
    fn test_args_without_face() {
        let config = TrackingConfig {
            enable_face: false,
            ..TrackingConfig::default()
        };
        let args = TrackerSubprocess::new(&config).args();
        assert_eq!(args.last().map(String::as_str), Some("--no-face"));
    }

    #[test]
    fn test_not_running_before_start() {
        let mut sp = TrackerSubprocess::new(&TrackingConfig::default());
        assert!(!sp.is_running());
        assert_eq!(sp.launches(), 0);
    }

    #[tokio::test]
    async fn test_missing_interpreter_fails_launch() {
        let config = TrackingConfig {
            python: "/nonexistent/python3".to_string(),
            ..TrackingConfig::default()
        };
        let mut sp = TrackerSubprocess::new(&config);
        assert!(matches!(
            sp.start().unwrap_err(),
            HandSignalError::Tracking(TrackingError::Subprocess(_))
        ));
        assert_eq!(sp.launches(), 0);
    }
}
