//! Error types for handsignal

use thiserror::Error;

/// Main error type for handsignal
#[derive(Error, Debug)]
pub enum HandSignalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Web server error: {0}")]
    Web(#[from] WebError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised by detection sources (MediaPipe receiver, helper process, replay)
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Receiver error: {0}")]
    Receiver(String),

    #[error("Packet parse error: {0}")]
    Parse(String),

    #[error("Malformed {kind} landmarks: expected {expected} points, got {actual}")]
    MalformedLandmarks {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Tracker subprocess error: {0}")]
    Subprocess(String),

    #[error("Tracker failed to start: {0}")]
    Startup(String),
}

/// Pipeline lifecycle errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline is already running")]
    AlreadyRunning,
}

/// Web server errors
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    #[error("Server startup failed: {0}")]
    Startup(String),
}

/// Result type alias for handsignal operations
pub type Result<T> = std::result::Result<T, HandSignalError>;
