//! handsignal - hand and face landmark control signals
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use handsignal::{
    config::Config,
    tracking::{
        mediapipe::MediaPipeSource, replay::ReplaySource, subprocess::check_mediapipe_available,
        DetectionSource,
    },
    web::WebServer,
    AppState, SignalPipeline,
};

/// handsignal - gesture, cursor, velocity and eye signals from MediaPipe landmarks
#[derive(Parser, Debug)]
#[command(name = "handsignal", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable HTTP server
    #[arg(long)]
    no_http: bool,

    /// HTTP server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Replay a JSON-lines landmark recording instead of the camera
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Pace the replay by its recorded offsets
    #[arg(long, requires = "replay")]
    realtime: bool,

    /// Disable face tracking (no eye positions)
    #[arg(long)]
    no_face: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", handsignal::NAME, handsignal::VERSION);

    let config = load_config(&args)?;
    let state = AppState::new(config.clone());

    // Start HTTP server if enabled
    let http_task = if config.http.enabled {
        let server = WebServer::new(Arc::clone(&state), &config.http);
        Some(tokio::spawn(async move {
            if let Err(e) = server.serve().await {
                error!("HTTP server error: {}", e);
            }
        }))
    } else {
        info!("HTTP server disabled");
        None
    };

    let source: Box<dyn DetectionSource> = match &args.replay {
        Some(path) => Box::new(
            ReplaySource::from_file(path)?
                .realtime(args.realtime)
                .with_channel_capacity(config.tracking.channel_capacity),
        ),
        None => {
            if config.tracking.auto_launch && !check_mediapipe_available(&config.tracking.python) {
                warn!(
                    "{} cannot import mediapipe; the tracker will likely fail to start",
                    config.tracking.python
                );
            }
            Box::new(MediaPipeSource::new(&config.tracking))
        }
    };

    let mut pipeline = SignalPipeline::new();
    let sink = Arc::clone(&state);
    pipeline
        .start(source, move |result| sink.publish_result(result))
        .await?;
    state.set_tracking_active(true);

    if args.replay.is_some() {
        tokio::select! {
            _ = pipeline.finished() => {
                info!("Replay finished ({} results)", pipeline.results_emitted());
                if http_task.is_some() {
                    info!("Serving last result until shutdown");
                    shutdown_signal().await;
                }
            }
            _ = shutdown_signal() => {}
        }
    } else {
        shutdown_signal().await;
    }

    info!("Shutdown signal received");
    pipeline.stop().await;
    state.set_tracking_active(false);
    state.shutdown();

    if let Some(task) = http_task {
        let _ = task.await;
    }

    info!(
        "handsignal stopped ({} results emitted)",
        pipeline.results_emitted()
    );
    Ok(())
}

/// Load configuration and apply CLI overrides
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    if args.no_http {
        config.http.enabled = false;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if args.no_face {
        config.tracking.enable_face = false;
    }

    config.validate()?;

    info!(
        "Tracking: udp {}:{} (auto_launch: {}, face: {})",
        config.tracking.listen_address,
        config.tracking.port,
        config.tracking.auto_launch,
        config.tracking.enable_face
    );
    info!("HTTP server: {}", config.http.enabled);

    Ok(config)
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
