//! Signal pipeline
//!
//! Connects a [`DetectionSource`] to the [`FrameAggregator`] and delivers one
//! [`SignalResult`] per hand event to the consumer callback.
//!
//! The aggregator (motion state + face cache) sits behind a single mutex so
//! the hand and face paths never observe each other half-updated.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::{HandSignalError, PipelineError};
use crate::signal::{FrameAggregator, SignalResult};
use crate::tracking::{DetectionEvent, DetectionSource};

/// Consumer callback invoked with every result
pub type ResultCallback = Arc<dyn Fn(SignalResult) + Send + Sync>;

/// Start/stop wrapper around a detection source and the aggregator
pub struct SignalPipeline {
    aggregator: Arc<Mutex<FrameAggregator>>,
    running: Arc<AtomicBool>,
    results_emitted: Arc<AtomicU64>,
    source: Option<Box<dyn DetectionSource>>,
    task: Option<JoinHandle<()>>,
}

impl Default for SignalPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalPipeline {
    pub fn new() -> Self {
        Self {
            aggregator: Arc::new(Mutex::new(FrameAggregator::new())),
            running: Arc::new(AtomicBool::new(false)),
            results_emitted: Arc::new(AtomicU64::new(0)),
            source: None,
            task: None,
        }
    }

    /// Start the source and begin delivering results.
    ///
    /// Source initialization errors are returned before `on_result` is ever
    /// called.
    pub async fn start<F>(
        &mut self,
        mut source: Box<dyn DetectionSource>,
        on_result: F,
    ) -> Result<(), HandSignalError>
    where
        F: Fn(SignalResult) + Send + Sync + 'static,
    {
        if self.is_running() {
            return Err(PipelineError::AlreadyRunning.into());
        }

        // A previous run that ended on its own still holds its source
        if self.source.is_some() || self.task.is_some() {
            self.stop().await;
        }

        let events = source.start().await?;
        tracing::info!("Signal pipeline started (source: {})", source.name());

        self.running.store(true, Ordering::SeqCst);
        self.source = Some(source);
        self.task = Some(tokio::spawn(run_events(
            events,
            Arc::clone(&self.aggregator),
            Arc::clone(&self.running),
            Arc::clone(&self.results_emitted),
            Arc::new(on_result),
        )));

        Ok(())
    }

    /// Stop delivering results, stop the source and clear previous-frame state.
    ///
    /// No result is delivered once this returns. The pipeline may be started
    /// again afterwards; velocity then starts from zero.
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }

        if let Some(mut source) = self.source.take() {
            source.stop().await;
        }

        self.aggregator.lock().await.reset();
        tracing::info!("Signal pipeline stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Total results delivered since creation
    pub fn results_emitted(&self) -> u64 {
        self.results_emitted.load(Ordering::Relaxed)
    }

    /// Wait until the source runs out of events (replays) or the pipeline is stopped
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let _ = task.await;
            self.task = None;
        }
    }
}

async fn run_events(
    mut events: mpsc::Receiver<DetectionEvent>,
    aggregator: Arc<Mutex<FrameAggregator>>,
    running: Arc<AtomicBool>,
    results_emitted: Arc<AtomicU64>,
    on_result: ResultCallback,
) {
    while let Some(event) = events.recv().await {
        let mut aggregator = aggregator.lock().await;
        if !running.load(Ordering::SeqCst) {
            break;
        }
        if let Some(result) = aggregator.handle(event) {
            results_emitted.fetch_add(1, Ordering::Relaxed);
            on_result(result);
        }
    }
    running.store(false, Ordering::SeqCst);
    tracing::debug!("Detection event stream closed");
}
