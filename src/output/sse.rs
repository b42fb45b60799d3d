//! Server-Sent Events for real-time signal updates

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::signal::SignalResult;
use crate::AppState;

/// SSE event name carrying a serialized result
pub const SIGNAL_EVENT: &str = "signal";

/// Create an SSE stream of signal results
pub fn create_result_stream(
    app_state: Arc<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = app_state.subscribe_results();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(result) => result_to_event(&result).map(Ok),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Convert a result to an SSE event
fn result_to_event(result: &SignalResult) -> Option<Event> {
    match serde_json::to_string(result) {
        Ok(data) => Some(Event::default().event(SIGNAL_EVENT).data(data)),
        Err(e) => {
            tracing::error!("Failed to serialize signal result: {}", e);
            None
        }
    }
}
