//! HTTP server module
//!
//! JSON status/result endpoints and the SSE result stream.

pub mod api;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::HttpConfig;
use crate::error::{HandSignalError, WebError};
use crate::AppState;

/// Web server for the API and result stream
pub struct WebServer {
    app_state: Arc<AppState>,
    config: HttpConfig,
}

impl WebServer {
    /// Create a new web server
    pub fn new(app_state: Arc<AppState>, config: &HttpConfig) -> Self {
        Self {
            app_state,
            config: config.clone(),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        routes::create_router(Arc::clone(&self.app_state), &self.config)
    }

    /// Bind and serve until the application shutdown signal fires
    pub async fn serve(self) -> Result<(), HandSignalError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| WebError::Bind(format!("{}: {}", addr, e)))?;

        tracing::info!("HTTP server listening on http://{}", addr);
        tracing::info!("  SSE stream: http://{}/api/stream", addr);

        let mut shutdown_rx = self.app_state.subscribe_shutdown();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
            .map_err(|e| WebError::Startup(e.to_string()))?;

        Ok(())
    }
}
