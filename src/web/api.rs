//! REST API endpoints

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::output::sse;
use crate::signal::SignalResult;
use crate::AppState;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub tracking_active: bool,
    pub hand_detected: bool,
    pub gesture: Option<String>,
    pub subscribers: usize,
}

/// Get current status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let latest = state.latest_result();

    ApiResponse::success(StatusResponse {
        version: crate::VERSION.to_string(),
        tracking_active: state.tracking_active(),
        hand_detected: latest.as_ref().is_some_and(SignalResult::hand_detected),
        gesture: latest
            .as_ref()
            .filter(|r| r.hand_detected())
            .map(|r| r.gesture().to_string()),
        subscribers: state.subscriber_count(),
    })
}

/// Get the most recent result (`null` before the first hand frame)
pub async fn get_result(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.latest_result())
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.read().await;
    Json(config.clone())
}

/// SSE stream of results
pub async fn result_stream(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    sse::create_result_stream(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::test_support::fist;
    use crate::landmarks::Handedness;
    use crate::signal::{CursorPosition, GestureCategory};
    use crate::Config;
    use axum::body::to_bytes;
    use axum::response::Response;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_result_is_null_before_first_frame() {
        let state = AppState::new(Config::default());
        let json = body_json(get_result(State(state)).await.into_response()).await;
        assert!(json.is_null());
    }

    #[tokio::test]
    async fn test_status_reports_latest_gesture() {
        let state = AppState::new(Config::default());
        state.set_tracking_active(true);
        state.publish_result(SignalResult::hand(
            fist(),
            CursorPosition { x: 0.5, y: 0.5 },
            GestureCategory::ClosedFist,
            0.0,
            Handedness::Right,
            None,
        ));

        let json = body_json(get_status(State(state)).await.into_response()).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["tracking_active"], true);
        assert_eq!(json["data"]["hand_detected"], true);
        assert_eq!(json["data"]["gesture"], "CLOSED_FIST");
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let state = AppState::new(Config::default());
        let json = body_json(get_config(State(state)).await.into_response()).await;
        assert_eq!(json["tracking"]["port"], 12347);
        assert_eq!(json["http"]["port"], 8090);
    }
}
