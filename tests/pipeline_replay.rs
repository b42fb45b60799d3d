//! End-to-end: recorded packets -> ReplaySource -> SignalPipeline -> AppState

use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;

use handsignal::signal::GestureCategory;
use handsignal::tracking::replay::ReplaySource;
use handsignal::{AppState, Config, SignalPipeline, SignalResult};

/// MCP offsets from the wrist for thumb, index, middle, ring, pinky
const MCP_OFFSETS: [(f64, f64); 5] = [
    (-0.10, -0.10),
    (-0.05, -0.20),
    (0.0, -0.21),
    (0.05, -0.20),
    (0.09, -0.17),
];

/// Hand with each finger either extended (tip twice as far as the MCP) or curled
fn hand_landmarks(wrist: (f64, f64), extended: [bool; 5]) -> Vec<[f64; 3]> {
    let mut points = vec![[wrist.0, wrist.1, 0.0]; 21];
    for (finger, &(dx, dy)) in MCP_OFFSETS.iter().enumerate() {
        let mcp = 1 + finger * 4 + if finger == 0 { 1 } else { 0 };
        let tip = 4 + finger * 4;
        let scale = if extended[finger] { 2.0 } else { 0.5 };
        points[mcp] = [wrist.0 + dx, wrist.1 + dy, 0.0];
        points[tip] = [wrist.0 + dx * scale, wrist.1 + dy * scale, 0.0];
    }
    points
}

fn face_landmarks() -> Vec<[f64; 3]> {
    let mut points = vec![[0.5, 0.5, 0.0]; 400];
    points[159] = [0.4, 0.3, 0.0];
    points[386] = [0.6, 0.3, 0.0];
    points
}

fn frame(offset_ms: u64, packet: Value) -> String {
    json!({ "offset_ms": offset_ms, "packet": packet }).to_string()
}

fn recording() -> tempfile::NamedTempFile {
    let lines = [
        frame(0, json!({"type": "face", "face_detected": true, "landmarks": face_landmarks()})),
        frame(
            10,
            json!({
                "type": "hand",
                "hand_detected": true,
                "landmarks": hand_landmarks((0.5, 0.8), [false; 5]),
                "handedness": "Right"
            }),
        ),
        frame(
            110,
            json!({
                "type": "hand",
                "hand_detected": true,
                "landmarks": hand_landmarks((0.5, 0.7), [false, true, false, false, false]),
                "handedness": "right"
            }),
        ),
        frame(150, json!({"type": "face", "face_detected": false})),
        frame(200, json!({"type": "hand", "hand_detected": false})),
    ];

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# pipeline fixture").unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

async fn run_replay(source: ReplaySource) -> (Arc<AppState>, Vec<SignalResult>) {
    let state = AppState::new(Config::default());
    let mut rx = state.subscribe_results();

    let mut pipeline = SignalPipeline::new();
    let sink = Arc::clone(&state);
    pipeline
        .start(Box::new(source), move |result| sink.publish_result(result))
        .await
        .unwrap();
    pipeline.finished().await;
    pipeline.stop().await;

    let mut results = Vec::new();
    while let Ok(result) = rx.try_recv() {
        results.push(result);
    }
    (state, results)
}

#[tokio::test]
async fn test_replay_produces_joined_results() {
    let file = recording();
    let source = ReplaySource::from_file(file.path()).unwrap();
    assert_eq!(source.len(), 5);

    let (state, results) = run_replay(source).await;
    assert_eq!(results.len(), 3, "one result per hand event");

    let first = &results[0];
    assert!(first.hand_detected());
    assert_eq!(first.gesture(), GestureCategory::ClosedFist);
    assert_eq!(first.velocity(), Some(0.0));
    let eyes = first.eye_positions().expect("face cached before first hand");
    assert!((eyes.left_eye.x - 0.4).abs() < 1e-6);
    assert!((eyes.right_eye.x - 0.6).abs() < 1e-6);

    let second = &results[1];
    assert_eq!(second.gesture(), GestureCategory::Pointing);
    // Wrist moved 0.1 in 100ms
    assert!((second.velocity().unwrap() - 1.0).abs() < 1e-3);
    let cursor = second.cursor_position().unwrap();
    assert!((cursor.x - 0.4).abs() < 1e-6);
    assert!((cursor.y - 0.3).abs() < 1e-6);

    let third = &results[2];
    assert!(!third.hand_detected());
    assert_eq!(third.gesture(), GestureCategory::Idle);
    assert!(third.eye_positions().is_none(), "face cleared by no-face event");

    assert_eq!(state.latest_result().as_ref(), Some(third));
}

#[tokio::test]
async fn test_result_json_shape() {
    let file = recording();
    let (_, results) = run_replay(ReplaySource::from_file(file.path()).unwrap()).await;

    let with_hand = serde_json::to_value(&results[1]).unwrap();
    assert_eq!(with_hand["handDetected"], true);
    assert_eq!(with_hand["gesture"], "POINTING");
    assert_eq!(with_hand["landmarks"].as_array().unwrap().len(), 21);
    assert!(with_hand["cursorPosition"]["x"].is_number());
    assert!(with_hand["eyePositions"]["leftEye"]["y"].is_number());
    assert!(with_hand.get("velocity").is_some());

    let without_hand = serde_json::to_value(&results[2]).unwrap();
    assert_eq!(without_hand["handDetected"], false);
    assert_eq!(without_hand["gesture"], "IDLE");
    assert!(without_hand.get("velocity").is_none());
    assert!(without_hand.get("handedness").is_none());
}

#[tokio::test]
async fn test_malformed_recording_fails_before_any_result() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "{}",
        frame(0, json!({"type": "hand", "hand_detected": false}))
    )
    .unwrap();
    writeln!(
        file,
        "{}",
        frame(
            5,
            json!({"type": "hand", "hand_detected": true, "landmarks": [[0.0, 0.0, 0.0]]})
        )
    )
    .unwrap();

    let state = AppState::new(Config::default());
    let sink = Arc::clone(&state);
    let mut pipeline = SignalPipeline::new();
    let source = ReplaySource::from_file(file.path()).unwrap();

    let result = pipeline
        .start(Box::new(source), move |r| sink.publish_result(r))
        .await;
    assert!(result.is_err());
    assert!(state.latest_result().is_none());
    assert_eq!(pipeline.results_emitted(), 0);
}
