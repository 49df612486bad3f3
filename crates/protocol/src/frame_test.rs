//! Tests for the viewer wire frames

use serde_json::json;

use super::*;

#[test]
fn test_ping_wire_shape() {
    let frame = Frame::ping(1714557600123, json!({"status": "ok"}));
    let wire: serde_json::Value = serde_json::from_str(&frame.to_json()).unwrap();

    assert_eq!(wire["type"], "ping");
    assert_eq!(wire["data"]["timestamp"], 1714557600123i64);
    assert_eq!(wire["data"]["status"]["status"], "ok");
}

#[test]
fn test_message_wire_shape() {
    let event = json!({
        "timestamp": "2024-05-01T10:00:00",
        "hostname": "web-1",
        "log_level": "ERROR",
        "message": "boom"
    });
    let frame = Frame::message(event.clone());
    let wire: serde_json::Value = serde_json::from_str(&frame.to_json()).unwrap();

    assert_eq!(wire["type"], "message");
    assert_eq!(wire["data"], event);
}

#[test]
fn test_frame_round_trip() {
    let frame = Frame::ping(42, json!({"up": true}));
    let back: Frame = serde_json::from_str(&frame.to_json()).unwrap();
    assert_eq!(back, frame);

    let frame = Frame::message(json!({"message": "hi"}));
    let back: Frame = serde_json::from_str(&frame.to_json()).unwrap();
    assert_eq!(back, frame);
}
