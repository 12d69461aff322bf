//! Tests for the record model

use super::*;
use serde_json::json;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[test]
fn test_decode_session() {
    let raw = json!({
        "id": "s-1",
        "startTime": "2026-08-01T10:00:00Z",
        "endTime": "2026-08-01T10:30:00Z",
        "userAnalyticsId": "u-9",
        "platform": "WindowsPlayer",
        "os": "Windows 11",
        "screenSize": "2560x1440"
    });

    let session: SessionRecord = decode_record(RecordKind::Session, raw).unwrap();
    assert_eq!(session.id, "s-1");
    assert_eq!(session.user_analytics_id, "u-9");
    assert!(session.is_ended());
    assert_eq!(session.length_seconds(), Some(1800.0));
    assert!(session.scenes.is_empty());
}

#[test]
fn test_decode_open_session() {
    let raw = json!({
        "id": "s-2",
        "startTime": "2026-08-01T10:00:00Z"
    });

    let session: SessionRecord = decode_record(RecordKind::Session, raw).unwrap();
    assert!(!session.is_ended());
    assert_eq!(session.length_seconds(), None);
}

#[test]
fn test_decode_scene() {
    let raw = json!({
        "id": "sc-1",
        "sessionId": "s-1",
        "startTime": "2026-08-01T10:01:00Z",
        "endTime": "2026-08-01T10:06:30Z",
        "name": "level_02",
        "loadTime": 2.5,
        "dropout": true
    });

    let scene: SceneRecord = decode_record(RecordKind::Scene, raw).unwrap();
    assert_eq!(scene.session_id, "s-1");
    assert_eq!(scene.name, "level_02");
    assert_eq!(scene.load_time, 2.5);
    assert!(scene.dropout);
    assert_eq!(scene.length_seconds(), 330.0);
}

#[test]
fn test_decode_event() {
    let raw = json!({
        "id": "e-1",
        "sceneId": "sc-1",
        "time": "2026-08-01T10:02:00Z",
        "name": "pickup",
        "data": {"item": "key", "count": 1},
        "type": "gameplay"
    });

    let event: EventRecord = decode_record(RecordKind::Event, raw).unwrap();
    assert_eq!(event.scene_id, "sc-1");
    assert_eq!(event.name, "pickup");
    assert_eq!(event.event_type, "gameplay");
    assert_eq!(event.data["item"], "key");
}

#[test]
fn test_decode_event_missing_optional_fields() {
    let raw = json!({
        "id": "e-2",
        "sceneId": "sc-1",
        "time": "2026-08-01T10:02:00Z",
        "name": "ping"
    });

    let event: EventRecord = decode_record(RecordKind::Event, raw).unwrap();
    assert!(event.event_type.is_empty());
    assert!(event.data.is_null());
}

#[test]
fn test_decode_error_names_kind() {
    let raw = json!({"startTime": "not-a-timestamp"});
    let err = decode_record::<SessionRecord>(RecordKind::Session, raw).unwrap_err();
    assert!(err.to_string().contains("session"));
}

#[test]
fn test_serialize_skips_empty_children() {
    let session = SessionRecord {
        id: "s-1".to_string(),
        start_time: ts("2026-08-01T10:00:00Z"),
        end_time: Some(ts("2026-08-01T10:30:00Z")),
        user_analytics_id: "u-1".to_string(),
        platform: "WebGLPlayer".to_string(),
        os: "macOS".to_string(),
        screen_size: "1440x900".to_string(),
        scenes: Vec::new(),
    };

    let value = serde_json::to_value(&session).unwrap();
    assert!(value.get("scenes").is_none());
    assert_eq!(value["startTime"], "2026-08-01T10:00:00Z");
}
