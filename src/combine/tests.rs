//! Tests for the combiner

use super::*;
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn session(id: &str) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        start_time: ts("2026-08-01T10:00:00Z"),
        end_time: Some(ts("2026-08-01T10:30:00Z")),
        user_analytics_id: format!("user-{id}"),
        platform: "WindowsPlayer".to_string(),
        os: "Windows 11".to_string(),
        screen_size: "1920x1080".to_string(),
        scenes: Vec::new(),
    }
}

fn scene(id: &str, session_id: &str) -> SceneRecord {
    SceneRecord {
        id: id.to_string(),
        session_id: session_id.to_string(),
        start_time: ts("2026-08-01T10:01:00Z"),
        end_time: ts("2026-08-01T10:05:00Z"),
        name: format!("scene-{id}"),
        load_time: 1.5,
        dropout: false,
        events: Vec::new(),
    }
}

fn event(id: &str, scene_id: &str) -> EventRecord {
    EventRecord {
        id: id.to_string(),
        scene_id: scene_id.to_string(),
        time: ts("2026-08-01T10:02:00Z"),
        name: format!("event-{id}"),
        data: serde_json::Value::Null,
        event_type: "gameplay".to_string(),
    }
}

#[test]
fn test_combine_attaches_children_to_parents() {
    let sessions = vec![session("a"), session("b")];
    let scenes = vec![scene("a1", "a"), scene("b1", "b"), scene("a2", "a")];
    let events = vec![event("e1", "a1"), event("e2", "b1"), event("e3", "a1")];

    let output = combine(sessions, scenes, events);

    assert_eq!(output.sessions.len(), 2);
    let a = &output.sessions[0];
    assert_eq!(a.scenes.len(), 2);
    assert_eq!(a.scenes[0].id, "a1");
    assert_eq!(a.scenes[1].id, "a2");
    assert_eq!(a.scenes[0].events.len(), 2);
    assert_eq!(a.scenes[0].events[0].id, "e1");
    assert_eq!(a.scenes[0].events[1].id, "e3");
    assert!(a.scenes[1].events.is_empty());

    let b = &output.sessions[1];
    assert_eq!(b.scenes.len(), 1);
    assert_eq!(b.scenes[0].events.len(), 1);
    assert_eq!(b.scenes[0].events[0].id, "e2");

    assert_eq!(output.stats.sessions, 2);
    assert_eq!(output.stats.scenes_joined, 3);
    assert_eq!(output.stats.events_joined, 3);
    assert_eq!(output.stats.orphan_scenes, 0);
    assert_eq!(output.stats.orphan_events, 0);
}

#[test]
fn test_combine_no_cross_wiring() {
    let sessions = vec![session("a"), session("b")];
    let scenes = vec![scene("a1", "a"), scene("b1", "b")];
    let events = vec![event("e-b", "b1")];

    let output = combine(sessions, scenes, events);

    assert!(output.sessions[0].scenes[0].events.is_empty());
    assert_eq!(output.sessions[1].scenes[0].events[0].id, "e-b");
}

#[test]
fn test_combine_drops_orphan_scene_and_its_events() {
    let sessions = vec![session("a")];
    // "ghost" session was not extracted in this batch
    let scenes = vec![scene("a1", "a"), scene("x1", "ghost")];
    let events = vec![event("e1", "a1"), event("e2", "x1")];

    let output = combine(sessions, scenes, events);

    assert_eq!(output.sessions.len(), 1);
    assert_eq!(output.sessions[0].scenes.len(), 1);
    assert_eq!(output.sessions[0].scenes[0].id, "a1");

    // The orphan scene's event must not ride along anywhere.
    assert_eq!(output.sessions[0].scenes[0].events.len(), 1);
    assert_eq!(output.stats.orphan_scenes, 1);
    assert_eq!(output.stats.orphan_events, 1);
}

#[test]
fn test_combine_orphan_event() {
    let sessions = vec![session("a")];
    let scenes = vec![scene("a1", "a")];
    let events = vec![event("e1", "missing-scene")];

    let output = combine(sessions, scenes, events);

    assert!(output.sessions[0].scenes[0].events.is_empty());
    assert_eq!(output.stats.events_joined, 0);
    assert_eq!(output.stats.orphan_events, 1);
}

#[test]
fn test_combine_session_without_scenes() {
    let sessions = vec![session("lonely")];
    let output = combine(sessions, Vec::new(), Vec::new());

    assert_eq!(output.sessions.len(), 1);
    assert!(output.sessions[0].scenes.is_empty());
    assert_eq!(output.stats.sessions, 1);
}

#[test]
fn test_combine_empty_batch() {
    let output = combine(Vec::new(), Vec::new(), Vec::new());
    assert!(output.sessions.is_empty());
    assert_eq!(output.stats, CombineStats::default());
}
