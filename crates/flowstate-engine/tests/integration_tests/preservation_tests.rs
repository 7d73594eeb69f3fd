//! State preservation tests.

use std::time::Duration;

use flowstate_engine::{FlowMetrics, PreservedState, ProtectionMetrics};
use serde_json::json;

use crate::helpers::{coherent_session, engine, METRICS_TICK};

/// Thirteen accepted snapshots into a ring of twelve evict the oldest.
#[test]
fn test_ring_keeps_twelve_newest() {
    println!("\n=== TEST: Preservation Ring ===");

    let mut engine = coherent_session();
    let mut taken = Vec::new();
    for i in 0..13 {
        engine.set_space_state(json!({ "snapshot": i }));
        assert!(engine.preserve_state().unwrap());
        taken.push(engine.now_ms() as i64);
        engine.advance(Duration::from_millis(10));
    }

    assert_eq!(engine.preservation().len(), 12);
    let newest = engine.restore_state(None).unwrap();
    assert_eq!(newest.timestamp_ms(), taken[12]);
    assert_eq!(newest.space()["snapshot"], 12);
    assert!(engine.restore_state(Some(taken[0])).is_none());
    assert!(engine.restore_state(Some(taken[1])).is_some());
    println!("  Oldest evicted, newest at {}ms", newest.timestamp_ms());
}

/// Snapshots below the gate leave the ring untouched.
#[test]
fn test_gate_leaves_ring_untouched() {
    let mut engine = coherent_session();
    assert!(engine.preserve_state().unwrap());
    let before: Vec<PreservedState> = engine.preservation().iter().cloned().collect();
    let points_before = engine.recovery_points().to_vec();

    engine.advance(Duration::from_millis(5));
    engine
        .update_flow_metrics(FlowMetrics::uniform(0.9))
        .unwrap();
    assert!(!engine.preserve_state().unwrap());

    engine
        .update_flow_metrics(FlowMetrics::uniform(1.0))
        .unwrap();
    engine
        .set_protection_metrics(ProtectionMetrics::uniform(0.9))
        .unwrap();
    assert!(!engine.preserve_state().unwrap());

    let after: Vec<PreservedState> = engine.preservation().iter().cloned().collect();
    assert_eq!(before, after);
    assert_eq!(engine.recovery_points(), points_before.as_slice());
}

#[test]
fn test_metrics_tick_takes_snapshot() {
    let mut engine = coherent_session();
    engine.set_space_state(json!({ "doc": "roadmap" }));
    engine.advance(METRICS_TICK);

    let snapshot = engine.restore_state(None).unwrap();
    assert_eq!(snapshot.timestamp_ms(), 300_000);
    assert_eq!(snapshot.space()["doc"], "roadmap");
    assert!(snapshot.flow().active);
    assert!((snapshot.stability() - 1.0).abs() < 1e-6);
    assert!((snapshot.efficiency() - snapshot.flow().quality()).abs() < 1e-6);
    assert_eq!(engine.recovery_points(), &[300_000]);
}

#[test]
fn test_restore_by_timestamp() {
    let mut engine = coherent_session();
    engine.set_space_state(json!("first"));
    engine.preserve_state().unwrap();
    engine.advance(Duration::from_millis(100));
    engine.set_space_state(json!("second"));
    engine.preserve_state().unwrap();

    assert_eq!(engine.restore_state(Some(0)).unwrap().space(), &json!("first"));
    assert_eq!(engine.restore_state(Some(100)).unwrap().space(), &json!("second"));
    assert!(engine.restore_state(Some(50)).is_none());
    assert_eq!(engine.recovery_points(), &[100, 0]);
}

#[test]
fn test_resting_engine_below_gate() {
    let mut engine = engine();
    assert!(!engine.preserve_state().unwrap());
    assert!(engine.restore_state(None).is_none());
    assert!(engine.recovery_points().is_empty());
}

#[test]
fn test_snapshots_serialize() {
    let mut engine = coherent_session();
    engine.set_space_state(json!({ "cursor": 42 }));
    engine.preserve_state().unwrap();

    let snapshot = engine.restore_state(None).unwrap();
    let text = serde_json::to_string(snapshot).unwrap();
    let restored: PreservedState = serde_json::from_str(&text).unwrap();
    assert_eq!(&restored, snapshot);
}
