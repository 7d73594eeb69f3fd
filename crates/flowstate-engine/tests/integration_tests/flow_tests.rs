//! Flow session lifecycle tests.

use std::time::Duration;

use flowstate_engine::flow::ElapsedCooldown;
use flowstate_engine::{FlowEvent, FlowIntensity, FlowMetrics, FlowType, ProtectionMetrics};

use crate::helpers::{engine, record_events, METRICS_TICK};

/// Weak protection refuses the session without registering timers.
#[test]
fn test_weak_protection_refuses_start() {
    println!("\n=== TEST: Protection Gate ===");

    let mut engine = engine();
    let timers_before = engine.active_timers();
    let mut protection = ProtectionMetrics::default();
    protection.immunity = 0.5;
    engine.set_protection_metrics(protection).unwrap();

    assert!(!engine.start_flow());
    assert_eq!(engine.active_timers(), timers_before);
    assert_eq!(engine.flow_state().flow_type, FlowType::Resting);
    assert!(!engine.flow_state().active);

    engine
        .set_protection_metrics(ProtectionMetrics::uniform(0.95))
        .unwrap();
    assert!(engine.start_flow());
    println!("  Refused at 0.5, accepted at 0.95");
}

/// Ending a session twice is harmless and changes nothing the second time.
#[test]
fn test_idempotent_shutdown() {
    let mut engine = engine();
    assert!(engine.start_flow());
    engine.advance(Duration::from_secs(10));

    assert!(engine.end_flow());
    let state = engine.flow_state().clone();
    let timers = engine.active_timers();

    assert!(!engine.end_flow());
    assert_eq!(engine.flow_state(), &state);
    assert_eq!(engine.active_timers(), timers);
}

/// Metric ticks step toward flow: FOCUS, then FLOW, then HYPERFOCUS.
#[test]
fn test_session_climbs_through_states() {
    println!("\n=== TEST: Session Progression ===");

    let mut engine = engine();
    let events = record_events(&engine);
    assert!(engine.start_flow());

    let mut seen = vec![engine.flow_state().flow_type];
    for _ in 0..10 {
        engine.advance(METRICS_TICK);
        let current = engine.flow_state().flow_type;
        if seen.last() != Some(&current) {
            seen.push(current);
        }
        println!(
            "  t={}s type={} quality={:.3}",
            engine.now_ms() / 1_000,
            current,
            engine.flow_state().quality()
        );
    }

    assert_eq!(seen, vec![FlowType::Focus, FlowType::Flow, FlowType::Hyperfocus]);
    assert_eq!(engine.flow_state().intensity, FlowIntensity::Peak);
    assert_eq!(engine.flow_state().duration_ms, 3_000_000);

    let transitions = events
        .lock()
        .iter()
        .filter(|e| matches!(e, FlowEvent::Transition(_)))
        .count();
    assert_eq!(transitions, 2);
}

#[test]
fn test_metrics_collapse_exhausts_session() {
    let mut engine = engine();
    assert!(engine.start_flow());

    engine
        .update_flow_metrics(FlowMetrics::uniform(0.1))
        .unwrap();
    assert_eq!(engine.flow_state().flow_type, FlowType::Exhausted);
    assert!(engine.flow_state().active);

    assert!(engine.end_flow());
    assert_eq!(engine.flow_state().flow_type, FlowType::Recovering);
}

#[test]
fn test_cooldown_gates_restart() {
    let mut engine = engine();
    assert!(engine.start_flow());
    assert!(engine.end_flow());

    engine.advance(Duration::from_secs(30));
    assert!(!engine.start_flow());
    assert_eq!(engine.flow_state().flow_type, FlowType::Recovering);

    engine.advance(Duration::from_secs(30));
    assert_eq!(engine.flow_state().flow_type, FlowType::Resting);
    assert!(engine.start_flow());
}

#[test]
fn test_ticks_skipped_while_inactive() {
    let mut engine = engine();
    let before = *engine.flow_state().metrics();

    engine.advance(METRICS_TICK * 3);
    assert_eq!(engine.flow_state().metrics(), &before);
    assert_eq!(engine.flow_state().duration_ms, 0);
}

#[test]
fn test_energy_samples_blend_into_metrics() {
    let mut engine = engine();
    engine.observe_energy(1.0).unwrap();
    engine.observe_energy(1.0).unwrap();

    // 0.5 -> 0.65 -> 0.755
    assert!((engine.flow_state().metrics().energy - 0.755).abs() < 1e-5);
    assert!(engine.observe_energy(-1.0).is_err());
}

#[test]
fn test_cooldown_policy_is_configurable() {
    let mut engine = engine();
    assert_eq!(
        engine.config().flow.cooldown_ms,
        ElapsedCooldown::new(60_000).cooldown_ms
    );

    let mut config = engine.config().clone();
    config.flow.cooldown_ms = 1_000;
    engine = flowstate_engine::FlowEngine::new(config).unwrap();

    assert!(engine.start_flow());
    assert!(engine.end_flow());
    engine.advance(Duration::from_secs(1));
    assert!(engine.start_flow());
}

#[test]
fn test_reset_returns_to_resting() {
    let mut engine = engine();
    assert!(engine.start_flow());
    engine.advance(METRICS_TICK);

    engine.reset_flow();
    assert_eq!(engine.flow_state().flow_type, FlowType::Resting);
    assert_eq!(engine.flow_state().duration_ms, 0);
    assert_eq!(engine.active_timers(), 1);
}
