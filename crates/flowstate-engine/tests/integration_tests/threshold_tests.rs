//! Threshold store and adaptation tests.

use std::time::Duration;

use flowstate_engine::config::{FLOW_PROTECTION, PATTERN_COHERENCE, TYPE_SAFETY};
use flowstate_engine::EngineError;

use crate::helpers::{engine, observe_outcomes};

/// Effective thresholds never leave their bounds, whatever the inputs.
#[test]
fn test_thresholds_always_clamped() {
    println!("\n=== TEST: Threshold Clamping ===");

    let mut engine = engine();
    observe_outcomes(&mut engine, TYPE_SAFETY, 30, 30);
    observe_outcomes(&mut engine, PATTERN_COHERENCE, 30, 0);
    observe_outcomes(&mut engine, FLOW_PROTECTION, 30, 15);

    for cycle in 0..25 {
        engine.advance(Duration::from_secs(5));
        for category in [TYPE_SAFETY, PATTERN_COHERENCE, FLOW_PROTECTION] {
            let bounds = engine.thresholds().get(category).unwrap().clone();
            for energy in [0.0f32, 0.25, 0.5, 0.75, 1.0] {
                let value = engine
                    .get_threshold(category, energy, ["session", "other"])
                    .unwrap();
                assert!(
                    value >= bounds.min_value && value <= bounds.max_value,
                    "cycle {cycle}: {category} at energy {energy} gave {value}"
                );
            }
        }
    }
    println!("  All thresholds stayed within bounds over 25 cycles");
}

/// Ten flow_protection outcomes, eight successes with energy trending with
/// success, raise the history factor after one cycle.
#[test]
fn test_high_success_raises_history_factor() {
    println!("\n=== TEST: History Factor Adaptation ===");

    let mut engine = engine();
    let before = engine.thresholds().get(FLOW_PROTECTION).unwrap().clone();
    observe_outcomes(&mut engine, FLOW_PROTECTION, 10, 8);

    engine.advance(Duration::from_secs(5));
    let after = engine.thresholds().get(FLOW_PROTECTION).unwrap();

    println!(
        "  history_factor {:.2} -> {:.2}",
        before.history_factor, after.history_factor
    );
    assert!(after.history_factor > before.history_factor);
    assert!(after.energy_factor > before.energy_factor);
    assert!((0.0..=1.0).contains(&after.history_factor));

    // Untouched categories keep their seeds.
    assert_eq!(
        engine.thresholds().get(TYPE_SAFETY).unwrap().history_factor,
        0.10
    );
}

#[test]
fn test_unknown_category_is_not_found() {
    let engine = engine();
    let err = engine.get_threshold("latency", 0.5, ["a"]).unwrap_err();
    assert!(matches!(err, EngineError::CategoryNotFound(ref c) if c == "latency"));
}

#[test]
fn test_invalid_energy_is_rejected() {
    let engine = engine();
    for energy in [-0.1f32, 1.01, f32::NAN] {
        let err = engine
            .get_threshold(TYPE_SAFETY, energy, ["a"])
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument { .. }));
    }
}

/// Related history feeds the context and success terms immediately, before
/// any adaptation cycle.
#[test]
fn test_related_history_raises_threshold() {
    let mut engine = engine();
    let cold = engine.get_threshold(TYPE_SAFETY, 0.5, ["session"]).unwrap();

    observe_outcomes(&mut engine, TYPE_SAFETY, 4, 4);
    let warm = engine.get_threshold(TYPE_SAFETY, 0.5, ["session"]).unwrap();
    let unrelated = engine.get_threshold(TYPE_SAFETY, 0.5, ["elsewhere"]).unwrap();

    // 0.70 + 0.05 + 1.0 * 0.10 + 1.0 * 0.10
    assert!((warm - 0.95).abs() < 1e-5);
    assert!((cold - 0.75).abs() < 1e-5);
    assert!((unrelated - cold).abs() < 1e-6);
}
