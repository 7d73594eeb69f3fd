//! Pattern registry and matcher tests.

use flowstate_engine::{
    ConditionValue, EngineError, FlowType, Observation, Pattern, PatternConditions,
};
use uuid::Uuid;

use crate::helpers::engine;

fn field(strength: f32) -> Observation {
    Observation::new(strength, 0.5, 0.3, FlowType::Flow)
}

/// A single field-strength condition matches with the observed strength as
/// confidence and is excluded below the bar.
#[test]
fn test_field_strength_pattern() {
    println!("\n=== TEST: Field Strength Pattern ===");

    let mut engine = engine();
    let id = engine
        .register_pattern(Pattern::new(
            "strong-field",
            PatternConditions::default().with_min_field_strength(0.8),
            1.0,
        ))
        .unwrap();

    let matches = engine.find_matches(&field(0.9)).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].pattern_id, id);
    assert!((matches[0].confidence - 0.9).abs() < 1e-6);
    assert!((matches[0].score - 0.9).abs() < 1e-6);

    let matches = engine.find_matches(&field(0.5)).unwrap();
    assert!(matches.is_empty());
    println!("  Match at 0.9, excluded at 0.5");
}

/// Any failed condition removes the pattern from the results entirely.
#[test]
fn test_hard_condition_exclusion() {
    let mut engine = engine();
    engine
        .register_pattern(Pattern::new(
            "flow-only",
            PatternConditions::default()
                .with_flow_state(FlowType::Flow)
                .with_max_resistance(0.2),
            1.0,
        ))
        .unwrap();

    // Flow state matches but resistance 0.3 exceeds the ceiling.
    assert!(engine.find_matches(&field(0.9)).unwrap().is_empty());

    let calm = Observation::new(0.9, 0.5, 0.1, FlowType::Flow);
    let matches = engine.find_matches(&calm).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].matched_conditions, vec!["flow_state", "max_resistance"]);
    // (1.0 + 0.9) / 2
    assert!((matches[0].confidence - 0.95).abs() < 1e-6);
}

/// Results are sorted by descending score; equal scores keep registration
/// order.
#[test]
fn test_ranking_stability() {
    let mut engine = engine();
    let conditions = PatternConditions::default().with_min_resonance(0.1);

    let ids: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .zip([1.0f32, 1.2, 1.0, 1.2])
        .map(|(name, weight)| {
            engine
                .register_pattern(Pattern::new(*name, conditions.clone(), weight))
                .unwrap()
        })
        .collect();

    let matches = engine.find_matches(&field(0.5)).unwrap();
    let order: Vec<_> = matches.iter().map(|m| m.pattern_id).collect();
    assert_eq!(order, vec![ids[1], ids[3], ids[0], ids[2]]);

    for pair in matches.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_empty_conditions_never_surface() {
    let mut engine = engine();
    engine
        .register_pattern(Pattern::new("anything", PatternConditions::default(), 1.5))
        .unwrap();
    assert!(engine.find_matches(&field(1.0)).unwrap().is_empty());
}

#[test]
fn test_extension_conditions_match_attributes() {
    let mut engine = engine();
    let mut conditions = PatternConditions::default();
    conditions
        .extensions
        .insert("channel".to_string(), ConditionValue::Text("design".into()));
    conditions
        .extensions
        .insert("momentum".to_string(), ConditionValue::Number(0.5));
    engine
        .register_pattern(Pattern::new("design-sprint", conditions, 1.0))
        .unwrap();

    let observation = field(0.4)
        .with_attribute("channel", "design")
        .with_attribute("momentum", 0.7f32);
    let matches = engine.find_matches(&observation).unwrap();
    assert_eq!(matches.len(), 1);
    // (1.0 + 0.7) / 2
    assert!((matches[0].confidence - 0.85).abs() < 1e-6);

    let off_topic = field(0.4)
        .with_attribute("channel", "ops")
        .with_attribute("momentum", 0.7f32);
    assert!(engine.find_matches(&off_topic).unwrap().is_empty());
}

#[test]
fn test_malformed_pattern_rejected_at_registration() {
    let mut engine = engine();

    let shadowing = PatternConditions::default().with_extension("flow_state", "FLOW");
    let err = engine
        .register_pattern(Pattern::new("bad", shadowing, 1.0))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument { .. }));

    let out_of_range = PatternConditions::default().with_min_resonance(-0.2);
    assert!(engine
        .register_pattern(Pattern::new("bad", out_of_range, 1.0))
        .is_err());
    assert!(engine.patterns().is_empty());
}

#[test]
fn test_unknown_ids_are_distinct_from_empty_matches() {
    let mut engine = engine();
    let missing = Uuid::new_v4();

    assert!(engine.find_matches(&field(0.5)).unwrap().is_empty());
    assert!(engine.activate_pattern(missing).unwrap_err().is_not_found());
    assert!(engine.evolve_pattern(missing, true).unwrap_err().is_not_found());
    assert!(engine.remove_pattern(missing).is_none());
    assert!(!engine.update_pattern(missing, |p| p.weight = 0.3));
}

#[test]
fn test_evolution_reorders_matches() {
    let mut engine = engine();
    let conditions = PatternConditions::default().with_min_field_strength(0.2);
    let first = engine
        .register_pattern(Pattern::new("first", conditions.clone(), 1.0))
        .unwrap();
    let second = engine
        .register_pattern(Pattern::new("second", conditions, 1.0))
        .unwrap();

    let weight = engine.evolve_pattern(second, true).unwrap();
    assert!(weight > 1.0);
    engine.evolve_pattern(first, false).unwrap();

    let matches = engine.find_matches(&field(0.6)).unwrap();
    assert_eq!(matches[0].pattern_id, second);
    assert_eq!(matches[1].pattern_id, first);

    assert_eq!(engine.activate_pattern(first).unwrap(), 1);
    assert_eq!(engine.activate_pattern(first).unwrap(), 2);
    assert_eq!(engine.patterns().get(first).unwrap().activations(), 2);
}

#[test]
fn test_update_pattern_revalidates() {
    let mut engine = engine();
    let id = engine
        .register_pattern(Pattern::new(
            "editable",
            PatternConditions::default().with_min_field_strength(0.5),
            1.0,
        ))
        .unwrap();

    assert!(!engine.update_pattern(id, |p| p.weight = f32::NAN));
    assert_eq!(engine.patterns().get(id).unwrap().weight, 1.0);

    assert!(engine.update_pattern(id, |p| {
        p.conditions.min_field_strength = Some(0.95);
    }));
    assert!(engine.find_matches(&field(0.9)).unwrap().is_empty());
}
