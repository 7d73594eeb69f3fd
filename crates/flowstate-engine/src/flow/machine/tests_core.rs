//! Core tests for the flow-state machine (constructors, accessors, metrics).

#[cfg(test)]
mod tests {
    use crate::config::FlowConfig;
    use crate::flow::machine::{ElapsedCooldown, FlowStateMachine};
    use crate::flow::protection::ProtectionMetrics;
    use crate::flow::state::{FlowIntensity, FlowMetrics, FlowState, FlowType};
    use crate::scheduler::TickScheduler;

    fn test_config() -> FlowConfig {
        FlowConfig::default()
    }

    #[test]
    fn test_new() {
        let machine = FlowStateMachine::new(&test_config());

        assert_eq!(machine.flow_type(), FlowType::Resting);
        assert!(!machine.is_active());
        assert!(!machine.has_timers());
        assert!(!machine.state().protected);
        assert_eq!(machine.state().duration_ms, 0);
        assert!(machine.protection_healthy());
        assert_eq!(machine.protection().violations, 0);
    }

    #[test]
    fn test_classify_bands() {
        let machine = FlowStateMachine::default();

        assert_eq!(machine.classify(0.96), Some(FlowType::Hyperfocus));
        assert_eq!(machine.classify(0.90), Some(FlowType::Flow));
        assert_eq!(machine.classify(0.75), Some(FlowType::Focus));
        assert_eq!(machine.classify(0.20), Some(FlowType::Exhausted));
        // Between low and medium nothing changes.
        assert_eq!(machine.classify(0.50), None);
        assert_eq!(machine.classify(0.30), None);
    }

    #[test]
    fn test_update_metrics_while_resting_keeps_state() {
        let mut machine = FlowStateMachine::default();

        let transition = machine.update_metrics(FlowMetrics::uniform(0.9), 10).unwrap();
        assert!(transition.is_none());
        assert_eq!(machine.flow_type(), FlowType::Resting);
        assert_eq!(machine.state().intensity, FlowIntensity::High);
        assert!((machine.state().quality() - FlowMetrics::uniform(0.9).quality()).abs() < 1e-6);
    }

    #[test]
    fn test_update_metrics_rejects_invalid() {
        let mut machine = FlowStateMachine::default();
        let mut bad = FlowMetrics::default();
        bad.clarity = f32::NAN;

        let err = machine.update_metrics(bad, 0).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(machine.metrics(), &FlowMetrics::default());
    }

    #[test]
    fn test_observe_energy_blends() {
        let mut machine = FlowStateMachine::default();

        machine.observe_energy(1.0, 0).unwrap();
        // 0.5 * 0.7 + 1.0 * 0.3
        assert!((machine.metrics().energy - 0.65).abs() < 1e-6);

        machine.observe_energy(0.0, 0).unwrap();
        assert!((machine.metrics().energy - 0.455).abs() < 1e-6);
    }

    #[test]
    fn test_observe_energy_rejects_out_of_range() {
        let mut machine = FlowStateMachine::default();
        assert!(machine.observe_energy(1.5, 0).is_err());
        assert!(machine.observe_energy(f32::INFINITY, 0).is_err());
        assert!((machine.metrics().energy - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_protection_metrics_counts_violations_only_when_active() {
        let mut scheduler = TickScheduler::new();
        let mut machine = FlowStateMachine::default();

        machine
            .set_protection_metrics(ProtectionMetrics::uniform(0.6), 5)
            .unwrap();
        assert_eq!(machine.protection().violations, 0);
        assert_eq!(machine.protection().last_check_ms, 5);

        machine
            .set_protection_metrics(ProtectionMetrics::default(), 6)
            .unwrap();
        assert!(machine.start_flow(&mut scheduler, 6));

        machine
            .set_protection_metrics(ProtectionMetrics::uniform(0.5), 7)
            .unwrap();
        assert_eq!(machine.protection().violations, 1);
        // The running session is not interrupted.
        assert!(machine.is_active());
    }

    #[test]
    fn test_set_protection_metrics_rejects_invalid() {
        let mut machine = FlowStateMachine::default();
        let mut bad = ProtectionMetrics::default();
        bad.integrity = 2.0;

        assert!(machine.set_protection_metrics(bad, 0).is_err());
        assert_eq!(machine.protection().metrics, ProtectionMetrics::default());
    }

    #[test]
    fn test_duration_tick_skipped_when_inactive() {
        let mut machine = FlowStateMachine::default();
        assert!(!machine.on_duration_tick(1_000));
        assert_eq!(machine.state().duration_ms, 0);
        assert!(machine.on_metrics_tick(300_000).is_none());
        assert_eq!(machine.metrics(), &FlowMetrics::default());
    }

    #[test]
    fn test_custom_cooldown_closure() {
        let mut scheduler = TickScheduler::new();
        let mut machine = FlowStateMachine::default()
            .with_cooldown(|state: &FlowState, now_ms: u64| now_ms >= state.last_transition_ms + 10);

        assert!(machine.start_flow(&mut scheduler, 0));
        assert!(machine.end_flow(&mut scheduler, 100));
        assert!(machine.poll_recovery(105).is_none());
        let transition = machine.poll_recovery(110).unwrap();
        assert_eq!(transition.to, FlowType::Resting);
    }

    #[test]
    fn test_elapsed_cooldown_only_applies_to_recovering() {
        use crate::flow::machine::CooldownPolicy;

        let cooldown = ElapsedCooldown::new(100);
        let mut state = FlowState::default();
        assert!(!cooldown.is_complete(&state, 1_000));

        state.flow_type = FlowType::Recovering;
        state.last_transition_ms = 900;
        assert!(cooldown.is_complete(&state, 1_000));
        assert!(!cooldown.is_complete(&state, 999));
    }
}
