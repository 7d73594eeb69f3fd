//! Transition tests for the flow-state machine.

#[cfg(test)]
mod tests {
    use crate::flow::machine::FlowStateMachine;
    use crate::flow::protection::ProtectionMetrics;
    use crate::flow::state::{FlowIntensity, FlowMetrics, FlowType};
    use crate::scheduler::{EngineTask, TickScheduler};

    fn started() -> (FlowStateMachine, TickScheduler<EngineTask>) {
        let mut scheduler = TickScheduler::new();
        let mut machine = FlowStateMachine::default();
        assert!(machine.start_flow(&mut scheduler, 0));
        (machine, scheduler)
    }

    #[test]
    fn test_start_flow_enters_focus() {
        let (machine, scheduler) = started();

        assert!(machine.is_active());
        assert_eq!(machine.flow_type(), FlowType::Focus);
        assert!(machine.state().protected);
        assert!(machine.protection().active);
        assert!(machine.protection().flow_shield_active);
        assert!(machine.has_timers());
        assert_eq!(scheduler.active_timers(), 2);
    }

    #[test]
    fn test_start_flow_twice_is_refused() {
        let (mut machine, mut scheduler) = started();

        assert!(!machine.start_flow(&mut scheduler, 10));
        assert_eq!(scheduler.active_timers(), 2);
        assert_eq!(machine.state().last_transition_ms, 0);
    }

    #[test]
    fn test_start_flow_refused_with_weak_protection() {
        let mut scheduler = TickScheduler::new();
        let mut machine = FlowStateMachine::default();
        let mut metrics = ProtectionMetrics::default();
        metrics.resilience = 0.5;
        machine.set_protection_metrics(metrics, 0).unwrap();

        assert!(!machine.start_flow(&mut scheduler, 0));
        assert_eq!(scheduler.active_timers(), 0);
        assert!(!machine.has_timers());
        assert_eq!(machine.flow_type(), FlowType::Resting);
        assert!(!machine.is_active());

        let err = machine.try_start_flow(&mut scheduler, 0).unwrap_err();
        assert!(err.to_string().contains("entry bar"));
    }

    #[test]
    fn test_protection_at_medium_band_is_enough() {
        let mut scheduler = TickScheduler::new();
        let mut machine = FlowStateMachine::default();
        machine
            .set_protection_metrics(ProtectionMetrics::uniform(0.7), 0)
            .unwrap();
        assert!(machine.start_flow(&mut scheduler, 0));
    }

    #[test]
    fn test_end_flow_enters_recovering() {
        let (mut machine, mut scheduler) = started();

        assert!(machine.end_flow(&mut scheduler, 5_000));
        assert_eq!(machine.flow_type(), FlowType::Recovering);
        assert!(!machine.is_active());
        assert!(!machine.state().protected);
        assert!(!machine.protection().flow_shield_active);
        assert!(!machine.has_timers());
        assert_eq!(scheduler.active_timers(), 0);
        assert_eq!(machine.state().last_transition_ms, 5_000);
    }

    #[test]
    fn test_end_flow_is_idempotent() {
        let (mut machine, mut scheduler) = started();

        assert!(machine.end_flow(&mut scheduler, 1_000));
        let state = machine.state().clone();
        let protection = machine.protection().clone();

        assert!(!machine.end_flow(&mut scheduler, 2_000));
        assert_eq!(machine.state(), &state);
        assert_eq!(machine.protection(), &protection);
        assert_eq!(scheduler.active_timers(), 0);
    }

    #[test]
    fn test_end_flow_when_resting_changes_nothing() {
        let mut scheduler = TickScheduler::new();
        let mut machine = FlowStateMachine::default();

        assert!(!machine.end_flow(&mut scheduler, 0));
        assert_eq!(machine.flow_type(), FlowType::Resting);
        assert!(machine.try_end_flow(&mut scheduler, 0).is_err());
    }

    #[test]
    fn test_restart_waits_for_cooldown() {
        let (mut machine, mut scheduler) = started();
        assert!(machine.end_flow(&mut scheduler, 1_000));

        assert!(!machine.start_flow(&mut scheduler, 30_000));
        assert_eq!(machine.flow_type(), FlowType::Recovering);
        assert_eq!(scheduler.active_timers(), 0);

        assert!(machine.start_flow(&mut scheduler, 61_000));
        assert_eq!(machine.flow_type(), FlowType::Focus);
    }

    #[test]
    fn test_poll_recovery_returns_to_resting() {
        let (mut machine, mut scheduler) = started();
        machine.on_duration_tick(1_000);
        assert!(machine.end_flow(&mut scheduler, 1_000));

        assert!(machine.poll_recovery(60_999).is_none());
        let transition = machine.poll_recovery(61_000).unwrap();
        assert_eq!(transition.from, FlowType::Recovering);
        assert_eq!(transition.to, FlowType::Resting);
        assert_eq!(machine.state().duration_ms, 0);
        assert!(machine.poll_recovery(70_000).is_none());
    }

    #[test]
    fn test_metrics_ticks_climb_to_hyperfocus() {
        let (mut machine, _scheduler) = started();

        for i in 1..=8 {
            let update = machine.on_metrics_tick(i * 300_000).unwrap();
            assert!((update.quality - machine.state().quality()).abs() < 1e-6);
        }
        assert_eq!(machine.flow_type(), FlowType::Flow);
        assert_eq!(machine.state().intensity, FlowIntensity::High);

        machine.on_metrics_tick(2_700_000);
        machine.on_metrics_tick(3_000_000);
        assert_eq!(machine.flow_type(), FlowType::Hyperfocus);
        assert_eq!(machine.state().intensity, FlowIntensity::Peak);
        assert!(machine.metrics().resistance < 1e-6);
        assert_eq!(machine.protection().last_check_ms, 3_000_000);
    }

    #[test]
    fn test_low_metrics_exhaust_session() {
        let (mut machine, _scheduler) = started();

        let transition = machine
            .update_metrics(FlowMetrics::uniform(0.2), 500)
            .unwrap()
            .unwrap();
        assert_eq!(transition.from, FlowType::Focus);
        assert_eq!(transition.to, FlowType::Exhausted);
        assert!(machine.is_active());
    }

    #[test]
    fn test_middle_band_leaves_state_unchanged() {
        let (mut machine, _scheduler) = started();

        let transition = machine.update_metrics(FlowMetrics::uniform(0.5), 500).unwrap();
        assert!(transition.is_none());
        assert_eq!(machine.flow_type(), FlowType::Focus);
    }

    #[test]
    fn test_duration_accumulates_while_active() {
        let (mut machine, _scheduler) = started();
        for _ in 0..3 {
            assert!(machine.on_duration_tick(1_000));
        }
        assert_eq!(machine.state().duration_ms, 3_000);
    }

    #[test]
    fn test_reset_cancels_timers() {
        let (mut machine, mut scheduler) = started();
        machine.update_metrics(FlowMetrics::uniform(0.9), 10).unwrap();

        machine.reset(&mut scheduler);
        assert_eq!(scheduler.active_timers(), 0);
        assert_eq!(machine.flow_type(), FlowType::Resting);
        assert_eq!(machine.metrics(), &FlowMetrics::default());
        assert!(!machine.protection().active);
    }
}
