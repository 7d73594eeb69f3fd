//! Walk a flow session through the engine.
//!
//! Run with `cargo run --example flow_session`. Set `RUST_LOG=debug` (or
//! `FLOWSTATE__LOGGING__LEVEL=debug`) for per-tick detail.

use std::sync::Arc;
use std::time::Duration;

use flowstate_engine::config::{EngineConfig, FLOW_PROTECTION, TYPE_SAFETY};
use flowstate_engine::driver;
use flowstate_engine::{
    EngineResult, FlowEngine, FlowEvent, Observation, Pattern, PatternConditions, ValidationMetrics,
};
use flowstate_engine::FlowType;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> EngineResult<()> {
    let config = EngineConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.logging.include_location)
        .with_line_number(config.logging.include_location)
        .init();

    println!("=== Flow Session Demo ===\n");

    let mut engine = FlowEngine::new(config)?;
    engine.register_listener(|event: &FlowEvent| println!("  event: {event:?}"));

    let deep = engine.register_pattern(Pattern::new(
        "deep-work",
        PatternConditions::default()
            .with_flow_state(FlowType::Flow)
            .with_min_field_strength(0.7),
        1.0,
    ))?;
    engine.register_pattern(Pattern::new(
        "any-focus",
        PatternConditions::default().with_min_resonance(0.3),
        0.8,
    ))?;

    for i in 0..12 {
        let success = i % 5 != 0;
        let energy = if success { 0.8 } else { 0.3 };
        engine.observe(
            FLOW_PROTECTION,
            success,
            energy,
            ["editor", "review"],
            ValidationMetrics::default(),
        )?;
        engine.observe(TYPE_SAFETY, i % 2 == 0, 0.5, ["editor"], ValidationMetrics::default())?;
    }

    println!("\n--- Thresholds before adaptation ---");
    for category in [TYPE_SAFETY, FLOW_PROTECTION] {
        println!(
            "  {category}: {:.3}",
            engine.get_threshold(category, 0.6, ["editor"])?
        );
    }

    println!("\n--- Session ---");
    if !engine.start_flow() {
        println!("  flow start refused in {}", engine.flow_state().flow_type);
        return Ok(());
    }
    for _ in 0..10 {
        engine.advance(Duration::from_secs(300));
        let state = engine.flow_state();
        println!(
            "  t={:>5}s  {:<10}  quality={:.3}  duration={}s",
            engine.now_ms() / 1_000,
            state.flow_type.as_str(),
            state.quality(),
            state.duration_ms / 1_000
        );

        let observation = Observation::new(0.85, 0.5, 0.2, state.flow_type);
        if let Some(best) = engine.find_matches(&observation)?.first() {
            if best.pattern_id == deep {
                engine.activate_pattern(deep)?;
            }
        }
    }

    println!("\n--- Thresholds after adaptation ---");
    for category in [TYPE_SAFETY, FLOW_PROTECTION] {
        println!(
            "  {category}: {:.3}",
            engine.get_threshold(category, 0.6, ["editor"])?
        );
    }
    println!("  recovery points: {:?}", engine.recovery_points());

    println!("\n--- Driver ---");
    let shared = Arc::new(tokio::sync::Mutex::new(engine));
    let handle = driver::spawn(Arc::clone(&shared), Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.shutdown().await;

    let engine = shared.lock().await;
    println!(
        "  stopped at t={}ms in {}",
        engine.now_ms(),
        engine.flow_state().flow_type
    );
    Ok(())
}
