mod common;

use std::time::Duration;

use fc_core::FuelType;
use fc_engine::{EngineConfig, FuelUsesOptions, RunTier, SimulationEngine};
use fc_results::JsonSummaryReader;

use common::{StubModel, TestRunner, init_tracing, tier_gas_j, unique_temp_dir};

/// Runs the cascade with the given per-tier delays and returns the final
/// (estimate confidence, details confidence, recorded result path).
fn run_cascade(prefix: &str, delays: &[(&'static str, u64)], workers: usize) -> (f64, f64, String) {
    let cache_dir = unique_temp_dir(prefix);
    let (mut runner, _trees) = TestRunner::tracking();
    for (tier, millis) in delays {
        runner = runner.with_tier_delay(tier, Duration::from_millis(*millis));
    }
    let engine = SimulationEngine::new(
        EngineConfig::new(&cache_dir, 1).with_workers(workers),
        runner,
        JsonSummaryReader,
    )
    .expect("failed to build engine");

    let model = StubModel::new("clinic");
    engine
        .fuel_uses(&model, &[45.0], &[0], &FuelUsesOptions::default())
        .expect("enqueue failed");
    assert!(engine.wait_idle(Duration::from_secs(30)));

    let estimate = engine.fuel_uses_at(&[45.0], &[0]).expect("read failed");
    assert_eq!(estimate.fuel_use(FuelType::Gas), tier_gas_j("radiance"));
    let details = engine.details(&[45.0], &[0]).expect("details failed");
    let path = details
        .result_path
        .expect("no result path recorded")
        .to_string_lossy()
        .into_owned();
    (estimate.confidence(), details.confidence, path)
}

#[test]
fn ascending_completion_order_settles_on_radiance() {
    init_tracing();
    // One worker: tiers complete in enqueue order, estimation first.
    let (estimate_confidence, details_confidence, path) =
        run_cascade("fc_engine_order_fwd", &[], 1);
    assert_eq!(estimate_confidence, RunTier::Radiance.confidence());
    assert_eq!(details_confidence, RunTier::Radiance.confidence());
    assert!(path.contains("radiance"));
}

#[test]
fn descending_completion_order_settles_on_radiance() {
    init_tracing();
    // Three workers with staggered delays: radiance completes first, the
    // cheap tiers trail in afterwards and must not downgrade anything.
    let delays = [("estimation", 600u64), ("full", 300u64)];
    let (estimate_confidence, details_confidence, path) =
        run_cascade("fc_engine_order_rev", &delays, 3);
    assert_eq!(estimate_confidence, RunTier::Radiance.confidence());
    assert_eq!(details_confidence, RunTier::Radiance.confidence());
    assert!(path.contains("radiance"));
}
