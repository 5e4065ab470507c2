//! Shared helpers for scenario tests.

use halflife_core::catalog::Catalog;
use halflife_core::types::{HalfLife, Isotope, IsotopeDisplay};
use halflife_sim::SimulationEngine;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Identifier of the isotope added by [`engine_with_half_life`].
pub const TEST_ISOTOPE: &str = "test";

/// Deterministic generator.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Built-in catalog plus a [`TEST_ISOTOPE`] entry with the given half-life.
pub fn catalog_with_half_life(half_life: f64) -> Catalog {
    let mut catalog = Catalog::builtin();
    catalog.insert(Isotope::new(
        TEST_ISOTOPE,
        HalfLife::new(half_life).unwrap(),
        IsotopeDisplay::default(),
    ));
    catalog
}

/// Engine at rate 1.0 holding `count` particles of a [`TEST_ISOTOPE`] with
/// the given half-life. The clock is stopped.
pub fn engine_with_half_life(half_life: f64, count: usize, seed: u64) -> SimulationEngine {
    let mut engine = SimulationEngine::new(catalog_with_half_life(half_life));
    engine.set_rate(1.0).unwrap();
    engine
        .create_population(TEST_ISOTOPE, count, &mut rng(seed))
        .unwrap();
    engine
}

/// Start the clock and tick once so simulated time reaches `t`.
///
/// Requires rate 1.0 and a clock at or before `t`.
pub fn advance_to(engine: &mut SimulationEngine, t: f64) -> usize {
    let dt = t - engine.simulated_time();
    engine.start();
    engine.tick(dt).unwrap()
}

/// Ids of decayed particles, in particle order.
pub fn decayed_ids(engine: &SimulationEngine) -> Vec<u64> {
    engine
        .particles()
        .iter()
        .filter(|p| p.is_decayed())
        .map(|p| p.id().0)
        .collect()
}
