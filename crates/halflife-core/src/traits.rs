//! Trait interfaces between the halflife crates.
//!
//! - [`DecayLaw`]: lifetime sampling and analytic survival (halflife-decay implements)

use rand::RngCore;

use crate::types::HalfLife;

/// The probabilistic model behind every particle.
///
/// Implementations must be pure apart from consuming randomness from the
/// supplied generator. The engine draws one lifetime per particle and never
/// asks again.
pub trait DecayLaw: Send + Sync {
    /// Draw the simulated time at which a fresh particle decays.
    fn sample_lifetime(&self, half_life: HalfLife, rng: &mut dyn RngCore) -> f64;

    /// Analytic fraction of a population still undecayed at time `t`.
    fn remaining_fraction(&self, half_life: HalfLife, t: f64) -> f64;

    /// Analytic count of `initial` particles still undecayed at time `t`.
    ///
    /// Default implementation: `initial * remaining_fraction(half_life, t)`.
    fn expected_remaining(&self, half_life: HalfLife, initial: usize, t: f64) -> f64 {
        initial as f64 * self.remaining_fraction(half_life, t)
    }
}
