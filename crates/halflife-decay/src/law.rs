//! Exponential decay law implementing the [`DecayLaw`] trait.
//!
//! Every particle decays independently and memorylessly. A lifetime is
//! drawn once per particle by inverse-transform sampling; the analytic
//! survival curve is evaluated in closed form.

use halflife_core::traits::DecayLaw;
use halflife_core::types::HalfLife;
use rand::distributions::Standard;
use rand::{Rng, RngCore};

/// The production decay law.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialLaw;

impl ExponentialLaw {
    /// Create a new ExponentialLaw.
    pub fn new() -> Self {
        Self
    }
}

/// Draw a lifetime from the exponential distribution with `λ = ln(2) / H`.
///
/// `U` is drawn from `[0, 1)` and redrawn while it is zero. The smallest
/// nonzero `U` is `2^-53`, so a lifetime never exceeds `53 * H`, which
/// [`HalfLife`]'s upper bound keeps finite.
pub fn sample_lifetime<R: Rng + ?Sized>(half_life: HalfLife, rng: &mut R) -> f64 {
    let mean = half_life.mean_lifetime();
    loop {
        let u: f64 = rng.sample(Standard);
        if u > 0.0 {
            return -u.ln() * mean;
        }
    }
}

/// Fraction of a population surviving at time `t`: `0.5^(t / H)`.
///
/// Negative `t` is clamped to zero.
///
/// # Examples
///
/// ```
/// use halflife_core::HalfLife;
/// use halflife_decay::remaining_fraction;
/// let h = HalfLife::new(10.0).unwrap();
/// assert_eq!(remaining_fraction(h, 0.0), 1.0);
/// assert_eq!(remaining_fraction(h, 10.0), 0.5);
/// ```
pub fn remaining_fraction(half_life: HalfLife, t: f64) -> f64 {
    let t = t.max(0.0);
    (-(t / half_life.get())).exp2()
}

impl DecayLaw for ExponentialLaw {
    fn sample_lifetime(&self, half_life: HalfLife, rng: &mut dyn RngCore) -> f64 {
        sample_lifetime(half_life, rng)
    }

    fn remaining_fraction(&self, half_life: HalfLife, t: f64) -> f64 {
        remaining_fraction(half_life, t)
    }
}
