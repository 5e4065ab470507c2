//! Core simulation types: half-lives, isotopes, particles, decay events.
//!
//! Time values are plain `f64` in whatever unit the catalog was built with.
//! Nothing in this crate converts between units.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MAX_HALF_LIFE;
use crate::error::SimError;

/// A half-life that is strictly positive and at most
/// [`MAX_HALF_LIFE`](crate::constants::MAX_HALF_LIFE).
///
/// # Examples
///
/// ```
/// use halflife_core::HalfLife;
/// let h = HalfLife::new(10.0).unwrap();
/// assert_eq!(h.get(), 10.0);
/// assert!(HalfLife::new(0.0).is_err());
/// assert!(HalfLife::new(f64::NAN).is_err());
/// assert!(HalfLife::new(f64::MAX).is_err());
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct HalfLife(pub(crate) f64);

impl HalfLife {
    /// Validate and wrap a half-life value.
    pub fn new(value: f64) -> Result<Self, SimError> {
        if value > 0.0 && value <= MAX_HALF_LIFE {
            Ok(Self(value))
        } else {
            Err(SimError::invalid(format!(
                "half-life must be in (0, {MAX_HALF_LIFE:e}], got {value}"
            )))
        }
    }

    /// The raw half-life value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Decay constant `λ = ln(2) / half_life`.
    pub fn decay_constant(self) -> f64 {
        std::f64::consts::LN_2 / self.0
    }

    /// Mean lifetime `1 / λ`.
    pub fn mean_lifetime(self) -> f64 {
        self.0 / std::f64::consts::LN_2
    }
}

impl TryFrom<f64> for HalfLife {
    type Error = SimError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HalfLife> for f64 {
    fn from(h: HalfLife) -> Self {
        h.0
    }
}

impl fmt::Display for HalfLife {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named clock rate offered to the user for an isotope.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RatePreset {
    /// Human-readable label, e.g. "1B years/sec".
    pub label: String,
    /// Simulated time units per real second.
    pub rate: f64,
}

impl RatePreset {
    pub fn new(label: impl Into<String>, rate: f64) -> Self {
        Self {
            label: label.into(),
            rate,
        }
    }
}

/// Presentation metadata for an isotope. Opaque to the simulation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct IsotopeDisplay {
    /// Symbol of the parent nuclide, e.g. "Rb-87".
    pub symbol: String,
    /// Symbol of the decay product, e.g. "Sr-87".
    pub decay_product: String,
    /// RGB colour of an undecayed particle.
    pub color: [u8; 3],
    /// RGB colour of a decayed particle.
    pub product_color: [u8; 3],
    /// Rate choices offered for this isotope.
    pub rate_presets: Vec<RatePreset>,
}

/// Static description of a decaying nuclide.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Isotope {
    /// Catalog identifier, e.g. "rubidium".
    pub id: String,
    /// Half-life in the catalog's time unit.
    pub half_life: HalfLife,
    /// Rendering metadata.
    pub display: IsotopeDisplay,
}

impl Isotope {
    pub fn new(id: impl Into<String>, half_life: HalfLife, display: IsotopeDisplay) -> Self {
        Self {
            id: id.into(),
            half_life,
            display,
        }
    }

    /// Decay constant of this isotope.
    pub fn decay_constant(&self) -> f64 {
        self.half_life.decay_constant()
    }
}

/// Identifier of a particle, unique within one population.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "atom-{}", self.0)
    }
}

/// Where the renderer last put a particle. The simulation never reads it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
}

impl Placement {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One simulated nucleus.
///
/// The lifetime is fixed at construction. The decayed flag only moves from
/// `false` to `true`, except through [`Particle::rearm`] when a run is rewound.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Particle {
    id: ParticleId,
    lifetime: f64,
    decayed: bool,
    placement: Placement,
}

impl Particle {
    /// Create an undecayed particle with a pre-sampled lifetime.
    pub fn new(id: ParticleId, lifetime: f64, placement: Placement) -> Self {
        Self {
            id,
            lifetime,
            decayed: false,
            placement,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// Simulated time at which this particle decays.
    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    pub fn is_decayed(&self) -> bool {
        self.decayed
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    /// Whether this particle is undecayed and its lifetime has elapsed at `now`.
    pub fn is_due(&self, now: f64) -> bool {
        !self.decayed && self.lifetime <= now
    }

    /// The event this particle records when it decays.
    pub fn decay_event(&self) -> DecayEvent {
        DecayEvent {
            particle_id: self.id,
            decay_time: self.lifetime,
            placement: self.placement,
        }
    }

    /// Mark the particle decayed. Returns `true` only on the first call.
    pub fn mark_decayed(&mut self) -> bool {
        let transitioned = !self.decayed;
        self.decayed = true;
        transitioned
    }

    /// Clear the decayed flag, keeping the sampled lifetime.
    pub fn rearm(&mut self) {
        self.decayed = false;
    }
}

/// A recorded decay transition.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DecayEvent {
    pub particle_id: ParticleId,
    /// Equal to the particle's sampled lifetime.
    pub decay_time: f64,
    /// Placement of the particle when it decayed.
    pub placement: Placement,
}

/// Read-only view of the engine for a renderer.
#[derive(Serialize, Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    /// Active isotope, `None` before the first population is created.
    pub isotope: Option<&'a str>,
    pub simulated_time: f64,
    /// Configured clock rate. Reported as set even while paused; check
    /// `running` to know whether time is advancing.
    pub rate: f64,
    pub running: bool,
    pub decayed_count: usize,
    pub particles: &'a [Particle],
    pub events: &'a [DecayEvent],
}

impl Snapshot<'_> {
    /// Number of particles in the population.
    pub fn population(&self) -> usize {
        self.particles.len()
    }

    /// Number of particles not yet decayed.
    pub fn remaining_count(&self) -> usize {
        self.particles.len() - self.decayed_count
    }
}
