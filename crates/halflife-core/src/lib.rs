//! # halflife-core
//! Foundation types and traits for the halflife decay simulator.
//!
//! - [`types`]: half-lives, isotopes, particles, decay events, snapshots
//! - [`catalog::Catalog`]: isotope lookup by identifier
//! - [`traits::DecayLaw`]: the probabilistic decay model (halflife-decay implements)
//! - [`error::SimError`]: the single error type of the command surface

pub mod catalog;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::Catalog;
pub use error::SimError;
pub use traits::DecayLaw;
pub use types::{
    DecayEvent, HalfLife, Isotope, IsotopeDisplay, Particle, ParticleId, Placement, RatePreset,
    Snapshot,
};
