//! Error types for the halflife simulator.
use thiserror::Error;

use crate::types::ParticleId;

/// Failure of a single simulation command.
///
/// Every variant is raised synchronously by the call that violated a
/// precondition. Commands validate before mutating, so an `Err` always
/// means the engine state is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("invalid input: {0}")] InvalidInput(String),
    /// An event was recorded twice for one particle. Only an engine bug
    /// can produce this.
    #[error("duplicate decay event for particle {0}")] DuplicateEvent(ParticleId),
    #[error("unknown isotope: {0}")] UnknownIsotope(String),
}

impl SimError {
    /// Shorthand for [`SimError::InvalidInput`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
