//! # halflife-sim: Simulated time, decay detection, and event recording.
//!
//! Composes the decay law into a running simulation:
//! - [`clock::SimulationClock`]: pull-based simulated time driven by real-time deltas
//! - [`timeline::EventLog`]: append-only record of decay transitions
//! - [`engine::SimulationEngine`]: population ownership and the per-tick update
//! - [`shared::SharedEngine`]: mutex-guarded handle for concurrent drivers
//! - [`config::SimConfig`]: file and environment configuration

pub mod clock;
pub mod config;
pub mod engine;
pub mod shared;
pub mod timeline;

pub use clock::{ClockState, SimulationClock};
pub use config::{ConfigError, IsotopeEntry, SimConfig};
pub use engine::SimulationEngine;
pub use shared::SharedEngine;
pub use timeline::EventLog;
