//! Thread-safe handle around a [`SimulationEngine`].
//!
//! All engine state changes inside a single tick, so one mutex is enough:
//! every command takes the lock once, and readers never see a half-applied
//! tick.

use std::sync::Arc;

use halflife_core::error::SimError;
use halflife_core::types::{ParticleId, Placement, Snapshot};
use parking_lot::Mutex;
use rand::RngCore;

use crate::engine::SimulationEngine;

/// Cloneable, lock-guarded engine for drivers with real concurrency.
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<SimulationEngine>>,
}

impl SharedEngine {
    pub fn new(engine: SimulationEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn create_population(
        &self,
        isotope_id: &str,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<(), SimError> {
        self.inner.lock().create_population(isotope_id, count, rng)
    }

    pub fn tick(&self, real_dt: f64) -> Result<usize, SimError> {
        self.inner.lock().tick(real_dt)
    }

    pub fn start(&self) {
        self.inner.lock().start();
    }

    pub fn pause(&self) {
        self.inner.lock().pause();
    }

    pub fn reset_time(&self) {
        self.inner.lock().reset_time();
    }

    pub fn set_rate(&self, rate: f64) -> Result<(), SimError> {
        self.inner.lock().set_rate(rate)
    }

    pub fn set_placement(&self, id: ParticleId, placement: Placement) -> Result<(), SimError> {
        self.inner.lock().set_placement(id, placement)
    }

    pub fn decayed_count(&self) -> usize {
        self.inner.lock().decayed_count()
    }

    /// Run `f` against a snapshot taken under the lock.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(Snapshot<'_>) -> R) -> R {
        let engine = self.inner.lock();
        f(engine.snapshot())
    }

    /// Snapshot serialised to JSON.
    pub fn snapshot_json(&self) -> serde_json::Result<serde_json::Value> {
        self.with_snapshot(|snap| serde_json::to_value(snap))
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut SimulationEngine) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
