//! The decay simulation engine.
//!
//! Owns the active population, the event log, and the clock. Every command
//! validates its input before touching state, so a failed command leaves the
//! engine exactly as it was.
//!
//! Particles are kept in an index sorted by sampled lifetime. Because
//! simulated time only moves forward between resets, the decayed particles
//! are always a prefix of that index, and a tick only has to scan forward
//! from the first undecayed entry.

use std::ops::Range;

use halflife_core::catalog::Catalog;
use halflife_core::constants::MAX_POPULATION;
use halflife_core::error::SimError;
use halflife_core::traits::DecayLaw;
use halflife_core::types::{DecayEvent, HalfLife, Isotope, Particle, ParticleId, Placement, Snapshot};
use halflife_decay::{CurveModel, CurvePoint, ExponentialLaw};
use ordered_float::OrderedFloat;
use rand::RngCore;
use tracing::{debug, error, info};

use crate::clock::{ClockState, SimulationClock};
use crate::timeline::EventLog;

/// One simulation run's particles, all of a single isotope.
#[derive(Debug, Clone)]
struct Population {
    isotope: Isotope,
    particles: Vec<Particle>,
    /// Indices into `particles`, ascending by `(lifetime, index)`.
    order: Vec<usize>,
    /// Number of leading `order` entries already decayed.
    cursor: usize,
}

impl Population {
    fn new(isotope: Isotope, particles: Vec<Particle>) -> Self {
        let mut order: Vec<usize> = (0..particles.len()).collect();
        order.sort_unstable_by_key(|&i| (OrderedFloat(particles[i].lifetime()), i));
        Self {
            isotope,
            particles,
            order,
            cursor: 0,
        }
    }

    /// Range of `order` that becomes due when time reaches `now`.
    fn due_until(&self, now: f64) -> Range<usize> {
        let pending = &self.order[self.cursor..];
        let due = pending.partition_point(|&i| self.particles[i].lifetime() <= now);
        self.cursor..self.cursor + due
    }

    fn events_for(&self, due: Range<usize>) -> Vec<DecayEvent> {
        self.order[due]
            .iter()
            .map(|&i| self.particles[i].decay_event())
            .collect()
    }

    fn mark_decayed(&mut self, due: Range<usize>) {
        for &i in &self.order[due.clone()] {
            let transitioned = self.particles[i].mark_decayed();
            debug_assert!(transitioned, "particle {i} decayed twice");
        }
        self.cursor = due.end;
    }

    fn rearm(&mut self) {
        for particle in &mut self.particles {
            particle.rearm();
        }
        self.cursor = 0;
    }
}

/// Radioactive decay simulation over one population at a time.
///
/// Not synchronised; wrap in [`SharedEngine`](crate::shared::SharedEngine)
/// when more than one thread needs access.
#[derive(Debug, Clone)]
pub struct SimulationEngine<L: DecayLaw = ExponentialLaw> {
    catalog: Catalog,
    law: L,
    clock: SimulationClock,
    population: Option<Population>,
    log: EventLog,
}

impl SimulationEngine {
    /// Engine over `catalog` using the exponential decay law.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_law(catalog, ExponentialLaw::new())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}

impl<L: DecayLaw> SimulationEngine<L> {
    /// Engine over `catalog` using a custom decay law.
    pub fn with_law(catalog: Catalog, law: L) -> Self {
        Self {
            catalog,
            law,
            clock: SimulationClock::default(),
            population: None,
            log: EventLog::new(),
        }
    }

    // --- commands ---

    /// Replace the population with `count` fresh particles of `isotope_id`.
    ///
    /// Each particle's lifetime is drawn independently from `rng`. The event
    /// log is cleared and the clock stopped at zero; the rate is kept.
    /// Selecting the active isotope again still draws a new population.
    pub fn create_population(
        &mut self,
        isotope_id: &str,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<(), SimError> {
        if count == 0 {
            return Err(SimError::invalid("population count must be positive"));
        }
        if count > MAX_POPULATION {
            return Err(SimError::invalid(format!(
                "population count {count} exceeds maximum {MAX_POPULATION}"
            )));
        }
        let isotope = self.catalog.get(isotope_id)?.clone();

        let half_life = isotope.half_life;
        let mut particles = Vec::with_capacity(count);
        for i in 0..count {
            let lifetime = self.law.sample_lifetime(half_life, rng);
            particles.push(Particle::new(
                ParticleId(i as u64),
                lifetime,
                Placement::new(i as f32, 0.0),
            ));
        }

        info!(isotope = %isotope.id, count, %half_life, "population created");
        self.population = Some(Population::new(isotope, particles));
        self.log.clear();
        self.clock.reset();
        Ok(())
    }

    /// [`create_population`](Self::create_population) drawing from the
    /// thread-local generator.
    pub fn create_population_from_entropy(
        &mut self,
        isotope_id: &str,
        count: usize,
    ) -> Result<(), SimError> {
        self.create_population(isotope_id, count, &mut rand::thread_rng())
    }

    /// Advance the clock by `real_dt` seconds and decay every particle whose
    /// lifetime has elapsed.
    ///
    /// Events are appended in ascending lifetime order. There is no cap on
    /// how many particles decay in one call, so a large `real_dt` fast-forwards.
    /// Without a population this validates `real_dt` and does nothing else.
    /// Returns the number of particles that decayed.
    pub fn tick(&mut self, real_dt: f64) -> Result<usize, SimError> {
        let now = self.clock.projected(real_dt)?;
        let Some(population) = self.population.as_mut() else {
            return Ok(0);
        };

        let due = population.due_until(now);
        let decayed = due.len();
        if decayed > 0 {
            let events = population.events_for(due.clone());
            if let Err(err) = self.log.append_all(&events) {
                error!(%err, time = now, "decay event rejected, tick aborted");
                return Err(err);
            }
            population.mark_decayed(due);
        }

        self.clock.advance(real_dt)?;
        if decayed > 0 {
            debug!(
                time = now,
                decayed,
                total = population.cursor,
                "particles decayed"
            );
        }
        Ok(decayed)
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Start if stopped, pause if running. Returns the new state.
    pub fn toggle(&mut self) -> ClockState {
        self.clock.toggle()
    }

    /// Change the clock rate in simulated time units per real second.
    pub fn set_rate(&mut self, rate: f64) -> Result<(), SimError> {
        self.clock.set_rate(rate)
    }

    /// Rewind to time zero and re-arm every particle with its original
    /// lifetime. Nothing is resampled.
    pub fn reset_time(&mut self) {
        self.clock.reset();
        self.log.clear();
        if let Some(population) = self.population.as_mut() {
            population.rearm();
            info!(isotope = %population.isotope.id, "simulation time reset");
        }
    }

    /// Record where the renderer put a particle.
    pub fn set_placement(&mut self, id: ParticleId, placement: Placement) -> Result<(), SimError> {
        let population = self
            .population
            .as_mut()
            .ok_or_else(|| SimError::invalid("no active population"))?;
        let particle = population
            .particles
            .get_mut(id.0 as usize)
            .filter(|p| p.id() == id)
            .ok_or_else(|| SimError::invalid(format!("no particle {id} in population")))?;
        particle.set_placement(placement);
        Ok(())
    }

    // --- queries ---

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn simulated_time(&self) -> f64 {
        self.clock.simulated_time()
    }

    /// Isotope of the active population.
    pub fn isotope(&self) -> Option<&Isotope> {
        self.population.as_ref().map(|p| &p.isotope)
    }

    pub fn particles(&self) -> &[Particle] {
        self.population
            .as_ref()
            .map(|p| p.particles.as_slice())
            .unwrap_or_default()
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    /// Recorded events with `decay_time <= t`, oldest first.
    pub fn events_before(&self, t: f64) -> std::slice::Iter<'_, DecayEvent> {
        self.log.events_before(t)
    }

    pub fn population_size(&self) -> usize {
        self.particles().len()
    }

    pub fn decayed_count(&self) -> usize {
        self.population.as_ref().map_or(0, |p| p.cursor)
    }

    pub fn remaining_count(&self) -> usize {
        self.population_size() - self.decayed_count()
    }

    /// Analytic remaining count for the current population at the current time.
    pub fn expected_remaining(&self) -> Option<f64> {
        let population = self.population.as_ref()?;
        Some(self.law.expected_remaining(
            population.isotope.half_life,
            population.particles.len(),
            self.clock.simulated_time(),
        ))
    }

    /// Survival curve of the active isotope, `resolution + 1` points over `[0, t_max]`.
    pub fn curve_points(&self, t_max: f64, resolution: usize) -> Result<Vec<CurvePoint>, SimError> {
        let half_life = self.active_half_life()?;
        Ok(CurveModel::curve_points(half_life, t_max, resolution)?
            .map(|p| CurvePoint {
                t: p.t,
                fraction: self.law.remaining_fraction(half_life, p.t),
            })
            .collect())
    }

    /// Read-only view of everything a renderer draws.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            isotope: self.isotope().map(|i| i.id.as_str()),
            simulated_time: self.clock.simulated_time(),
            rate: self.clock.rate(),
            running: self.clock.is_running(),
            decayed_count: self.decayed_count(),
            particles: self.particles(),
            events: self.log.as_slice(),
        }
    }

    fn active_half_life(&self) -> Result<HalfLife, SimError> {
        self.isotope()
            .map(|i| i.half_life)
            .ok_or_else(|| SimError::invalid("no isotope selected"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halflife_core::types::IsotopeDisplay;
    use parking_lot::Mutex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Decay law handing out a fixed list of lifetimes in order.
    struct ScriptedLaw {
        lifetimes: Mutex<Vec<f64>>,
    }

    impl ScriptedLaw {
        fn new(lifetimes: &[f64]) -> Self {
            let mut v = lifetimes.to_vec();
            v.reverse();
            Self {
                lifetimes: Mutex::new(v),
            }
        }
    }

    impl DecayLaw for ScriptedLaw {
        fn sample_lifetime(&self, _half_life: HalfLife, _rng: &mut dyn RngCore) -> f64 {
            self.lifetimes.lock().pop().expect("script exhausted")
        }

        fn remaining_fraction(&self, half_life: HalfLife, t: f64) -> f64 {
            halflife_decay::remaining_fraction(half_life, t)
        }
    }

    fn test_catalog() -> Catalog {
        let mut catalog = Catalog::builtin();
        catalog.insert(Isotope::new(
            "test",
            HalfLife::new(10.0).unwrap(),
            IsotopeDisplay::default(),
        ));
        catalog
    }

    fn scripted(lifetimes: &[f64]) -> SimulationEngine<ScriptedLaw> {
        let mut e = SimulationEngine::with_law(test_catalog(), ScriptedLaw::new(lifetimes));
        e.create_population("test", lifetimes.len(), &mut StdRng::seed_from_u64(0))
            .unwrap();
        e.set_rate(1.0).unwrap();
        e
    }

    fn engine() -> SimulationEngine {
        let mut e = SimulationEngine::new(test_catalog());
        e.set_rate(1.0).unwrap();
        e
    }

    fn ids(events: &EventLog) -> Vec<u64> {
        events.iter().map(|e| e.particle_id.0).collect()
    }

    // --- create_population ---

    #[test]
    fn zero_count_rejected() {
        let mut e = engine();
        let err = e
            .create_population("test", 0, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidInput(_)));
        assert!(e.isotope().is_none());
    }

    #[test]
    fn oversized_population_rejected() {
        let mut e = engine();
        assert!(matches!(
            e.create_population("test", MAX_POPULATION + 1, &mut StdRng::seed_from_u64(1)),
            Err(SimError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_isotope_rejected() {
        let mut e = engine();
        assert_eq!(
            e.create_population("uranium", 5, &mut StdRng::seed_from_u64(1))
                .unwrap_err(),
            SimError::UnknownIsotope("uranium".into())
        );
    }

    #[test]
    fn failed_create_keeps_previous_population() {
        let mut e = scripted(&[1.0, 2.0]);
        e.start();
        e.tick(1.5).unwrap();
        assert!(e.create_population("nope", 3, &mut StdRng::seed_from_u64(1)).is_err());
        assert_eq!(e.population_size(), 2);
        assert_eq!(e.decayed_count(), 1);
        assert_eq!(e.simulated_time(), 1.5);
    }

    #[test]
    fn create_population_resets_run() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(5);
        e.create_population("test", 50, &mut rng).unwrap();
        e.start();
        e.tick(100.0).unwrap();
        assert!(e.decayed_count() > 0);

        e.create_population("test", 20, &mut rng).unwrap();
        assert_eq!(e.population_size(), 20);
        assert_eq!(e.decayed_count(), 0);
        assert!(e.events().is_empty());
        assert_eq!(e.simulated_time(), 0.0);
        assert!(!e.clock().is_running());
        assert_eq!(e.clock().rate(), 1.0);
    }

    #[test]
    fn same_isotope_resamples() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(11);
        e.create_population("test", 10, &mut rng).unwrap();
        let first: Vec<f64> = e.particles().iter().map(Particle::lifetime).collect();
        e.create_population("test", 10, &mut rng).unwrap();
        let second: Vec<f64> = e.particles().iter().map(Particle::lifetime).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn particle_ids_unique_and_dense() {
        let mut e = engine();
        e.create_population("test", 25, &mut StdRng::seed_from_u64(2))
            .unwrap();
        for (i, p) in e.particles().iter().enumerate() {
            assert_eq!(p.id(), ParticleId(i as u64));
            assert!(!p.is_decayed());
        }
    }

    // --- tick ---

    #[test]
    fn tick_without_population_is_noop() {
        let mut e = engine();
        e.start();
        assert_eq!(e.tick(5.0).unwrap(), 0);
        assert_eq!(e.simulated_time(), 0.0);
    }

    #[test]
    fn tick_negative_rejected() {
        let mut e = engine();
        assert!(matches!(e.tick(-1.0), Err(SimError::InvalidInput(_))));
        let mut e = scripted(&[1.0]);
        e.start();
        assert!(matches!(e.tick(-1.0), Err(SimError::InvalidInput(_))));
        assert_eq!(e.simulated_time(), 0.0);
    }

    #[test]
    fn tick_overflowing_time_rejected_without_decays() {
        let mut e = scripted(&[1.0, 2.0]);
        e.set_rate(f64::MAX).unwrap();
        e.start();
        assert!(matches!(e.tick(10.0), Err(SimError::InvalidInput(_))));
        assert_eq!(e.simulated_time(), 0.0);
        assert_eq!(e.decayed_count(), 0);
        assert!(e.events().is_empty());
        assert!(e.particles().iter().all(|p| !p.is_decayed()));
        assert_eq!(e.expected_remaining(), Some(2.0));
    }

    #[test]
    fn tick_while_stopped_does_not_advance() {
        let mut e = scripted(&[1.0]);
        assert_eq!(e.tick(10.0).unwrap(), 0);
        assert_eq!(e.simulated_time(), 0.0);
    }

    #[test]
    fn events_in_lifetime_order() {
        let mut e = scripted(&[3.0, 1.0, 2.0, 2.0]);
        e.start();
        assert_eq!(e.tick(5.0).unwrap(), 4);
        assert_eq!(ids(e.events()), vec![1, 2, 3, 0]);
        let times: Vec<f64> = e.events().iter().map(|ev| ev.decay_time).collect();
        assert_eq!(times, vec![1.0, 2.0, 2.0, 3.0]);
    }

    #[test]
    fn decays_exactly_at_lifetime() {
        let mut e = scripted(&[2.0, 4.0]);
        e.start();
        assert_eq!(e.tick(1.999).unwrap(), 0);
        e.reset_time();
        e.start();
        assert_eq!(e.tick(2.0).unwrap(), 1);
        assert!(e.particles()[0].is_decayed());
        assert!(!e.particles()[1].is_decayed());
    }

    #[test]
    fn incremental_ticks_record_each_decay_once() {
        let mut e = scripted(&[0.5, 1.5, 2.5]);
        e.start();
        assert_eq!(e.tick(1.0).unwrap(), 1);
        assert_eq!(e.tick(1.0).unwrap(), 1);
        assert_eq!(e.tick(0.0).unwrap(), 0);
        assert_eq!(e.tick(1.0).unwrap(), 1);
        assert_eq!(e.tick(10.0).unwrap(), 0);
        assert_eq!(ids(e.events()), vec![0, 1, 2]);
        assert_eq!(e.decayed_count(), 3);
    }

    #[test]
    fn population_from_entropy() {
        let mut e = engine();
        e.create_population_from_entropy("test", 64).unwrap();
        assert_eq!(e.population_size(), 64);
        assert!(e.particles().iter().all(|p| p.lifetime().is_finite() && p.lifetime() > 0.0));
        assert!(e.create_population_from_entropy("test", 0).is_err());
    }

    #[test]
    fn fast_forward_decays_everything_in_one_tick() {
        let mut e = engine();
        e.create_population("test", 500, &mut StdRng::seed_from_u64(8))
            .unwrap();
        e.start();
        assert_eq!(e.tick(1e6).unwrap(), 500);
        assert_eq!(e.remaining_count(), 0);
        assert_eq!(e.events().len(), 500);
    }

    #[test]
    fn decayed_flag_matches_lifetime() {
        let mut e = engine();
        e.create_population("test", 200, &mut StdRng::seed_from_u64(21))
            .unwrap();
        e.start();
        for _ in 0..7 {
            e.tick(1.3).unwrap();
            let now = e.simulated_time();
            for p in e.particles() {
                assert_eq!(p.is_decayed(), p.lifetime() <= now);
            }
        }
    }

    #[test]
    fn event_records_placement_at_decay() {
        let mut e = scripted(&[1.0, 2.0]);
        e.set_placement(ParticleId(1), Placement::new(300.0, 120.0))
            .unwrap();
        e.start();
        e.tick(3.0).unwrap();
        let ev = e.events().last().unwrap();
        assert_eq!(ev.particle_id, ParticleId(1));
        assert_eq!(ev.placement, Placement::new(300.0, 120.0));
    }

    // --- reset_time ---

    #[test]
    fn reset_time_rearms_without_resampling() {
        let mut e = engine();
        e.create_population("test", 100, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let before: Vec<f64> = e.particles().iter().map(Particle::lifetime).collect();
        e.start();
        e.tick(50.0).unwrap();
        assert!(e.decayed_count() > 0);

        e.reset_time();
        let after: Vec<f64> = e.particles().iter().map(Particle::lifetime).collect();
        assert_eq!(before, after);
        assert_eq!(e.decayed_count(), 0);
        assert!(e.particles().iter().all(|p| !p.is_decayed()));
        assert!(e.events().is_empty());
        assert_eq!(e.simulated_time(), 0.0);
        assert!(!e.clock().is_running());
    }

    #[test]
    fn replay_after_reset_produces_same_events() {
        let mut e = engine();
        e.create_population("test", 60, &mut StdRng::seed_from_u64(17))
            .unwrap();
        e.start();
        e.tick(12.0).unwrap();
        let first: Vec<DecayEvent> = e.events().iter().copied().collect();
        e.reset_time();
        e.start();
        e.tick(12.0).unwrap();
        let second: Vec<DecayEvent> = e.events().iter().copied().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn reset_time_without_population() {
        let mut e = engine();
        e.reset_time();
        assert_eq!(e.decayed_count(), 0);
    }

    // --- set_placement ---

    #[test]
    fn set_placement_validation() {
        let mut e = engine();
        assert!(e.set_placement(ParticleId(0), Placement::default()).is_err());
        let mut e = scripted(&[1.0]);
        assert!(e.set_placement(ParticleId(1), Placement::default()).is_err());
        e.set_placement(ParticleId(0), Placement::new(5.0, 6.0)).unwrap();
        assert_eq!(e.particles()[0].placement(), Placement::new(5.0, 6.0));
    }

    // --- queries ---

    #[test]
    fn snapshot_reflects_state() {
        let mut e = scripted(&[1.0, 5.0]);
        e.start();
        e.tick(2.0).unwrap();
        let snap = e.snapshot();
        assert_eq!(snap.isotope, Some("test"));
        assert_eq!(snap.simulated_time, 2.0);
        assert!(snap.running);
        assert_eq!(snap.decayed_count, 1);
        assert_eq!(snap.particles.len(), 2);
        assert_eq!(snap.events.len(), 1);
        assert_eq!(snap.remaining_count(), 1);
    }

    #[test]
    fn empty_snapshot() {
        let e = engine();
        let snap = e.snapshot();
        assert!(snap.isotope.is_none());
        assert!(snap.particles.is_empty());
        assert!(snap.events.is_empty());
    }

    #[test]
    fn events_before_lags_cursor() {
        let mut e = scripted(&[1.0, 2.0, 3.0]);
        e.start();
        e.tick(3.0).unwrap();
        assert_eq!(e.events_before(1.5).count(), 1);
        assert_eq!(e.events_before(3.0).count(), 3);
    }

    #[test]
    fn curve_requires_isotope() {
        let e = engine();
        assert!(matches!(
            e.curve_points(10.0, 10),
            Err(SimError::InvalidInput(_))
        ));
    }

    #[test]
    fn curve_uses_active_half_life() {
        let e = scripted(&[1.0]);
        let pts = e.curve_points(20.0, 2).unwrap();
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[0].fraction, 1.0);
        assert_eq!(pts[1].fraction, 0.5);
        assert_eq!(pts[2].fraction, 0.25);
    }

    #[test]
    fn expected_remaining_tracks_clock() {
        let mut e = scripted(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(e.expected_remaining(), Some(4.0));
        e.start();
        e.tick(10.0).unwrap();
        assert_eq!(e.expected_remaining(), Some(2.0));
        assert_eq!(engine().expected_remaining(), None);
    }

    #[test]
    fn toggle_drives_clock() {
        let mut e = scripted(&[1.0]);
        assert_eq!(e.toggle(), ClockState::Running);
        e.tick(2.0).unwrap();
        assert_eq!(e.toggle(), ClockState::Stopped);
        assert_eq!(e.decayed_count(), 1);
    }
}
