//! Append-only log of decay events (the timeline).
//!
//! Events arrive in non-decreasing `decay_time` order because the engine
//! detects decays as the clock moves forward. The log relies on that order to
//! answer [`EventLog::events_before`] with a binary search.

use std::collections::HashSet;

use halflife_core::error::SimError;
use halflife_core::types::{DecayEvent, ParticleId};

/// Ordered record of decay transitions, at most one per particle.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<DecayEvent>,
    /// Particles that already have an event.
    recorded: HashSet<ParticleId>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event.
    ///
    /// Fails with [`SimError::DuplicateEvent`] if the particle already has an
    /// event, and with [`SimError::InvalidInput`] if the event is earlier than
    /// the last recorded one.
    pub fn append(&mut self, event: DecayEvent) -> Result<(), SimError> {
        self.check(&event, None)?;
        self.recorded.insert(event.particle_id);
        self.events.push(event);
        Ok(())
    }

    /// Record a batch of events, all or nothing.
    ///
    /// The batch must itself be ordered and free of duplicates. Returns the
    /// number of events recorded.
    pub fn append_all(&mut self, batch: &[DecayEvent]) -> Result<usize, SimError> {
        let mut seen = HashSet::with_capacity(batch.len());
        let mut previous = self.events.last().map(|e| e.decay_time);
        for event in batch {
            self.check(event, previous)?;
            if !seen.insert(event.particle_id) {
                return Err(SimError::DuplicateEvent(event.particle_id));
            }
            previous = Some(event.decay_time);
        }

        self.recorded.extend(seen);
        self.events.extend_from_slice(batch);
        Ok(batch.len())
    }

    fn check(&self, event: &DecayEvent, previous: Option<f64>) -> Result<(), SimError> {
        if self.recorded.contains(&event.particle_id) {
            return Err(SimError::DuplicateEvent(event.particle_id));
        }
        let previous = previous.or_else(|| self.events.last().map(|e| e.decay_time));
        if let Some(last) = previous {
            if event.decay_time < last {
                return Err(SimError::invalid(format!(
                    "event for {} at {} precedes last event at {last}",
                    event.particle_id, event.decay_time
                )));
            }
        }
        Ok(())
    }

    /// Events with `decay_time <= t`, oldest first.
    ///
    /// The returned iterator is lazy and can be cloned to restart it.
    pub fn events_before(&self, t: f64) -> std::slice::Iter<'_, DecayEvent> {
        let end = self.events.partition_point(|e| e.decay_time <= t);
        self.events[..end].iter()
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.recorded.contains(&id)
    }

    pub fn as_slice(&self) -> &[DecayEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecayEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&DecayEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.recorded.clear();
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a DecayEvent;
    type IntoIter = std::slice::Iter<'a, DecayEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
