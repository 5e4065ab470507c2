//! Simulated time.
//!
//! The clock owns no timer. The driver reports elapsed real time on every
//! frame and the clock converts it to simulated time at the current rate.

use halflife_core::error::SimError;
use serde::Serialize;
use tracing::debug;

/// Whether simulated time advances on [`SimulationClock::advance`].
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
}

/// Simulated-time clock with a configurable rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    simulated_time: f64,
    /// Simulated time units per real second.
    rate: f64,
    state: ClockState,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            simulated_time: 0.0,
            rate: 1.0,
            state: ClockState::Stopped,
        }
    }
}

impl SimulationClock {
    /// A stopped clock at time zero with the given rate.
    pub fn new(rate: f64) -> Result<Self, SimError> {
        let mut clock = Self::default();
        clock.set_rate(rate)?;
        Ok(clock)
    }

    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn start(&mut self) {
        if self.state == ClockState::Stopped {
            debug!(time = self.simulated_time, "clock started");
        }
        self.state = ClockState::Running;
    }

    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            debug!(time = self.simulated_time, "clock paused");
        }
        self.state = ClockState::Stopped;
    }

    /// Start if stopped, pause if running. Returns the new state.
    pub fn toggle(&mut self) -> ClockState {
        match self.state {
            ClockState::Stopped => self.start(),
            ClockState::Running => self.pause(),
        }
        self.state
    }

    /// Stop and rewind to zero. The rate is kept.
    pub fn reset(&mut self) {
        self.simulated_time = 0.0;
        self.state = ClockState::Stopped;
    }

    /// Change the rate; applies from the next advance.
    ///
    /// Zero is accepted. Negative, NaN and infinite rates are rejected.
    pub fn set_rate(&mut self, rate: f64) -> Result<(), SimError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(SimError::invalid(format!(
                "rate must be non-negative and finite, got {rate}"
            )));
        }
        self.rate = rate;
        Ok(())
    }

    /// Simulated time an advance by `real_dt` seconds would reach, without
    /// committing it.
    ///
    /// Fails if the advance would overflow simulated time to infinity.
    pub fn projected(&self, real_dt: f64) -> Result<f64, SimError> {
        if !real_dt.is_finite() || real_dt < 0.0 {
            return Err(SimError::invalid(format!(
                "elapsed time must be non-negative and finite, got {real_dt}"
            )));
        }
        if !self.is_running() {
            return Ok(self.simulated_time);
        }
        let next = self.simulated_time + real_dt * self.rate;
        if !next.is_finite() {
            return Err(SimError::invalid(format!(
                "advancing {real_dt}s at rate {} overflows simulated time",
                self.rate
            )));
        }
        Ok(next)
    }

    /// Advance by `real_dt` seconds of real time. No-op while stopped.
    /// Returns the new simulated time.
    pub fn advance(&mut self, real_dt: f64) -> Result<f64, SimError> {
        self.simulated_time = self.projected(real_dt)?;
        Ok(self.simulated_time)
    }
}
