//! Simulator constants. All time values in days (the built-in catalog's unit).

/// Days in a Julian year.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Half-life of polonium-210 in days.
pub const POLONIUM_HALF_LIFE_DAYS: f64 = 138.376 * DAYS_PER_YEAR;

/// Half-life of rubidium-87 in days.
pub const RUBIDIUM_HALF_LIFE_DAYS: f64 = 48.8e9 * DAYS_PER_YEAR;

/// Largest accepted half-life.
///
/// The longest lifetime the sampler can draw is `53 * H`, so any half-life up
/// to this bound keeps every sampled lifetime finite.
pub const MAX_HALF_LIFE: f64 = f64::MAX / 64.0;

/// Isotope selected when no configuration says otherwise.
pub const DEFAULT_ISOTOPE: &str = "rubidium";

/// Particles created per population by default.
pub const DEFAULT_POPULATION: usize = 10;

/// Upper bound on a single population.
///
/// # Examples
///
/// ```
/// use halflife_core::constants::{DEFAULT_POPULATION, MAX_POPULATION};
/// assert!(DEFAULT_POPULATION <= MAX_POPULATION);
/// ```
pub const MAX_POPULATION: usize = 1_000_000;

/// Default clock rate: one billion years of simulated time per real second.
pub const DEFAULT_RATE: f64 = 1e9 * DAYS_PER_YEAR;

/// The survival graph spans at least this many half-lives.
pub const CURVE_SPAN_HALF_LIVES: f64 = 3.0;

/// The event timeline spans this many half-lives.
pub const TIMELINE_SPAN_HALF_LIVES: f64 = 4.0;

/// Default number of curve segments.
pub const DEFAULT_CURVE_RESOLUTION: usize = 100;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "HALFLIFE";
