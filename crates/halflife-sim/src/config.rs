//! Simulator configuration.
//!
//! Provides [`SimConfig`] with defaults for the isotope, population size and
//! clock rate, plus optional extra catalog entries. Values are layered:
//! built-in defaults, then an optional TOML file, then `HALFLIFE_*`
//! environment variables. Command-line flags override the result.

use std::path::{Path, PathBuf};

use halflife_core::catalog::Catalog;
use halflife_core::constants::{
    DEFAULT_ISOTOPE, DEFAULT_POPULATION, DEFAULT_RATE, ENV_PREFIX, MAX_POPULATION,
};
use halflife_core::error::SimError;
use halflife_core::types::{HalfLife, Isotope, IsotopeDisplay, RatePreset};
use serde::Deserialize;
use thiserror::Error;

use crate::engine::SimulationEngine;

/// Failure to load or validate configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config source: {0}")] Source(#[from] config::ConfigError),
    #[error(transparent)] Invalid(#[from] SimError),
}

/// An isotope declared in configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IsotopeEntry {
    pub id: String,
    /// Half-life in days.
    pub half_life: f64,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decay_product: Option<String>,
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    #[serde(default)]
    pub product_color: Option<[u8; 3]>,
    #[serde(default)]
    pub rate_presets: Vec<RatePreset>,
}

impl IsotopeEntry {
    /// Validate the half-life and build the catalog entry.
    pub fn to_isotope(&self) -> Result<Isotope, SimError> {
        let half_life = HalfLife::new(self.half_life)?;
        let display = IsotopeDisplay {
            symbol: self.symbol.clone().unwrap_or_else(|| self.id.clone()),
            decay_product: self.decay_product.clone().unwrap_or_default(),
            color: self.color.unwrap_or([128, 128, 128]),
            product_color: self.product_color.unwrap_or([64, 64, 64]),
            rate_presets: self.rate_presets.clone(),
        };
        Ok(Isotope::new(self.id.clone(), half_life, display))
    }
}

/// Configuration for a simulator instance.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Isotope selected at startup.
    pub isotope: String,
    /// Particles per population.
    pub population: usize,
    /// Clock rate in days of simulated time per real second.
    pub rate: f64,
    /// Log level filter string (e.g. "info", "debug", "halflife_sim=trace").
    pub log_level: String,
    /// Isotopes added to (or replacing entries of) the built-in catalog.
    pub isotopes: Vec<IsotopeEntry>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            isotope: DEFAULT_ISOTOPE.to_string(),
            population: DEFAULT_POPULATION,
            rate: DEFAULT_RATE,
            log_level: "info".to_string(),
            isotopes: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Default config file location, e.g. `~/.config/halflife/halflife.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("halflife").join("halflife.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default path is read
    /// if present. Environment variables prefixed with `HALFLIFE_` override
    /// file values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    builder = builder.add_source(config::File::from(default).required(false));
                }
            }
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let cfg: SimConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check ranges and that the selected isotope exists.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.population == 0 || self.population > MAX_POPULATION {
            return Err(SimError::invalid(format!(
                "population must be in 1..={MAX_POPULATION}, got {}",
                self.population
            )));
        }
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(SimError::invalid(format!(
                "rate must be non-negative and finite, got {}",
                self.rate
            )));
        }
        let catalog = self.catalog()?;
        catalog.get(&self.isotope)?;
        Ok(())
    }

    /// Built-in catalog merged with configured entries.
    pub fn catalog(&self) -> Result<Catalog, SimError> {
        let mut catalog = Catalog::builtin();
        for entry in &self.isotopes {
            catalog.insert(entry.to_isotope()?);
        }
        Ok(catalog)
    }

    /// An engine over this configuration's catalog, clock set to its rate.
    pub fn build_engine(&self) -> Result<SimulationEngine, SimError> {
        let mut engine = SimulationEngine::new(self.catalog()?);
        engine.set_rate(self.rate)?;
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("halflife.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.isotope, "rubidium");
        assert_eq!(cfg.population, 10);
        assert_eq!(cfg.rate, 365.25e9);
        assert_eq!(cfg.log_level, "info");
        cfg.validate().unwrap();
    }

    #[test]
    fn default_path_ends_with_file_name() {
        if let Some(path) = SimConfig::default_path() {
            assert!(path.ends_with("halflife/halflife.toml"), "{path:?}");
        }
    }

    #[test]
    fn load_from_file() {
        let (_dir, path) = write_config(
            r#"
isotope = "polonium"
population = 250
rate = 30.0
"#,
        );
        let cfg = SimConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.isotope, "polonium");
        assert_eq!(cfg.population, 250);
        assert_eq!(cfg.rate, 30.0);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn load_custom_isotope() {
        let (_dir, path) = write_config(
            r#"
isotope = "carbon"
population = 100

[[isotopes]]
id = "carbon"
half_life = 2092882.5
symbol = "C-14"
decay_product = "N-14"
"#,
        );
        let cfg = SimConfig::load(Some(&path)).unwrap();
        let catalog = cfg.catalog().unwrap();
        assert_eq!(catalog.len(), 3);
        let c14 = catalog.get("carbon").unwrap();
        assert_eq!(c14.display.symbol, "C-14");
        assert_eq!(c14.half_life.get(), 2092882.5);
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            SimConfig::load(Some(&path)),
            Err(ConfigError::Source(_))
        ));
    }

    #[test]
    fn unknown_isotope_fails_validation() {
        let cfg = SimConfig {
            isotope: "uranium".into(),
            ..SimConfig::default()
        };
        assert_eq!(
            cfg.validate().unwrap_err(),
            SimError::UnknownIsotope("uranium".into())
        );
    }

    #[test]
    fn zero_population_fails_validation() {
        let cfg = SimConfig {
            population: 0,
            ..SimConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SimError::InvalidInput(_))));
    }

    #[test]
    fn negative_rate_fails_validation() {
        let cfg = SimConfig {
            rate: -1.0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn invalid_entry_half_life_rejected() {
        let cfg = SimConfig {
            isotopes: vec![IsotopeEntry {
                id: "bad".into(),
                half_life: 0.0,
                symbol: None,
                decay_product: None,
                color: None,
                product_color: None,
                rate_presets: Vec::new(),
            }],
            ..SimConfig::default()
        };
        assert!(matches!(cfg.catalog(), Err(SimError::InvalidInput(_))));
    }

    #[test]
    fn entry_defaults_symbol_to_id() {
        let entry = IsotopeEntry {
            id: "x".into(),
            half_life: 1.0,
            symbol: None,
            decay_product: None,
            color: None,
            product_color: None,
            rate_presets: Vec::new(),
        };
        assert_eq!(entry.to_isotope().unwrap().display.symbol, "x");
    }

    #[test]
    fn build_engine_applies_rate() {
        let cfg = SimConfig {
            rate: 42.0,
            ..SimConfig::default()
        };
        let engine = cfg.build_engine().unwrap();
        assert_eq!(engine.clock().rate(), 42.0);
        assert!(engine.catalog().contains("rubidium"));
    }
}
