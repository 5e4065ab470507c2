//! Isotope catalog: identifier → [`Isotope`].
//!
//! The built-in catalog reproduces the two isotopes of the classroom
//! simulation this crate models, with half-lives in days.

use std::collections::BTreeMap;

use crate::constants::{DAYS_PER_YEAR, POLONIUM_HALF_LIFE_DAYS, RUBIDIUM_HALF_LIFE_DAYS};
use crate::error::SimError;
use crate::types::{HalfLife, Isotope, IsotopeDisplay, RatePreset};

/// Fixed mapping from isotope identifier to its configuration.
///
/// Iteration order is by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    isotopes: BTreeMap<String, Isotope>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding polonium-210 and rubidium-87.
    ///
    /// # Examples
    ///
    /// ```
    /// use halflife_core::Catalog;
    /// let catalog = Catalog::builtin();
    /// assert!(catalog.get("rubidium").is_ok());
    /// assert!(catalog.get("uranium").is_err());
    /// ```
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(Isotope::new(
            "polonium",
            HalfLife(POLONIUM_HALF_LIFE_DAYS),
            IsotopeDisplay {
                symbol: "Po-210".into(),
                decay_product: "Pb-206".into(),
                color: [139, 0, 255],
                product_color: [70, 130, 180],
                rate_presets: vec![
                    RatePreset::new("1 day/sec", 1.0),
                    RatePreset::new("30 days/sec", 30.0),
                    RatePreset::new("1 year/sec", DAYS_PER_YEAR),
                ],
            },
        ));
        catalog.insert(Isotope::new(
            "rubidium",
            HalfLife(RUBIDIUM_HALF_LIFE_DAYS),
            IsotopeDisplay {
                symbol: "Rb-87".into(),
                decay_product: "Sr-87".into(),
                color: [255, 69, 0],
                product_color: [0, 191, 255],
                rate_presets: vec![
                    RatePreset::new("100M years/sec", DAYS_PER_YEAR * 1e8),
                    RatePreset::new("1B years/sec", DAYS_PER_YEAR * 1e9),
                    RatePreset::new("10B years/sec", DAYS_PER_YEAR * 1e10),
                ],
            },
        ));
        catalog
    }

    /// Add or replace an isotope. Returns the entry it replaced.
    pub fn insert(&mut self, isotope: Isotope) -> Option<Isotope> {
        self.isotopes.insert(isotope.id.clone(), isotope)
    }

    /// Look up an isotope by identifier.
    pub fn get(&self, id: &str) -> Result<&Isotope, SimError> {
        self.isotopes
            .get(id)
            .ok_or_else(|| SimError::UnknownIsotope(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.isotopes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Isotope> {
        self.isotopes.values()
    }

    pub fn len(&self) -> usize {
        self.isotopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.isotopes.is_empty()
    }
}

impl FromIterator<Isotope> for Catalog {
    fn from_iter<I: IntoIterator<Item = Isotope>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for isotope in iter {
            catalog.insert(isotope);
        }
        catalog
    }
}
