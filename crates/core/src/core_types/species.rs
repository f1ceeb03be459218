//! Species catalog supplied by the host simulation
//!
//! The classifier only needs three facts about a species: its position in
//! the catalog (used to index coefficient and multiplier tables), its name
//! (used by the parameter file), and its longevity (used to cap fuel type age
//! windows).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A tree species known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    /// Position in the [`SpeciesDataset`]
    #[serde(skip)]
    pub index: usize,
    /// Unique species code, e.g. `abiebals`
    pub name: String,
    /// Maximum age in years
    pub longevity: u32,
}

/// Ordered, name-indexed collection of species.
#[derive(Debug, Clone, Default)]
pub struct SpeciesDataset {
    species: Vec<Species>,
    by_name: FxHashMap<String, usize>,
}

impl SpeciesDataset {
    /// Build a dataset from `(name, longevity)` pairs in catalog order.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateSpecies`] if a name appears twice.
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut dataset = Self::default();
        for (name, longevity) in entries {
            dataset.push(name.into(), longevity)?;
        }
        Ok(dataset)
    }

    /// Build a dataset from deserialized records, reassigning indices by position.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateSpecies`] if a name appears twice.
    pub fn from_records(records: Vec<Species>) -> Result<Self, ConfigError> {
        Self::new(records.into_iter().map(|s| (s.name, s.longevity)))
    }

    fn push(&mut self, name: String, longevity: u32) -> Result<(), ConfigError> {
        let index = self.species.len();
        if let Some(&first) = self.by_name.get(&name) {
            return Err(ConfigError::DuplicateSpecies {
                name,
                first_line: first + 1,
            });
        }
        self.by_name.insert(name.clone(), index);
        self.species.push(Species {
            index,
            name,
            longevity,
        });
        Ok(())
    }

    /// Look up a species by name.
    pub fn get(&self, name: &str) -> Option<&Species> {
        self.by_name.get(name).map(|&i| &self.species[i])
    }

    /// Species at a catalog position.
    pub fn by_index(&self, index: usize) -> Option<&Species> {
        self.species.get(index)
    }

    /// Number of species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// True when no species are defined.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Species in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Species> {
        self.species.iter()
    }
}

impl<'a> IntoIterator for &'a SpeciesDataset {
    type Item = &'a Species;
    type IntoIter = std::slice::Iter<'a, Species>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Per-species fuel coefficients, indexed like the [`SpeciesDataset`].
///
/// Species without an explicit coefficient weigh 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelCoefficients {
    values: Vec<f64>,
}

impl FuelCoefficients {
    /// Default coefficient for species not listed in the parameter file.
    pub const DEFAULT: f64 = 1.0;

    /// All species at the default coefficient.
    pub fn new(species_count: usize) -> Self {
        Self {
            values: vec![Self::DEFAULT; species_count],
        }
    }

    /// Set the coefficient of one species.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidCoefficient`] for negative or non-finite values.
    pub fn set(&mut self, species: &Species, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidCoefficient {
                species: species.name.clone(),
                value,
            });
        }
        if species.index >= self.values.len() {
            self.values.resize(species.index + 1, Self::DEFAULT);
        }
        self.values[species.index] = value;
        Ok(())
    }

    /// Coefficient of a species.
    pub fn get(&self, species_index: usize) -> f64 {
        self.values
            .get(species_index)
            .copied()
            .unwrap_or(Self::DEFAULT)
    }
}
