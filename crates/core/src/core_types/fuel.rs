//! Fuel type definitions and the fuel type catalog
//!
//! A fuel type is a named classification bucket: a base category that drives
//! the dominance rules, a cohort age window, and a per-species multiplier
//! saying whether a species counts for (+1) or against (-1) the type.
//!
//! # Base fuel categories
//!
//! Roughly follow the Canadian Forest Fire Behavior Prediction system. The
//! seasonal mixedwood and grass types (M2, M4, O1b) are not represented here;
//! they depend on leaf-on/leaf-off state derived by the fire model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest valid fuel index.
pub const MAX_FUEL_INDEX: u8 = 100;

/// Number of score slots needed to address every fuel index directly.
/// Slot 0 is the "no fuel type" sentinel.
pub const FUEL_INDEX_SLOTS: usize = MAX_FUEL_INDEX as usize + 1;

/// Check that a raw fuel index lies in `1..=100`.
///
/// # Errors
/// Returns [`ConfigError::FuelIndexOutOfRange`] otherwise.
pub fn validate_fuel_index(value: i32) -> Result<u8, ConfigError> {
    match u8::try_from(value) {
        Ok(index) if (1..=MAX_FUEL_INDEX).contains(&index) => Ok(index),
        _ => Err(ConfigError::FuelIndexOutOfRange { value }),
    }
}

/// Coarse vegetation class of a fuel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseFuelType {
    /// Conifer stands (C-types)
    Conifer,
    /// Conifer plantation; fully dominates the dominance calculation
    ConiferPlantation,
    /// Deciduous stands (D-types)
    Deciduous,
    /// Non-fuel (water, rock)
    NoFuel,
    /// Open grass (O-types); zeroes dominance
    Open,
    /// Logging slash (S-types); zeroes dominance
    Slash,
}

impl BaseFuelType {
    const TABLE: [(&'static str, BaseFuelType); 6] = [
        ("Conifer", BaseFuelType::Conifer),
        ("ConiferPlantation", BaseFuelType::ConiferPlantation),
        ("Deciduous", BaseFuelType::Deciduous),
        ("Open", BaseFuelType::Open),
        ("NoFuel", BaseFuelType::NoFuel),
        ("Slash", BaseFuelType::Slash),
    ];

    /// Counts toward the conifer dominance sum.
    pub fn is_conifer(self) -> bool {
        matches!(self, Self::Conifer | Self::ConiferPlantation)
    }

    /// Label used in parameter files.
    pub fn label(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, variant)| *variant == self)
            .map_or("NoFuel", |(label, _)| *label)
    }
}

impl FromStr for BaseFuelType {
    type Err = ConfigError;

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        Self::TABLE
            .iter()
            .find(|(label, _)| *label == word)
            .map(|(_, variant)| *variant)
            .ok_or_else(|| ConfigError::UnknownBaseFuel {
                word: word.to_string(),
            })
    }
}

impl fmt::Display for BaseFuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a species contributes to a fuel type score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Multiplier {
    /// Species presence raises the score
    Positive,
    /// Species presence lowers the score
    Negative,
}

impl Multiplier {
    /// Signed integer form (+1 / -1).
    pub fn value(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

/// One fuel classification bucket. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelType {
    fuel_index: u8,
    base_fuel: BaseFuelType,
    min_age: u32,
    max_age: u32,
    /// Dense by species index; 0 = species irrelevant
    multipliers: Vec<i8>,
}

impl FuelType {
    /// Build and validate a fuel type.
    ///
    /// `species` lists `(species index, multiplier)` pairs; species not
    /// listed are irrelevant to this type.
    ///
    /// # Errors
    /// - [`ConfigError::FuelIndexOutOfRange`] unless `1 <= fuel_index <= 100`
    /// - [`ConfigError::NegativeAge`] for a negative min or max age
    /// - [`ConfigError::EmptySpeciesList`] if `species` is empty
    pub fn new<I>(
        fuel_index: i32,
        base_fuel: BaseFuelType,
        min_age: i32,
        max_age: i32,
        species: I,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (usize, Multiplier)>,
    {
        let fuel_index = validate_fuel_index(fuel_index)?;
        let min_age = u32::try_from(min_age).map_err(|_| ConfigError::NegativeAge {
            field: "min age",
            value: min_age,
        })?;
        let max_age = u32::try_from(max_age).map_err(|_| ConfigError::NegativeAge {
            field: "max age",
            value: max_age,
        })?;

        let mut multipliers = Vec::new();
        for (species_index, multiplier) in species {
            if species_index >= multipliers.len() {
                multipliers.resize(species_index + 1, 0);
            }
            multipliers[species_index] = multiplier.value();
        }
        if multipliers.iter().all(|&m| m == 0) {
            return Err(ConfigError::EmptySpeciesList);
        }

        Ok(Self {
            fuel_index,
            base_fuel,
            min_age,
            max_age,
            multipliers,
        })
    }

    /// Index in `1..=100`.
    pub fn fuel_index(&self) -> u8 {
        self.fuel_index
    }

    /// Base category.
    pub fn base_fuel(&self) -> BaseFuelType {
        self.base_fuel
    }

    /// Youngest cohort age the type reacts to.
    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    /// Oldest cohort age the type reacts to.
    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Multiplier for a species: -1, 0 or +1.
    pub fn multiplier(&self, species_index: usize) -> i8 {
        self.multipliers.get(species_index).copied().unwrap_or(0)
    }

    /// True when `age` falls inside `[min_age, max_age]`.
    pub fn contains_age(&self, age: u32) -> bool {
        age >= self.min_age && age <= self.max_age
    }
}

/// Ordered fuel types with unique indices.
#[derive(Debug, Clone, Default)]
pub struct FuelTypeCatalog {
    fuel_types: Vec<FuelType>,
    /// Catalog position for each fuel index, `None` when undefined
    positions: Vec<Option<usize>>,
}

impl FuelTypeCatalog {
    /// Build a catalog from fuel types in definition order.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateFuelIndex`] naming the 1-based position
    /// of the first record that used a repeated index.
    pub fn new<I>(fuel_types: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = FuelType>,
    {
        let mut builder = FuelTypeCatalogBuilder::default();
        for (position, fuel_type) in fuel_types.into_iter().enumerate() {
            builder.add(fuel_type, position + 1)?;
        }
        Ok(builder.build())
    }

    /// Start an incremental build, used when positions are file line numbers.
    pub fn builder() -> FuelTypeCatalogBuilder {
        FuelTypeCatalogBuilder::default()
    }

    /// Fuel type with a given index.
    pub fn get(&self, fuel_index: u8) -> Option<&FuelType> {
        self.positions
            .get(usize::from(fuel_index))
            .copied()
            .flatten()
            .map(|p| &self.fuel_types[p])
    }

    /// Base category of a fuel index, `None` for 0 or undefined indices.
    pub fn base_fuel_of(&self, fuel_index: u8) -> Option<BaseFuelType> {
        self.get(fuel_index).map(FuelType::base_fuel)
    }

    /// Number of fuel types.
    pub fn len(&self) -> usize {
        self.fuel_types.len()
    }

    /// True when the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.fuel_types.is_empty()
    }

    /// Fuel types in definition order.
    pub fn iter(&self) -> std::slice::Iter<'_, FuelType> {
        self.fuel_types.iter()
    }
}

impl<'a> IntoIterator for &'a FuelTypeCatalog {
    type Item = &'a FuelType;
    type IntoIter = std::slice::Iter<'a, FuelType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Incremental [`FuelTypeCatalog`] construction with caller-supplied positions.
#[derive(Debug, Default)]
pub struct FuelTypeCatalogBuilder {
    fuel_types: Vec<FuelType>,
    first_use: Vec<Option<usize>>,
}

impl FuelTypeCatalogBuilder {
    /// Append a fuel type defined at `position` (line number or ordinal).
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateFuelIndex`] if the index was already added.
    pub fn add(&mut self, fuel_type: FuelType, position: usize) -> Result<(), ConfigError> {
        let slot = usize::from(fuel_type.fuel_index);
        if self.first_use.len() < FUEL_INDEX_SLOTS {
            self.first_use.resize(FUEL_INDEX_SLOTS, None);
        }
        if let Some(first_line) = self.first_use[slot] {
            return Err(ConfigError::DuplicateFuelIndex {
                index: fuel_type.fuel_index,
                first_line,
            });
        }
        self.first_use[slot] = Some(position);
        self.fuel_types.push(fuel_type);
        Ok(())
    }

    /// Finish the catalog.
    pub fn build(self) -> FuelTypeCatalog {
        let mut positions = vec![None; FUEL_INDEX_SLOTS];
        for (position, fuel_type) in self.fuel_types.iter().enumerate() {
            positions[usize::from(fuel_type.fuel_index)] = Some(position);
        }
        FuelTypeCatalog {
            fuel_types: self.fuel_types,
            positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conifer(index: i32) -> FuelType {
        FuelType::new(
            index,
            BaseFuelType::Conifer,
            0,
            100,
            [(0, Multiplier::Positive)],
        )
        .unwrap()
    }

    #[test]
    fn test_fuel_index_range() {
        assert!(validate_fuel_index(1).is_ok());
        assert!(validate_fuel_index(100).is_ok());
        assert_eq!(
            validate_fuel_index(0),
            Err(ConfigError::FuelIndexOutOfRange { value: 0 })
        );
        assert_eq!(
            validate_fuel_index(101),
            Err(ConfigError::FuelIndexOutOfRange { value: 101 })
        );
        assert!(validate_fuel_index(-3).is_err());
    }

    #[test]
    fn test_fuel_type_rejects_negative_ages() {
        let err = FuelType::new(3, BaseFuelType::Open, -1, 10, [(0, Multiplier::Positive)])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NegativeAge {
                field: "min age",
                value: -1
            }
        );
    }

    #[test]
    fn test_fuel_type_requires_species() {
        let err = FuelType::new(3, BaseFuelType::Open, 0, 10, Vec::<(usize, Multiplier)>::new())
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptySpeciesList);
    }

    #[test]
    fn test_multiplier_lookup() {
        let fuel_type = FuelType::new(
            4,
            BaseFuelType::Deciduous,
            0,
            50,
            [(2, Multiplier::Positive), (5, Multiplier::Negative)],
        )
        .unwrap();

        assert_eq!(fuel_type.multiplier(0), 0);
        assert_eq!(fuel_type.multiplier(2), 1);
        assert_eq!(fuel_type.multiplier(5), -1);
        assert_eq!(fuel_type.multiplier(40), 0);
        assert!(fuel_type.contains_age(0));
        assert!(fuel_type.contains_age(50));
        assert!(!fuel_type.contains_age(51));
    }

    #[test]
    fn test_base_fuel_parse_closed_set() {
        assert_eq!(
            "ConiferPlantation".parse::<BaseFuelType>(),
            Ok(BaseFuelType::ConiferPlantation)
        );
        assert_eq!("Slash".parse::<BaseFuelType>(), Ok(BaseFuelType::Slash));
        assert!("conifer".parse::<BaseFuelType>().is_err());
        assert_eq!(BaseFuelType::NoFuel.to_string(), "NoFuel");
        assert!(BaseFuelType::ConiferPlantation.is_conifer());
        assert!(!BaseFuelType::Deciduous.is_conifer());
    }

    #[test]
    fn test_catalog_rejects_duplicate_index() {
        let err = FuelTypeCatalog::new([conifer(7), conifer(2), conifer(7)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateFuelIndex {
                index: 7,
                first_line: 1
            }
        );
    }

    #[test]
    fn test_catalog_lookup_and_order() {
        let catalog = FuelTypeCatalog::new([conifer(9), conifer(2)]).unwrap();
        let order: Vec<u8> = catalog.iter().map(FuelType::fuel_index).collect();
        assert_eq!(order, vec![9, 2]);
        assert_eq!(catalog.base_fuel_of(2), Some(BaseFuelType::Conifer));
        assert_eq!(catalog.base_fuel_of(0), None);
        assert_eq!(catalog.base_fuel_of(100), None);
    }
}
