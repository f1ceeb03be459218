//! Fuel classification engine
//!
//! [`FuelClassifier`] bundles the validated catalogs and settings and turns a
//! [`CellInputs`] snapshot into [`CellOutputs`]. It holds no mutable state, so
//! one classifier can be shared across threads and sites evaluated in any
//! order.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamic_fuels_core::{FuelClassifier, InputParameters, SpeciesDataset};
//!
//! let species = SpeciesDataset::new([("abiebals", 200), ("poputrem", 120)])?;
//! let parameters = InputParameters::parse(&text, &species)?;
//! let classifier = FuelClassifier::from_parameters(species, &parameters);
//! let outputs = classifier.classify(&cell, 40);
//! ```

pub mod dead_fir;
pub mod engine;

pub use dead_fir::percent_dead_fir;
pub use engine::{
    apply_disturbances, classify_fuel, cohort_value, score_fuel_types, select_fuel_type,
    ClassificationContext, FuelAssignment, FuelScores,
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::InputParameters;
use crate::core_types::{
    CellInputs, DisturbanceCatalog, FuelCoefficients, FuelTypeCatalog, SpeciesDataset,
};

/// Derived values for one site and timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CellOutputs {
    /// Final fuel index (0 = none)
    pub fuel_type: u8,
    /// Best deciduous fuel index (0 = none)
    pub decid_fuel_type: u8,
    /// Conifer dominance, 0-100
    pub percent_conifer: u8,
    /// Hardwood dominance, 0-100
    pub percent_hardwood: u8,
    /// Recently killed fir as a share of all cohorts, 0-100
    pub percent_dead_fir: u8,
}

impl CellOutputs {
    fn new(assignment: FuelAssignment, percent_dead_fir: u8) -> Self {
        Self {
            fuel_type: assignment.fuel_type,
            decid_fuel_type: assignment.decid_fuel_type,
            percent_conifer: assignment.percent_conifer,
            percent_hardwood: assignment.percent_hardwood,
            percent_dead_fir,
        }
    }
}

/// Validated catalogs plus the scalar settings used by every site.
#[derive(Debug, Clone)]
pub struct FuelClassifier {
    species: SpeciesDataset,
    fuel_types: FuelTypeCatalog,
    disturbances: DisturbanceCatalog,
    coefficients: FuelCoefficients,
    hardwood_max: u8,
    dead_fir_max_age: u32,
}

impl FuelClassifier {
    /// Assemble a classifier from already-validated parts.
    pub fn new(
        species: SpeciesDataset,
        fuel_types: FuelTypeCatalog,
        disturbances: DisturbanceCatalog,
        coefficients: FuelCoefficients,
        hardwood_max: u8,
        dead_fir_max_age: u32,
    ) -> Self {
        if fuel_types.is_empty() {
            warn!("No fuel types defined; every site will classify as fuel type 0");
        }
        let unmapped = disturbances
            .iter()
            .filter(|rule| fuel_types.get(rule.fuel_index()).is_none())
            .count();
        debug!(
            species = species.len(),
            fuel_types = fuel_types.len(),
            disturbance_rules = disturbances.len(),
            conversion_only_rules = unmapped,
            hardwood_max,
            dead_fir_max_age,
            "Fuel classifier ready"
        );

        Self {
            species,
            fuel_types,
            disturbances,
            coefficients,
            hardwood_max,
            dead_fir_max_age,
        }
    }

    /// Build from a parsed parameter file.
    pub fn from_parameters(species: SpeciesDataset, parameters: &InputParameters) -> Self {
        Self::new(
            species,
            parameters.fuel_types.clone(),
            parameters.disturbances.clone(),
            parameters.coefficients.clone(),
            parameters.hardwood_max,
            parameters.dead_fir_max_age,
        )
    }

    /// Borrowed view used by the engine functions.
    pub fn context(&self) -> ClassificationContext<'_> {
        ClassificationContext {
            species: &self.species,
            fuel_types: &self.fuel_types,
            disturbances: &self.disturbances,
            coefficients: &self.coefficients,
            hardwood_max: self.hardwood_max,
        }
    }

    /// Fuel type and dominance only.
    pub fn classify_fuel(&self, cell: &CellInputs, current_time: i32) -> FuelAssignment {
        classify_fuel(&self.context(), cell, current_time)
    }

    /// Dead fir share only.
    pub fn percent_dead_fir(&self, cell: &CellInputs, current_time: i32) -> u8 {
        percent_dead_fir(cell, current_time, self.dead_fir_max_age)
    }

    /// Every derived value for one site.
    pub fn classify(&self, cell: &CellInputs, current_time: i32) -> CellOutputs {
        CellOutputs::new(
            self.classify_fuel(cell, current_time),
            self.percent_dead_fir(cell, current_time),
        )
    }

    /// Species catalog the classifier was built with.
    pub fn species(&self) -> &SpeciesDataset {
        &self.species
    }

    /// Fuel type catalog.
    pub fn fuel_types(&self) -> &FuelTypeCatalog {
        &self.fuel_types
    }

    /// Disturbance rules.
    pub fn disturbances(&self) -> &DisturbanceCatalog {
        &self.disturbances
    }
}
