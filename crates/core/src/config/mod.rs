//! Parameter file loading
//!
//! # Example parameter file
//!
//! ```text
//! LandisData  "Dynamic Fuel System"
//! Timestep  10
//!
//! >> Species   Fuel Coefficient
//! abiebals     1.0
//! poputrem     0.8
//!
//! HardwoodMaximum  15
//! DeadFirMaxAge    15
//!
//! FuelTypes
//! >> Index  BaseFuel     Age Range   Species
//!    1      Conifer      0 to 300    abiebals -poputrem
//!    2      Deciduous    0 to 150    poputrem
//!
//! DisturbanceConversionTable
//! >> Index  MaxAge  Prescriptions
//!    31     15      Clearcut  FireSeverity5
//!
//! MapFileNames        fuels/FuelType-{timestep}.asc
//! PctConiferFileName  fuels/PctConifer-{timestep}.asc
//! PctDeadFirFileName  fuels/PctDeadFir-{timestep}.asc
//! ```

pub mod map_names;
mod parser;

pub use map_names::{check_template_vars, replace_template_vars};
pub use parser::LANDIS_DATA_VALUE;

use crate::core_types::{DisturbanceCatalog, FuelCoefficients, FuelTypeCatalog, SpeciesDataset};
use crate::error::ParametersError;

/// Everything read from a parameter file. All values are validated.
#[derive(Debug, Clone)]
pub struct InputParameters {
    /// Years between runs
    pub timestep: u32,
    /// Dominance threshold in percent, 0-100
    pub hardwood_max: u8,
    /// Oldest dead fir cohorts still counted, in years
    pub dead_fir_max_age: u32,
    /// Per-species coefficients (default 1.0)
    pub coefficients: FuelCoefficients,
    /// Fuel types in file order
    pub fuel_types: FuelTypeCatalog,
    /// Disturbance conversion rules in file order
    pub disturbances: DisturbanceCatalog,
    /// Template for fuel type maps
    pub map_file_names: String,
    /// Template for percent conifer maps
    pub pct_conifer_file_name: String,
    /// Template for percent dead fir maps
    pub pct_dead_fir_file_name: String,
}

impl InputParameters {
    /// Parse parameter file text, resolving species names against `species`.
    ///
    /// # Errors
    /// Returns the first [`ParametersError`] found, with its line number.
    pub fn parse(text: &str, species: &SpeciesDataset) -> Result<Self, ParametersError> {
        parser::parse_parameters(text, species)
    }
}
