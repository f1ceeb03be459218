//! Dynamic Fuel System Core Library
//!
//! Derives a fuel type for every active site of a forest landscape from its
//! live tree cohorts, using a weighted, age-windowed scoring of user-defined
//! fuel types followed by a conifer/hardwood dominance check and overrides
//! for recent harvest, fire and wind. Also reports the share of recently
//! killed fir at each site.
//!
//! ## Pipeline
//!
//! - Parse the parameter file into validated catalogs ([`InputParameters`])
//! - Build a [`FuelClassifier`] against the host's [`SpeciesDataset`]
//! - Classify every active site of a [`Landscape`] with [`run_timestep`]
//! - Write the byte maps ([`ByteRaster`]) and the [`ExtensionMetadata`] manifest

// Catalogs and per-site inputs
pub mod core_types;

// Fuel type assignment and percent dead fir
pub mod classify;

// Parameter file and map-name templates
pub mod config;

pub mod error;

// Landscape iteration and map output
pub mod grid;

pub mod metadata;

// Re-export core types
pub use core_types::{
    BaseFuelType, CellInputs, DeadFirHistory, DisturbanceCatalog, DisturbanceHistory,
    DisturbanceType, FuelCoefficients, FuelType, FuelTypeCatalog, Multiplier, SiteCohorts,
    Species, SpeciesDataset,
};

// Re-export engine and configuration types
pub use classify::{CellOutputs, FuelAssignment, FuelClassifier};
pub use config::InputParameters;
pub use error::{ConfigError, OutputError, ParametersError};

// Re-export grid and output types
pub use grid::{
    run_timestep, write_timestep_maps, ByteRaster, Landscape, SiteOutputs, TimestepMaps,
};
pub use metadata::{ExtensionMetadata, ScenarioMetadata};
