//! Core types: species, fuel types, disturbance rules and per-site inputs

pub mod cohort;
pub mod disturbance;
pub mod fuel;
pub mod species;

pub use cohort::{CellInputs, DeadFirHistory, DisturbanceHistory, SiteCohorts};
pub use disturbance::{DisturbanceCatalog, DisturbanceType, SeverityKind};
pub use fuel::{
    validate_fuel_index, BaseFuelType, FuelType, FuelTypeCatalog, FuelTypeCatalogBuilder,
    Multiplier, FUEL_INDEX_SLOTS, MAX_FUEL_INDEX,
};
pub use species::{FuelCoefficients, Species, SpeciesDataset};
