//! Error types for configuration loading and map output
//!
//! Everything that can go wrong is detected either while the fuel and
//! disturbance catalogs are built (a [`ConfigError`], usually wrapped in a
//! [`ParametersError`] that carries the line number) or while the finished
//! maps are written out ([`OutputError`]). Classification itself is
//! infallible.

use std::path::PathBuf;

/// Validation failure for a single configuration field or record.
///
/// Messages name the offending field, its value, and the violated constraint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A fuel index outside `1..=100`.
    #[error("fuel index {value} is out of range: value must be between 1 and 100")]
    FuelIndexOutOfRange {
        /// The rejected index
        value: i32,
    },

    /// A fuel index reused within the fuel type catalog.
    #[error("the fuel type {index} was previously used on line {first_line}")]
    DuplicateFuelIndex {
        /// The repeated index
        index: u8,
        /// Line (or 1-based record position) of the first use
        first_line: usize,
    },

    /// A negative minimum or maximum cohort age.
    #[error("{field} {value} is invalid: value must be = or > 0")]
    NegativeAge {
        /// `"min age"` or `"max age"`
        field: &'static str,
        /// The rejected age
        value: i32,
    },

    /// A disturbance rule whose age window is not positive.
    #[error("max age {value} is invalid: value must be > 0")]
    NonPositiveMaxAge {
        /// The rejected age
        value: i32,
    },

    /// A percentage-like parameter outside its allowed range.
    #[error("{field} {value} is out of range: value must be >= {min} and <= {max}")]
    OutOfRange {
        /// Parameter name
        field: &'static str,
        /// The rejected value
        value: i32,
        /// Inclusive lower bound
        min: i32,
        /// Inclusive upper bound
        max: i32,
    },

    /// A negative timestep.
    #[error("Timestep {value} is invalid: value must be = or > 0")]
    NegativeTimestep {
        /// The rejected value
        value: i32,
    },

    /// A fuel coefficient that is negative or not a finite number.
    #[error("fuel coefficient {value} for species {species} is invalid: value must be a finite number >= 0")]
    InvalidCoefficient {
        /// Species the coefficient belongs to
        species: String,
        /// The rejected coefficient
        value: f64,
    },

    /// A species name missing from the species dataset.
    #[error("{name} is not a species name")]
    UnknownSpecies {
        /// The unknown name
        name: String,
    },

    /// A species repeated where it may appear only once.
    #[error("the species {name} was previously used on line {first_line}")]
    DuplicateSpecies {
        /// The repeated name
        name: String,
        /// Line (or 1-based record position) of the first use
        first_line: usize,
    },

    /// A species repeated within one fuel type row.
    #[error("the species {name} appears more than once")]
    RepeatedFuelTypeSpecies {
        /// The repeated name
        name: String,
    },

    /// A `-` prefix with no species name after it.
    #[error("no species name after \"-\"")]
    MissingSpeciesAfterMinus,

    /// A fuel type with no species.
    #[error("at least one species is required")]
    EmptySpeciesList,

    /// A disturbance rule with no trigger labels.
    #[error("at least one prescription is required")]
    EmptyTriggerList,

    /// A base fuel word outside the closed set.
    #[error("\"{word}\" is not a base fuel type. Valid Fuel Types: Conifer, ConiferPlantation, Deciduous, Open, NoFuel, Slash")]
    UnknownBaseFuel {
        /// The rejected word
        word: String,
    },

    /// A map-name template that uses an unknown variable or unbalanced braces.
    #[error("invalid map name template \"{template}\": {reason}")]
    InvalidTemplate {
        /// The rejected template
        template: String,
        /// What is wrong with it
        reason: String,
    },

    /// A site holding cohorts for a species index the dataset does not define.
    #[error("site {site} has cohorts for species index {index}, but only {species} species are defined")]
    SiteSpeciesOutOfRange {
        /// Row-major site index
        site: usize,
        /// The undefined species index
        index: usize,
        /// Number of species in the dataset
        species: usize,
    },

    /// A landscape whose site list does not fill its grid.
    #[error("landscape is {rows} x {columns} but {found} sites were given")]
    SiteCountMismatch {
        /// Grid rows
        rows: usize,
        /// Grid columns
        columns: usize,
        /// Number of sites supplied
        found: usize,
    },
}

/// Failure while reading a parameter file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParametersError {
    /// A line that does not follow the expected layout.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number (0 when the input ended early)
        line: usize,
        /// What was expected
        message: String,
    },

    /// A well-formed line holding an invalid value.
    #[error("line {line}: {source}")]
    Invalid {
        /// 1-based line number
        line: usize,
        /// The violated constraint
        #[source]
        source: ConfigError,
    },
}

impl ParametersError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Line the error was detected on.
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. } | Self::Invalid { line, .. } => *line,
        }
    }
}

/// Failure while writing maps or the metadata manifest.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// The file or its parent directory could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The metadata could not be serialized.
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An output path was empty or whitespace.
    #[error("output path is empty or just whitespace")]
    EmptyPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_field_value_and_constraint() {
        let err = ConfigError::OutOfRange {
            field: "HardwoodMaximum",
            value: 120,
            min: 0,
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "HardwoodMaximum 120 is out of range: value must be >= 0 and <= 100"
        );

        let err = ConfigError::DuplicateFuelIndex {
            index: 7,
            first_line: 12,
        };
        assert_eq!(
            err.to_string(),
            "the fuel type 7 was previously used on line 12"
        );
    }

    #[test]
    fn test_parameters_error_carries_line() {
        let err = ParametersError::Invalid {
            line: 9,
            source: ConfigError::EmptyTriggerList,
        };
        assert_eq!(err.line(), 9);
        assert_eq!(err.to_string(), "line 9: at least one prescription is required");
    }
}
