//! Metadata manifest describing the maps an extension run produces

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{replace_template_vars, InputParameters, LANDIS_DATA_VALUE};
use crate::error::OutputError;
use crate::grid::raster::ensure_parent_dir;

/// Name the extension reports in its manifest.
pub const EXTENSION_NAME: &str = LANDIS_DATA_VALUE;

/// Kind of output an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// Raster map
    Map,
}

/// How map values should be read by viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapDataType {
    /// Numeric values
    Continuous,
}

/// Scenario-wide facts shared by every output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    /// Area of one raster cell, in hectares
    pub cell_area: f64,
    /// First simulated year
    pub time_min: i32,
    /// Last simulated year
    pub time_max: i32,
}

/// One output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMetadata {
    #[serde(rename = "type")]
    pub output_type: OutputType,
    pub name: String,
    /// Resolved path, relative to the output directory
    pub file_path: PathBuf,
    pub data_type: MapDataType,
    pub visualize: bool,
}

impl OutputMetadata {
    fn map(name: &str, template: &str, current_time: i32) -> Self {
        Self {
            output_type: OutputType::Map,
            name: name.to_string(),
            file_path: PathBuf::from(replace_template_vars(template, current_time)),
            data_type: MapDataType::Continuous,
            visualize: true,
        }
    }
}

/// Manifest for one extension run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    pub name: String,
    /// Years between runs
    pub timestep: u32,
    pub scenario: ScenarioMetadata,
    pub outputs: Vec<OutputMetadata>,
}

impl ExtensionMetadata {
    /// Describe the three maps written at `current_time`.
    pub fn new(
        parameters: &InputParameters,
        scenario: ScenarioMetadata,
        current_time: i32,
    ) -> Self {
        Self {
            name: EXTENSION_NAME.to_string(),
            timestep: parameters.timestep,
            scenario,
            outputs: vec![
                OutputMetadata::map("Fuel_Map", &parameters.map_file_names, current_time),
                OutputMetadata::map(
                    "Percent_Conifer",
                    &parameters.pct_conifer_file_name,
                    current_time,
                ),
                OutputMetadata::map(
                    "Percent_Dead_Fir",
                    &parameters.pct_dead_fir_file_name,
                    current_time,
                ),
            ],
        }
    }

    /// Write as pretty JSON to `<dir>/<name>.json` and return the path.
    ///
    /// # Errors
    /// Returns [`OutputError`] if serialization or the write fails.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, OutputError> {
        let path = dir.join(format!("{}.json", self.name));
        ensure_parent_dir(&path)?;

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&path, contents).map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "Metadata written");
        Ok(path)
    }

    /// Load a manifest written by [`ExtensionMetadata::write`].
    ///
    /// # Errors
    /// Returns [`OutputError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, OutputError> {
        let contents = fs::read_to_string(path).map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}
