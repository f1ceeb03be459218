//! Landscape grid and the per-timestep driver
//!
//! Sites are stored row-major, row 0 first. An inactive site holds `None`
//! and is never classified.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{CellOutputs, FuelClassifier};
use crate::core_types::{CellInputs, SpeciesDataset};
use crate::error::ConfigError;

/// Row-major grid of sites, each inactive or holding a [`CellInputs`] snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LandscapeRecord", into = "LandscapeRecord")]
pub struct Landscape {
    rows: usize,
    columns: usize,
    sites: Vec<Option<CellInputs>>,
}

/// Serialized form; `sites` uses `null` for inactive sites.
#[derive(Serialize, Deserialize)]
struct LandscapeRecord {
    rows: usize,
    columns: usize,
    sites: Vec<Option<CellInputs>>,
}

impl TryFrom<LandscapeRecord> for Landscape {
    type Error = ConfigError;

    fn try_from(record: LandscapeRecord) -> Result<Self, Self::Error> {
        Self::from_sites(record.rows, record.columns, record.sites)
    }
}

impl From<Landscape> for LandscapeRecord {
    fn from(landscape: Landscape) -> Self {
        Self {
            rows: landscape.rows,
            columns: landscape.columns,
            sites: landscape.sites,
        }
    }
}

impl Landscape {
    /// Grid with every site inactive.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            sites: vec![None; rows * columns],
        }
    }

    /// Grid from a row-major site list.
    ///
    /// # Errors
    /// Returns [`ConfigError::SiteCountMismatch`] unless `sites` holds exactly
    /// `rows * columns` entries.
    pub fn from_sites(
        rows: usize,
        columns: usize,
        sites: Vec<Option<CellInputs>>,
    ) -> Result<Self, ConfigError> {
        if sites.len() != rows * columns {
            return Err(ConfigError::SiteCountMismatch {
                rows,
                columns,
                found: sites.len(),
            });
        }
        Ok(Self {
            rows,
            columns,
            sites,
        })
    }

    /// Site index from (row, column)
    #[inline]
    pub fn site_index(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    /// Activate a site. Returns false when (row, column) is outside the grid.
    pub fn set_site(&mut self, row: usize, column: usize, cell: CellInputs) -> bool {
        if row < self.rows && column < self.columns {
            let idx = self.site_index(row, column);
            self.sites[idx] = Some(cell);
            true
        } else {
            false
        }
    }

    /// Inputs of an active site; `None` for inactive or out-of-bounds sites.
    pub fn site(&self, row: usize, column: usize) -> Option<&CellInputs> {
        if row < self.rows && column < self.columns {
            self.sites[self.site_index(row, column)].as_ref()
        } else {
            None
        }
    }

    /// Check that every site's cohorts belong to species in `species`.
    ///
    /// # Errors
    /// Returns [`ConfigError::SiteSpeciesOutOfRange`] for the first site with
    /// cohorts past the end of the dataset.
    pub fn check_species(&self, species: &SpeciesDataset) -> Result<(), ConfigError> {
        for (site, cell) in self.sites.iter().enumerate() {
            let highest = cell
                .as_ref()
                .and_then(|cell| cell.cohorts.highest_species_index());
            if let Some(index) = highest.filter(|&index| index >= species.len()) {
                return Err(ConfigError::SiteSpeciesOutOfRange {
                    site,
                    index,
                    species: species.len(),
                });
            }
        }
        Ok(())
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// All sites in row-major order.
    pub fn sites(&self) -> &[Option<CellInputs>] {
        &self.sites
    }

    /// Get number of active sites
    pub fn active_count(&self) -> usize {
        self.sites.iter().filter(|s| s.is_some()).count()
    }
}

/// Classification results for every site of a [`Landscape`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteOutputs {
    rows: usize,
    columns: usize,
    cells: Vec<Option<CellOutputs>>,
}

impl SiteOutputs {
    /// Outputs of an active site; `None` for inactive or out-of-bounds sites.
    pub fn get(&self, row: usize, column: usize) -> Option<&CellOutputs> {
        if row < self.rows && column < self.columns {
            self.cells[row * self.columns + column].as_ref()
        } else {
            None
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// All outputs in row-major order.
    pub fn cells(&self) -> &[Option<CellOutputs>] {
        &self.cells
    }
}

/// Classify every active site for one timestep (parallel).
///
/// Outputs start from zero on each call, so nothing carries over from a
/// previous timestep.
pub fn run_timestep(
    landscape: &Landscape,
    classifier: &FuelClassifier,
    current_time: i32,
) -> SiteOutputs {
    info!("Calculating the Dynamic Fuel Type for all active cells...");

    let cells: Vec<Option<CellOutputs>> = landscape
        .sites
        .par_iter()
        .map(|site| site.as_ref().map(|cell| classifier.classify(cell, current_time)))
        .collect();

    debug!(
        current_time,
        active_sites = landscape.active_count(),
        total_sites = cells.len(),
        "Timestep classified"
    );

    SiteOutputs {
        rows: landscape.rows,
        columns: landscape.columns,
        cells,
    }
}
