//! One-byte-per-site output maps
//!
//! Each map is written as an ESRI ASCII grid. Inactive sites are written
//! as 0; the fuel type map stores `fuel_type + 1` so that 0 stays free for
//! them.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::classify::CellOutputs;
use crate::config::{replace_template_vars, InputParameters};
use crate::error::OutputError;
use crate::grid::SiteOutputs;

/// Header value marking cells without data. Never produced by the encoders.
pub const NODATA_VALUE: i32 = -9999;

/// A row-major grid of byte values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRaster {
    rows: usize,
    columns: usize,
    values: Vec<u8>,
}

impl ByteRaster {
    fn encode(outputs: &SiteOutputs, value: impl Fn(&CellOutputs) -> u8) -> Self {
        Self {
            rows: outputs.rows(),
            columns: outputs.columns(),
            values: outputs
                .cells()
                .iter()
                .map(|cell| cell.as_ref().map_or(0, &value))
                .collect(),
        }
    }

    /// Final fuel type per site, `fuel_type + 1` (0 = inactive).
    pub fn fuel_type_map(outputs: &SiteOutputs) -> Self {
        Self::encode(outputs, |cell| cell.fuel_type.saturating_add(1))
    }

    /// Percent conifer per site, 0-100.
    pub fn percent_conifer_map(outputs: &SiteOutputs) -> Self {
        Self::encode(outputs, |cell| cell.percent_conifer)
    }

    /// Percent dead fir per site, 0-100.
    pub fn percent_dead_fir_map(outputs: &SiteOutputs) -> Self {
        Self::encode(outputs, |cell| cell.percent_dead_fir)
    }

    /// Value at (row, column)
    pub fn get(&self, row: usize, column: usize) -> Option<u8> {
        if row < self.rows && column < self.columns {
            Some(self.values[row * self.columns + column])
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

    /// Values in row-major order.
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Write as an ESRI ASCII grid, creating parent directories as needed.
    ///
    /// Row 0 is written first (the northern edge).
    ///
    /// # Errors
    /// Returns [`OutputError::EmptyPath`] for a blank path and
    /// [`OutputError::Io`] if the file cannot be written.
    pub fn write_ascii_grid(&self, path: &Path, cell_size: f64) -> Result<(), OutputError> {
        ensure_parent_dir(path)?;
        let io_err = |source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        self.write_to(&mut out, cell_size).map_err(io_err)?;
        out.flush().map_err(io_err)
    }

    fn write_to(&self, out: &mut impl Write, cell_size: f64) -> std::io::Result<()> {
        writeln!(out, "ncols {}", self.columns)?;
        writeln!(out, "nrows {}", self.rows)?;
        writeln!(out, "xllcorner 0")?;
        writeln!(out, "yllcorner 0")?;
        writeln!(out, "cellsize {cell_size}")?;
        writeln!(out, "NODATA_value {NODATA_VALUE}")?;
        for row in self.values.chunks(self.columns.max(1)) {
            let line: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Create the parent directory of an output path.
///
/// # Errors
/// Returns [`OutputError::EmptyPath`] if the path is empty or just whitespace.
pub fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    if path.to_string_lossy().trim().is_empty() {
        return Err(OutputError::EmptyPath);
    }
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| OutputError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Paths of the three maps written for one timestep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestepMaps {
    /// Fuel type map
    pub fuel_type: PathBuf,
    /// Percent conifer map
    pub percent_conifer: PathBuf,
    /// Percent dead fir map
    pub percent_dead_fir: PathBuf,
}

/// Write the fuel type, percent conifer and percent dead fir maps for a
/// timestep, resolving the parameter file's name templates under `output_dir`.
///
/// # Errors
/// Returns the first [`OutputError`] hit while writing.
pub fn write_timestep_maps(
    outputs: &SiteOutputs,
    parameters: &InputParameters,
    current_time: i32,
    output_dir: &Path,
    cell_size: f64,
) -> Result<TimestepMaps, OutputError> {
    let resolve = |template: &str| output_dir.join(replace_template_vars(template, current_time));
    let maps = TimestepMaps {
        fuel_type: resolve(&parameters.map_file_names),
        percent_conifer: resolve(&parameters.pct_conifer_file_name),
        percent_dead_fir: resolve(&parameters.pct_dead_fir_file_name),
    };

    info!("Writing Fuel map to {} ...", maps.fuel_type.display());
    ByteRaster::fuel_type_map(outputs).write_ascii_grid(&maps.fuel_type, cell_size)?;

    info!("Writing % Conifer map to {} ...", maps.percent_conifer.display());
    ByteRaster::percent_conifer_map(outputs).write_ascii_grid(&maps.percent_conifer, cell_size)?;

    info!("Writing % Dead Fir map to {} ...", maps.percent_dead_fir.display());
    ByteRaster::percent_dead_fir_map(outputs)
        .write_ascii_grid(&maps.percent_dead_fir, cell_size)?;

    Ok(maps)
}
