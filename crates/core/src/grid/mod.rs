//! Landscape iteration and map output

pub mod landscape;
pub mod raster;

pub use landscape::{run_timestep, Landscape, SiteOutputs};
pub use raster::{write_timestep_maps, ByteRaster, TimestepMaps};
