use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use dynamic_fuels_core::{
    run_timestep, write_timestep_maps, ExtensionMetadata, FuelClassifier, InputParameters,
    Landscape, ScenarioMetadata, SiteOutputs, Species, SpeciesDataset,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Dynamic fuel system over a landscape snapshot
#[derive(Parser, Debug)]
#[command(name = "fuels-headless")]
#[command(about = "Classify fuel types for one timestep and write the maps", long_about = None)]
struct Args {
    /// Parameter file ("Dynamic Fuel System")
    #[arg(short, long)]
    parameters: PathBuf,

    /// Species table: JSON array of {"name", "longevity"}
    #[arg(short, long)]
    species: PathBuf,

    /// Landscape snapshot: JSON {"rows", "columns", "sites"} with null for inactive sites
    #[arg(short, long)]
    landscape: PathBuf,

    /// Simulation year being classified
    #[arg(short, long, default_value_t = 10)]
    time: i32,

    /// Directory receiving the maps and metadata
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Raster cell size in metres
    #[arg(long, default_value_t = 30.0)]
    cell_size: f64,

    /// First year of the scenario (metadata only)
    #[arg(long, default_value_t = 0)]
    start_time: i32,

    /// Last year of the scenario (metadata only, defaults to --time)
    #[arg(long)]
    end_time: Option<i32>,

    /// Print the number of sites per fuel type
    #[arg(short, long)]
    report: bool,
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {what} {}", path.display()))
}

fn load_species(path: &Path) -> Result<SpeciesDataset> {
    let records: Vec<Species> = serde_json::from_str(&read(path, "species table")?)
        .with_context(|| format!("parsing species table {}", path.display()))?;
    Ok(SpeciesDataset::from_records(records)?)
}

fn load_landscape(path: &Path) -> Result<Landscape> {
    serde_json::from_str(&read(path, "landscape")?)
        .with_context(|| format!("parsing landscape {}", path.display()))
}

fn print_report(outputs: &SiteOutputs) {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    let mut inactive = 0;
    for cell in outputs.cells() {
        match cell {
            Some(cell) => *counts.entry(cell.fuel_type).or_insert(0) += 1,
            None => inactive += 1,
        }
    }

    println!("\n=== Fuel Types ===");
    println!("{:>10} {:>8}", "fuel type", "sites");
    for (fuel_type, count) in &counts {
        println!("{fuel_type:>10} {count:>8}");
    }
    println!("{:>10} {inactive:>8}", "inactive");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let species = load_species(&args.species)?;
    let text = read(&args.parameters, "parameter file")?;
    let parameters = InputParameters::parse(&text, &species)
        .with_context(|| format!("in parameter file {}", args.parameters.display()))?;
    info!(
        species = species.len(),
        fuel_types = parameters.fuel_types.len(),
        disturbance_rules = parameters.disturbances.len(),
        timestep = parameters.timestep,
        "Parameters loaded"
    );

    let landscape = load_landscape(&args.landscape)?;
    landscape
        .check_species(&species)
        .with_context(|| format!("in landscape {}", args.landscape.display()))?;
    info!(
        rows = landscape.rows(),
        columns = landscape.columns(),
        active_sites = landscape.active_count(),
        "Landscape loaded"
    );

    let classifier = FuelClassifier::from_parameters(species, &parameters);
    let outputs = run_timestep(&landscape, &classifier, args.time);

    write_timestep_maps(&outputs, &parameters, args.time, &args.output_dir, args.cell_size)?;

    let scenario = ScenarioMetadata {
        cell_area: args.cell_size * args.cell_size / 10_000.0,
        time_min: args.start_time,
        time_max: args.end_time.unwrap_or(args.time),
    };
    let metadata_path = ExtensionMetadata::new(&parameters, scenario, args.time)
        .write(&args.output_dir.join("metadata"))?;
    info!(path = %metadata_path.display(), "Metadata written");

    if args.report {
        print_report(&outputs);
    }

    Ok(())
}
