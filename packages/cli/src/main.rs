#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI for the overdose map batch toolchain.
//!
//! Each subcommand is one standalone batch job: read the input files,
//! perform a fixed transformation or rendering pass, write the output
//! artifacts, exit. Nothing is shared between runs and every run
//! recomputes from scratch.

mod config;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use overdose_map_aggregate::CaseCounts;
use overdose_map_geometry::BoundaryMap;
use overdose_map_render::{ChoroplethOptions, ColorRamp, FacetedOptions};

#[derive(Parser)]
#[command(name = "overdose_map", about = "Overdose choropleth toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter the raw incident export down to county ZIPs
    Prepare {
        /// Raw incident CSV
        #[arg(long, default_value = config::RAW_CSV_PATH)]
        input: PathBuf,
        /// County boundary GeoJSON providing the valid ZIP set
        #[arg(long, default_value = config::GEOJSON_PATH)]
        geojson: PathBuf,
        /// County-only output CSV
        #[arg(long, default_value = config::COUNTY_CSV_PATH)]
        output: PathBuf,
    },
    /// Append drug_count and drug_case_type columns
    DrugTypes {
        /// County-only incident CSV
        #[arg(long, default_value = config::COUNTY_CSV_PATH)]
        input: PathBuf,
        /// Classified output CSV
        #[arg(long, default_value = config::DRUG_TYPE_CSV_PATH)]
        output: PathBuf,
    },
    /// Melt the substance slot columns into long format
    Unpivot {
        /// County-only incident CSV
        #[arg(long, default_value = config::COUNTY_CSV_PATH)]
        input: PathBuf,
        /// Long-format output CSV
        #[arg(long, default_value = config::LONG_CSV_PATH)]
        output: PathBuf,
    },
    /// Render the county choropleth and the augmented GeoJSON
    Choropleth {
        /// County boundary GeoJSON
        #[arg(long, default_value = config::GEOJSON_PATH)]
        geojson: PathBuf,
        /// County-only incident CSV
        #[arg(long, default_value = config::COUNTY_CSV_PATH)]
        csv: PathBuf,
        /// Output image path
        #[arg(long, default_value = config::CHOROPLETH_PNG_PATH)]
        out_png: PathBuf,
        /// Output augmented GeoJSON path
        #[arg(long, default_value = config::AUGMENTED_GEOJSON_PATH)]
        out_geojson: PathBuf,
        /// Color ramp name (viridis, reds)
        #[arg(long, default_value = config::SINGLE_MAP_RAMP)]
        ramp: String,
        /// Annotate every region with its ZIP at the ring centroid
        #[arg(long)]
        label_all: bool,
    },
    /// Render the faceted per-year choropleth
    Faceted {
        /// County boundary GeoJSON
        #[arg(long, default_value = config::GEOJSON_PATH)]
        geojson: PathBuf,
        /// County-only incident CSV (requires a case_year column)
        #[arg(long, default_value = config::COUNTY_CSV_PATH)]
        csv: PathBuf,
        /// Output image path
        #[arg(long, default_value = config::FACETED_PNG_PATH)]
        out_png: PathBuf,
        /// Color ramp name (viridis, reds)
        #[arg(long, default_value = config::FACETED_RAMP)]
        ramp: String,
        /// Years to facet, one panel each
        #[arg(long, value_delimiter = ',', default_values_t = config::FACET_YEARS.to_vec())]
        years: Vec<i32>,
    },
    /// Prepare, then render both maps
    All,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare {
            input,
            geojson,
            output,
        } => run_prepare(&input, &geojson, &output)?,
        Commands::DrugTypes { input, output } => {
            overdose_map_prepare::classify_drug_cases(&input, &output)?;
        }
        Commands::Unpivot { input, output } => {
            overdose_map_prepare::unpivot_drugs(&input, &output)?;
        }
        Commands::Choropleth {
            geojson,
            csv,
            out_png,
            out_geojson,
            ramp,
            label_all,
        } => run_choropleth(&geojson, &csv, &out_png, &out_geojson, &ramp, label_all)?,
        Commands::Faceted {
            geojson,
            csv,
            out_png,
            ramp,
            years,
        } => run_faceted(&geojson, &csv, &out_png, &ramp, years)?,
        Commands::All => {
            run_prepare(
                &PathBuf::from(config::RAW_CSV_PATH),
                &PathBuf::from(config::GEOJSON_PATH),
                &PathBuf::from(config::COUNTY_CSV_PATH),
            )?;
            run_choropleth(
                &PathBuf::from(config::GEOJSON_PATH),
                &PathBuf::from(config::COUNTY_CSV_PATH),
                &PathBuf::from(config::CHOROPLETH_PNG_PATH),
                &PathBuf::from(config::AUGMENTED_GEOJSON_PATH),
                config::SINGLE_MAP_RAMP,
                false,
            )?;
            run_faceted(
                &PathBuf::from(config::GEOJSON_PATH),
                &PathBuf::from(config::COUNTY_CSV_PATH),
                &PathBuf::from(config::FACETED_PNG_PATH),
                config::FACETED_RAMP,
                config::FACET_YEARS.to_vec(),
            )?;
        }
    }

    Ok(())
}

/// Filters the raw export down to ZIPs present in the boundary file.
fn run_prepare(
    input: &Path,
    geojson: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Filtering {} to county ZIPs...", input.display());
    let map = BoundaryMap::from_file(geojson)?;
    let county_zips: BTreeSet<_> = map.zips().into_iter().collect();
    overdose_map_prepare::filter_to_county(input, &county_zips, output)?;
    Ok(())
}

/// Renders the single map and writes the augmented boundary document.
fn run_choropleth(
    geojson: &Path,
    csv: &Path,
    out_png: &Path,
    out_geojson: &Path,
    ramp: &str,
    label_all: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Rendering county choropleth...");
    // Load everything up front so any fatal input error surfaces
    // before a single pixel is drawn.
    let map = BoundaryMap::from_file(geojson)?;
    let counts = CaseCounts::from_csv(csv, false)?;

    let options = ChoroplethOptions {
        ramp: ramp_by_name(ramp)?,
        top_k_labels: config::TOP_K_LABELS,
        label_all_regions: label_all,
        ..ChoroplethOptions::default()
    };
    overdose_map_render::render_choropleth(&map, &counts, &options, out_png)?;
    overdose_map_export::write_augmented(&map, &counts, out_geojson)?;
    Ok(())
}

/// Renders one panel per selected year with a shared color scale.
fn run_faceted(
    geojson: &Path,
    csv: &Path,
    out_png: &Path,
    ramp: &str,
    years: Vec<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Rendering faceted choropleth...");
    let map = BoundaryMap::from_file(geojson)?;
    let counts = CaseCounts::from_csv(csv, true)?;

    let options = FacetedOptions {
        ramp: ramp_by_name(ramp)?,
        years,
        top_k_listed: config::TOP_K_LISTED,
        ..FacetedOptions::default()
    };
    overdose_map_render::render_faceted(&map, &counts, &options, out_png)?;
    Ok(())
}

fn ramp_by_name(name: &str) -> Result<ColorRamp, Box<dyn std::error::Error>> {
    ColorRamp::by_name(name).ok_or_else(|| format!("Unknown color ramp: {name}").into())
}
