//! Default configuration for every batch job.
//!
//! All paths and figure parameters have fixed defaults here; each CLI
//! flag simply overrides one of them.

/// County ZIP boundary document.
pub const GEOJSON_PATH: &str = "data/allegheny-county-zip-code-boundaries.geojson";

/// Raw incident export covering all ZIPs, county or not.
pub const RAW_CSV_PATH: &str = "data/fatal_overdoses_2007_2025_cleaned.csv";

/// County-filtered incident data, output of `prepare`, input to the
/// rendering and derivation jobs.
pub const COUNTY_CSV_PATH: &str = "data/fatal_overdoses_allegheny_only.csv";

/// County data with `drug_count`/`drug_case_type` columns appended.
pub const DRUG_TYPE_CSV_PATH: &str = "data/fatal_overdoses_allegheny_only_drugtype.csv";

/// County data melted to one row per named drug.
pub const LONG_CSV_PATH: &str = "data/fatal_overdoses_allegheny_only_long.csv";

/// Single-map choropleth image.
pub const CHOROPLETH_PNG_PATH: &str = "data/allegheny_overdose_choropleth.png";

/// Boundary document with per-feature case counts injected.
pub const AUGMENTED_GEOJSON_PATH: &str = "data/allegheny_zip_with_case_counts.geojson";

/// Faceted per-year choropleth image.
pub const FACETED_PNG_PATH: &str = "data/faceted_choropleth_zip_years_row.png";

/// Years faceted by default, one panel each.
pub const FACET_YEARS: &[i32] = &[2007, 2016, 2017, 2023];

/// Default ramp for the single map.
pub const SINGLE_MAP_RAMP: &str = "viridis";

/// Default ramp for the faceted map.
pub const FACETED_RAMP: &str = "reds";

/// Number of highest-count ZIPs annotated on the single map.
pub const TOP_K_LABELS: usize = 5;

/// Number of highest-count ZIPs listed under each faceted panel.
pub const TOP_K_LISTED: usize = 3;
