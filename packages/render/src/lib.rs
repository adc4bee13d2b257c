#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Choropleth rendering for the overdose map.
//!
//! Two rendering passes share all of their machinery: a single county
//! map ([`render_choropleth`]) and a one-row faceted map with one panel
//! per selected year ([`render_faceted`]). Both draw every extracted
//! exterior ring as a filled, black-edged polygon, fit panel view bounds
//! to the union bounding box of the rings with equal x/y scaling, and
//! describe the shared normalization range with a colorbar.
//!
//! All fatal conditions (missing inputs, missing columns, zero rings,
//! empty year selection) surface before a backend is created, so a
//! failed run never leaves a partial image behind.

pub mod ramp;
pub mod scale;

mod choropleth;
mod colorbar;
mod faceted;
mod layout;

pub use choropleth::{ChoroplethOptions, render_choropleth};
pub use faceted::{FacetedOptions, render_faceted};
pub use ramp::ColorRamp;
pub use scale::CountScale;

use overdose_map_aggregate::CaseCounts;
use overdose_map_geometry::BoundaryMap;

/// Errors raised by the rendering layer itself (input-loading errors
/// surface from the geometry and aggregate crates before rendering).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Faceted rendering was requested with no years selected.
    #[error("No years selected for faceted rendering")]
    EmptyYears,

    /// The ring set had no coordinates to fit view bounds around.
    #[error("Boundary rings contain no coordinates")]
    EmptyBounds,
}

/// Total displayed count per ring, in ring order. A ZIP with no
/// incidents yields 0, never a gap.
#[must_use]
pub fn ring_counts(map: &BoundaryMap, counts: &CaseCounts) -> Vec<u64> {
    map.rings().iter().map(|r| counts.count(&r.zip)).collect()
}

/// Displayed count per ring for one year, in ring order, defaulting
/// to 0.
#[must_use]
pub fn ring_counts_for_year(map: &BoundaryMap, counts: &CaseCounts, year: i32) -> Vec<u64> {
    map.rings()
        .iter()
        .map(|r| counts.count_in_year(&r.zip, year))
        .collect()
}
