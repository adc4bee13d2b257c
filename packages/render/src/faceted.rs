//! Faceted (one panel per year) choropleth rendering.

use std::path::Path;

use overdose_map_aggregate::CaseCounts;
use overdose_map_geometry::{BoundaryMap, BoundingBox};
use plotters::prelude::*;

use crate::colorbar;
use crate::layout::fit_equal_aspect;
use crate::ramp::ColorRamp;
use crate::scale::CountScale;
use crate::{RenderError, ring_counts_for_year};

/// Height in pixels of the super-title band.
const TITLE_HEIGHT: i32 = 70;

/// Height in pixels of the shared colorbar strip.
const COLORBAR_HEIGHT: i32 = 80;

/// Height in pixels of the per-panel top-K text block.
const FOOTER_HEIGHT: i32 = 110;

/// Options for the faceted rendering pass.
#[derive(Debug, Clone)]
pub struct FacetedOptions {
    /// Shared super-title.
    pub title: String,
    /// Colorbar caption.
    pub colorbar_label: String,
    /// Color ramp for the fill colors.
    pub ramp: ColorRamp,
    /// Years to facet on, one panel each, in the given order.
    pub years: Vec<i32>,
    /// Width of one panel in pixels (3.2 in at 300 DPI by default).
    pub panel_width_px: u32,
    /// Total figure height in pixels (4 in at 300 DPI by default).
    pub height_px: u32,
    /// Minimum total figure width in pixels (8 in at 300 DPI).
    pub min_width_px: u32,
    /// Number of highest-count ZIPs listed under each panel.
    pub top_k_listed: usize,
}

impl Default for FacetedOptions {
    fn default() -> Self {
        Self {
            title: "Fatal Overdose Cases by ZIP (Selected Years)".to_string(),
            colorbar_label: "Case count".to_string(),
            ramp: ColorRamp::REDS,
            years: vec![2007, 2016, 2017, 2023],
            panel_width_px: 960,
            height_px: 1200,
            min_width_px: 2400,
            top_k_listed: 3,
        }
    }
}

/// Renders one panel per selected year, all panels colored through one
/// shared [`CountScale`] built from the union of displayed counts
/// across the years, so color is comparable between panels.
///
/// # Errors
///
/// Returns [`RenderError::EmptyYears`] if no years were selected,
/// [`RenderError::EmptyBounds`] if the ring set has no coordinates, or
/// a drawing-backend error if writing the image fails.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_faceted(
    map: &BoundaryMap,
    counts: &CaseCounts,
    options: &FacetedOptions,
    out_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if options.years.is_empty() {
        return Err(RenderError::EmptyYears.into());
    }
    let bbox = BoundingBox::of_rings(map.rings()).ok_or(RenderError::EmptyBounds)?;

    // One value vector per panel; the shared scale spans all of them.
    let panel_values: Vec<Vec<u64>> = options
        .years
        .iter()
        .map(|&year| ring_counts_for_year(map, counts, year))
        .collect();
    let all_values: Vec<u64> = panel_values.iter().flatten().copied().collect();
    let scale = CountScale::from_counts(&all_values);

    let n_panels = options.years.len() as u32;
    let width_px = (options.panel_width_px * n_panels).max(options.min_width_px);

    let root = BitMapBackend::new(out_path, (width_px, options.height_px)).into_drawing_area();
    root.fill(&WHITE)?;

    let (title_area, below_title) = root.split_vertically(TITLE_HEIGHT);
    title_area.titled(&options.title, ("sans-serif", 36))?;

    let (cbar_strip, panel_row) = below_title.split_vertically(COLORBAR_HEIGHT);
    // Colorbar occupies the left third of its strip, like the shared
    // horizontal legend of the source figure.
    let (cbar_area, _) = cbar_strip.split_horizontally((width_px / 3) as i32);
    colorbar::draw_horizontal(&cbar_area, &options.ramp, &scale, &options.colorbar_label)?;

    let panels = panel_row.split_evenly((1, options.years.len()));

    for ((&year, values), panel) in options.years.iter().zip(&panel_values).zip(&panels) {
        let full_height = panel.dim_in_pixel().1 as i32;
        let (map_area, footer) = panel.split_vertically((full_height - FOOTER_HEIGHT).max(1));
        let map_area = map_area.margin(6, 6, 6, 6);

        let (map_w, map_h) = map_area.dim_in_pixel();
        let caption_height = 28;
        let (x_range, y_range) =
            fit_equal_aspect(&bbox, map_w, map_h.saturating_sub(caption_height));

        let mut chart = ChartBuilder::on(&map_area)
            .caption(year.to_string(), ("sans-serif", 26))
            .build_cartesian_2d(x_range, y_range)?;

        for (ring, &value) in map.rings().iter().zip(values) {
            let color = scale.color_for(value, &options.ramp);
            chart.draw_series(std::iter::once(Polygon::new(
                ring.points.clone(),
                color.filled(),
            )))?;
            chart.draw_series(std::iter::once(PathElement::new(
                ring.points.clone(),
                BLACK.stroke_width(1),
            )))?;
        }

        if options.top_k_listed > 0 {
            let style = ("sans-serif", 18).into_font().color(&BLACK);
            for (i, (zip, count)) in counts
                .top_in_year(year, options.top_k_listed)
                .iter()
                .enumerate()
            {
                footer.draw(&Text::new(
                    format!("{zip}: {count}"),
                    (12, 8 + (i as i32) * 24),
                    style.clone(),
                ))?;
            }
        }
    }

    root.present()?;
    log::info!(
        "Saved faceted choropleth ({} panels, scale {:.0}..{:.0}) to {}",
        options.years.len(),
        scale.min(),
        scale.max(),
        out_path.display()
    );
    Ok(())
}
