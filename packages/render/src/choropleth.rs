//! Single-map choropleth rendering.

use std::path::Path;

use overdose_map_aggregate::CaseCounts;
use overdose_map_geometry::{BoundaryMap, BoundingBox};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::colorbar;
use crate::layout::fit_equal_aspect;
use crate::ramp::ColorRamp;
use crate::scale::CountScale;
use crate::{RenderError, ring_counts};

/// Width in pixels reserved for the vertical colorbar.
const COLORBAR_WIDTH: i32 = 150;

/// Options for the single-map rendering pass.
#[derive(Debug, Clone)]
pub struct ChoroplethOptions {
    /// Figure title.
    pub title: String,
    /// Colorbar caption.
    pub colorbar_label: String,
    /// Color ramp for the fill colors.
    pub ramp: ColorRamp,
    /// Output image width in pixels (8 in at 300 DPI by default).
    pub width_px: u32,
    /// Output image height in pixels.
    pub height_px: u32,
    /// Number of highest-count regions to annotate with "ZIP (count)".
    /// 0 disables the overlay.
    pub top_k_labels: usize,
    /// Annotate every region with its ZIP at the ring centroid.
    pub label_all_regions: bool,
}

impl Default for ChoroplethOptions {
    fn default() -> Self {
        Self {
            title: "Fatal Overdose Cases by ZIP (Allegheny County)".to_string(),
            colorbar_label: "Case count".to_string(),
            ramp: ColorRamp::VIRIDIS,
            width_px: 2400,
            height_px: 2400,
            top_k_labels: 5,
            label_all_regions: false,
        }
    }
}

/// Renders the single-map choropleth to a PNG file.
///
/// Every extracted ring is drawn as a filled, black-edged polygon whose
/// color comes from one [`CountScale`] over all displayed counts. The
/// view fits the union bounding box of the rings with equal x/y
/// scaling and no axis ticks.
///
/// # Errors
///
/// Returns [`RenderError::EmptyBounds`] if the ring set has no
/// coordinates, or a drawing-backend error if writing the image fails.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn render_choropleth(
    map: &BoundaryMap,
    counts: &CaseCounts,
    options: &ChoroplethOptions,
    out_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let values = ring_counts(map, counts);
    let scale = CountScale::from_counts(&values);
    let bbox = BoundingBox::of_rings(map.rings()).ok_or(RenderError::EmptyBounds)?;

    let root = BitMapBackend::new(out_path, (options.width_px, options.height_px))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let titled = root.titled(&options.title, ("sans-serif", 44))?;
    let split_at = (options.width_px as i32 - COLORBAR_WIDTH).max(1);
    let (map_area, cbar_area) = titled.split_horizontally(split_at);
    let map_area = map_area.margin(10, 10, 10, 10);

    let (panel_w, panel_h) = map_area.dim_in_pixel();
    let (x_range, y_range) = fit_equal_aspect(&bbox, panel_w, panel_h);

    let mut chart = ChartBuilder::on(&map_area).build_cartesian_2d(x_range, y_range)?;

    for (ring, &value) in map.rings().iter().zip(&values) {
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

    if options.label_all_regions {
        let style = ("sans-serif", 12)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        for ring in map.rings() {
            chart.draw_series(std::iter::once(Text::new(
                ring.zip.as_str().to_string(),
                ring.centroid(),
                style.clone(),
            )))?;
        }
    }

    if options.top_k_labels > 0 {
        let style = ("sans-serif", 20)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        for (zip, count) in counts.top_by_count(options.top_k_labels) {
            // A ZIP from the incident data with no boundary geometry is
            // silently not annotated, matching how it is not rendered.
            let Some(ring) = map.dominant_ring(&zip) else {
                continue;
            };
            let (cx, cy) = ring.centroid();
            let (px, py) = chart.backend_coord(&(cx, cy));
            let half_w = 46;
            root.draw(&Rectangle::new(
                [(px - half_w, py - 14), (px + half_w, py + 14)],
                WHITE.mix(0.5).filled(),
            ))?;
            chart.draw_series(std::iter::once(Text::new(
                format!("{zip} ({count})"),
                (cx, cy),
                style.clone(),
            )))?;
        }
    }

    colorbar::draw_vertical(&cbar_area, &options.ramp, &scale, &options.colorbar_label)?;

    root.present()?;
    log::info!(
        "Saved choropleth ({} rings, scale {:.0}..{:.0}) to {}",
        map.rings().len(),
        scale.min(),
        scale.max(),
        out_path.display()
    );
    Ok(())
}
