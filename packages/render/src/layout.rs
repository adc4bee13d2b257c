//! View-bound fitting shared by both rendering passes.

use overdose_map_geometry::BoundingBox;

/// Expands a data bounding box so one data unit spans the same number
/// of pixels on both axes (equal aspect, no distortion).
///
/// The axis that would render too tightly is widened symmetrically
/// about its center; the other axis keeps the data bounds exactly.
#[must_use]
pub fn fit_equal_aspect(
    bbox: &BoundingBox,
    panel_width_px: u32,
    panel_height_px: u32,
) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let pw = f64::from(panel_width_px.max(1));
    let ph = f64::from(panel_height_px.max(1));

    // Degenerate boxes (single point, vertical/horizontal line) still
    // need a nonzero span to build a cartesian range.
    let data_w = bbox.width().max(f64::EPSILON);
    let data_h = bbox.height().max(f64::EPSILON);

    let units_per_px = (data_w / pw).max(data_h / ph);
    let span_x = units_per_px * pw;
    let span_y = units_per_px * ph;

    let cx = f64::midpoint(bbox.min_x, bbox.max_x);
    let cy = f64::midpoint(bbox.min_y, bbox.max_y);

    (
        (cx - span_x / 2.0)..(cx + span_x / 2.0),
        (cy - span_y / 2.0)..(cy + span_y / 2.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[test]
    fn wide_data_in_square_panel_expands_y() {
        let (xr, yr) = fit_equal_aspect(&bbox(0.0, 0.0, 10.0, 2.0), 100, 100);
        assert!((xr.start - 0.0).abs() < 1e-9);
        assert!((xr.end - 10.0).abs() < 1e-9);
        // y span grows to 10 units, centered on 1.0.
        assert!((yr.start - -4.0).abs() < 1e-9);
        assert!((yr.end - 6.0).abs() < 1e-9);
    }

    #[test]
    fn scale_is_equal_on_both_axes() {
        let (xr, yr) = fit_equal_aspect(&bbox(0.0, 0.0, 4.0, 9.0), 200, 300);
        let x_per_px = (xr.end - xr.start) / 200.0;
        let y_per_px = (yr.end - yr.start) / 300.0;
        assert!((x_per_px - y_per_px).abs() < 1e-12);
    }

    #[test]
    fn contains_the_data_bounds() {
        let b = bbox(-3.0, 2.0, 5.0, 4.0);
        let (xr, yr) = fit_equal_aspect(&b, 120, 80);
        assert!(xr.start <= b.min_x && xr.end >= b.max_x);
        assert!(yr.start <= b.min_y && yr.end >= b.max_y);
    }

    #[test]
    fn degenerate_bbox_still_yields_nonempty_ranges() {
        let (xr, yr) = fit_equal_aspect(&bbox(1.0, 1.0, 1.0, 1.0), 100, 100);
        assert!(xr.end > xr.start);
        assert!(yr.end > yr.start);
    }
}
