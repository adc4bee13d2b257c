//! Colorbar drawing in pixel space.
//!
//! Both orientations sample the ramp once per pixel along the bar's
//! long axis and annotate the normalization range with its integer
//! min/max bounds, so the legend always describes the exact scale the
//! polygons were colored with.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::ramp::ColorRamp;
use crate::scale::CountScale;

/// Draws a vertical colorbar (max at top) filling the given area.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn draw_vertical(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    ramp: &ColorRamp,
    scale: &CountScale,
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);

    let bar_left = 16;
    let bar_right = (bar_left + 28).min(w - 4);
    let bar_top = 48;
    let bar_bottom = (h - 48).max(bar_top + 1);

    for y in bar_top..bar_bottom {
        let t = 1.0 - f64::from(y - bar_top) / f64::from(bar_bottom - bar_top);
        area.draw(&Rectangle::new(
            [(bar_left, y), (bar_right, y + 1)],
            ramp.sample(t).filled(),
        ))?;
    }
    area.draw(&Rectangle::new(
        [(bar_left, bar_top), (bar_right, bar_bottom)],
        BLACK.stroke_width(1),
    ))?;

    let text = ("sans-serif", 18).into_font().color(&BLACK);
    area.draw(&Text::new(label.to_string(), (8, 18), text.clone()))?;
    area.draw(&Text::new(
        format!("{:.0}", scale.max()),
        (bar_right + 6, bar_top),
        text.clone(),
    ))?;
    area.draw(&Text::new(
        format!("{:.0}", scale.min()),
        (bar_right + 6, bar_bottom - 14),
        text,
    ))?;

    Ok(())
}

/// Draws a horizontal colorbar (min at left) filling the given area.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn draw_horizontal(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    ramp: &ColorRamp,
    scale: &CountScale,
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);

    let bar_left = 8;
    let bar_right = (w - 48).max(bar_left + 1);
    let bar_top = 24;
    let bar_bottom = (bar_top + 14).min(h - 2);

    for x in bar_left..bar_right {
        let t = f64::from(x - bar_left) / f64::from(bar_right - bar_left);
        area.draw(&Rectangle::new(
            [(x, bar_top), (x + 1, bar_bottom)],
            ramp.sample(t).filled(),
        ))?;
    }
    area.draw(&Rectangle::new(
        [(bar_left, bar_top), (bar_right, bar_bottom)],
        BLACK.stroke_width(1),
    ))?;

    let text = ("sans-serif", 16).into_font().color(&BLACK);
    area.draw(&Text::new(label.to_string(), (bar_left, 4), text.clone()))?;
    area.draw(&Text::new(
        format!("{:.0}", scale.min()),
        (bar_left, bar_bottom + 2),
        text.clone(),
    ))?;
    area.draw(&Text::new(
        format!("{:.0}", scale.max()),
        (bar_right + 4, bar_top + 2),
        text,
    ))?;

    Ok(())
}
