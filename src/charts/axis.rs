//! Shared chart furniture: gridlines, axes, axis titles and chart titles.

use super::scale::{BandScale, LinearScale};
use super::surface::{Anchor, Layer, Shape, Stroke, Surface, TextStyle};
use super::Geometry;

pub const GRID_COLOR: &str = "rgba(255, 255, 255, 0.1)";
pub const TICK_TEXT_COLOR: &str = "#adb5bd";
pub const AXIS_LINE_COLOR: &str = "#6c757d";
pub const TITLE_COLOR: &str = "white";

const TICK_SIZE: f64 = 6.0;

fn tick_style(anchor: Anchor) -> TextStyle {
    TextStyle::new(TICK_TEXT_COLOR, 10, anchor)
}

fn axis_stroke() -> Stroke {
    Stroke::new(AXIS_LINE_COLOR, 1.0)
}

/// Horizontal gridlines across the plot area at each tick
pub fn grid(surface: &mut Surface, geometry: &Geometry, y: &LinearScale, ticks: &[f64]) {
    for &tick in ticks {
        let py = y.scale(tick);
        surface.push(
            Layer::Grid,
            Shape::Line {
                x1: geometry.left(),
                y1: py,
                x2: geometry.right(),
                y2: py,
                stroke: Stroke::new(GRID_COLOR, 1.0),
            },
        );
    }
}

/// Category axis along the bottom of the plot area
pub fn bottom_band(surface: &mut Surface, geometry: &Geometry, x: &BandScale) {
    let base = geometry.bottom();
    surface.push(
        Layer::Axis,
        Shape::Line {
            x1: geometry.left(),
            y1: base,
            x2: geometry.right(),
            y2: base,
            stroke: axis_stroke(),
        },
    );

    for category in x.domain() {
        let Some(cx) = x.center(category) else {
            continue;
        };
        surface.push(
            Layer::Axis,
            Shape::Line {
                x1: cx,
                y1: base,
                x2: cx,
                y2: base + TICK_SIZE,
                stroke: axis_stroke(),
            },
        );
        surface.push(
            Layer::Axis,
            Shape::text(cx, base + 18.0, category.as_str(), tick_style(Anchor::Middle)),
        );
    }
}

/// Value axis on the left edge
pub fn left_linear<F>(
    surface: &mut Surface,
    geometry: &Geometry,
    y: &LinearScale,
    ticks: &[f64],
    format: F,
) where
    F: Fn(f64) -> String,
{
    vertical_axis(surface, geometry, geometry.left(), -1.0, y, ticks, format);
}

/// Secondary value axis on the right edge
pub fn right_linear<F>(
    surface: &mut Surface,
    geometry: &Geometry,
    y: &LinearScale,
    ticks: &[f64],
    format: F,
) where
    F: Fn(f64) -> String,
{
    vertical_axis(surface, geometry, geometry.right(), 1.0, y, ticks, format);
}

fn vertical_axis<F>(
    surface: &mut Surface,
    geometry: &Geometry,
    x: f64,
    direction: f64,
    y: &LinearScale,
    ticks: &[f64],
    format: F,
) where
    F: Fn(f64) -> String,
{
    surface.push(
        Layer::Axis,
        Shape::Line {
            x1: x,
            y1: geometry.top(),
            x2: x,
            y2: geometry.bottom(),
            stroke: axis_stroke(),
        },
    );

    let anchor = if direction < 0.0 {
        Anchor::End
    } else {
        Anchor::Start
    };
    for &tick in ticks {
        let py = y.scale(tick);
        surface.push(
            Layer::Axis,
            Shape::Line {
                x1: x,
                y1: py,
                x2: x + direction * TICK_SIZE,
                y2: py,
                stroke: axis_stroke(),
            },
        );
        surface.push(
            Layer::Axis,
            Shape::text(
                x + direction * (TICK_SIZE + 3.0),
                py,
                format(tick),
                tick_style(anchor).centered(),
            ),
        );
    }
}

/// Chart title centred at the top of the surface
pub fn title(surface: &mut Surface, geometry: &Geometry, text: &str) {
    surface.push(
        Layer::Title,
        Shape::text(
            geometry.width / 2.0,
            15.0,
            text,
            TextStyle::new(TITLE_COLOR, 12, Anchor::Middle),
        ),
    );
}

/// Axis title under the category axis
pub fn bottom_label(surface: &mut Surface, geometry: &Geometry, text: &str) {
    surface.push(
        Layer::Axis,
        Shape::text(
            geometry.left() + geometry.inner_width() / 2.0,
            geometry.height - 5.0,
            text,
            TextStyle::new(TICK_TEXT_COLOR, 11, Anchor::Middle),
        ),
    );
}

/// Rotated axis title beside the left value axis
pub fn left_label(surface: &mut Surface, geometry: &Geometry, text: &str) {
    side_label(surface, geometry, 15.0, text);
}

/// Rotated axis title beside the right value axis
pub fn right_label(surface: &mut Surface, geometry: &Geometry, text: &str) {
    side_label(surface, geometry, geometry.width - 15.0, text);
}

fn side_label(surface: &mut Surface, geometry: &Geometry, x: f64, text: &str) {
    surface.push(
        Layer::Axis,
        Shape::text(
            x,
            geometry.top() + geometry.inner_height() / 2.0,
            text,
            TextStyle::new(TICK_TEXT_COLOR, 11, Anchor::Middle).rotated(-90.0),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::Margin;

    #[test]
    fn test_grid_line_per_tick() {
        let geometry = Geometry::new(550.0, 300.0, Margin::new(20.0, 30.0, 40.0, 60.0));
        let y = LinearScale::new((0.0, 100.0), (geometry.bottom(), geometry.top()));
        let ticks = y.ticks(5);

        let mut surface = Surface::new(550.0, 300.0);
        grid(&mut surface, &geometry, &y, &ticks);

        let lines = surface.shapes_in(Layer::Grid);
        assert_eq!(lines.len(), ticks.len());
        match lines[0] {
            Shape::Line { x1, x2, y1, .. } => {
                assert_eq!(*x1, 60.0);
                assert_eq!(*x2, 520.0);
                assert_eq!(*y1, 260.0);
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_left_axis_formats_ticks() {
        let geometry = Geometry::new(550.0, 300.0, Margin::new(20.0, 30.0, 40.0, 60.0));
        let y = LinearScale::new((0.0, 30.0), (geometry.bottom(), geometry.top()));
        let ticks = y.ticks(5);

        let mut surface = Surface::new(550.0, 300.0);
        left_linear(&mut surface, &geometry, &y, &ticks, |v| format!("{}%", v));
        assert!(surface.texts().contains(&"30%"));
    }
}
