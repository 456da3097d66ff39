//! Feature correlation heatmap

use serde::{Deserialize, Serialize};

use super::axis;
use super::color::DivergingScale;
use super::scale::BandScale;
use super::surface::{Anchor, Emphasis, Layer, Shape, Stroke, Surface, TextStyle, Tooltip};
use super::{ChartRenderer, Geometry, Margin};

pub const TITLE: &str = "Feature Correlation Matrix";

const CELL_STROKE: &str = "#1a1a1a";
const LEGEND_WIDTH: f64 = 200.0;
const LEGEND_HEIGHT: f64 = 20.0;

/// Correlation of the row feature with `feature`, in [-1, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationCell {
    pub feature: String,
    pub correlation: f64,
}

/// One row of the correlation matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRow {
    pub feature: String,
    pub values: Vec<CorrelationCell>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationHeatmap;

/// Label colour that stays readable on a cell of the given correlation
fn label_color(correlation: f64) -> &'static str {
    if correlation.abs() > 0.5 {
        "white"
    } else {
        "black"
    }
}

impl ChartRenderer for CorrelationHeatmap {
    type Datum = CorrelationRow;

    fn geometry(&self) -> Geometry {
        Geometry::new(550.0, 400.0, Margin::new(50.0, 50.0, 50.0, 90.0))
    }

    fn draw(&self, data: &[CorrelationRow], surface: &mut Surface) {
        let geometry = self.geometry();
        let features: Vec<String> = data.iter().map(|row| row.feature.clone()).collect();
        let x = BandScale::new(features.clone(), (geometry.left(), geometry.right()), 0.05);
        let y = BandScale::new(features, (geometry.top(), geometry.bottom()), 0.05);
        let color = DivergingScale::default();

        for row in data {
            let Some(top) = y.position(&row.feature) else {
                continue;
            };
            for cell in &row.values {
                // Cells naming a feature without a column are skipped
                let Some(left) = x.position(&cell.feature) else {
                    continue;
                };
                let correlation = cell.correlation.clamp(-1.0, 1.0);
                let cx = left + x.bandwidth() / 2.0;

                surface.push_mark(
                    Shape::Rect {
                        x: left,
                        y: top,
                        width: x.bandwidth(),
                        height: y.bandwidth(),
                        fill: color.color(correlation).to_string(),
                        stroke: Some(Stroke::new(CELL_STROKE, 1.0)),
                        opacity: None,
                        rx: None,
                    },
                    Emphasis::Stroke(Stroke::new("white", 2.0)),
                    Tooltip::new(
                        cx,
                        top - 10.0,
                        160.0,
                        vec![format!(
                            "{} vs {}: {:.2}",
                            row.feature, cell.feature, cell.correlation
                        )],
                    ),
                );
                surface.push(
                    Layer::Data,
                    Shape::text(
                        cx,
                        top + y.bandwidth() / 2.0,
                        format!("{:.2}", cell.correlation),
                        TextStyle::new(label_color(correlation), 10, Anchor::Middle).centered(),
                    ),
                );
            }
        }

        let tick = |anchor| TextStyle::new(axis::TICK_TEXT_COLOR, 10, anchor);
        for feature in x.domain() {
            if let Some(cx) = x.center(feature) {
                surface.push(
                    Layer::Axis,
                    Shape::text(cx, geometry.top() - 10.0, feature.as_str(), tick(Anchor::Middle)),
                );
            }
        }
        for feature in y.domain() {
            if let Some(cy) = y.center(feature) {
                surface.push(
                    Layer::Axis,
                    Shape::text(
                        geometry.left() - 5.0,
                        cy,
                        feature.as_str(),
                        tick(Anchor::End).centered(),
                    ),
                );
            }
        }

        axis::title(surface, &geometry, TITLE);
        self.legend(surface, &geometry, &color);
    }
}

impl CorrelationHeatmap {
    /// Gradient colour key labelled -1, 0, 1
    fn legend(&self, surface: &mut Surface, geometry: &Geometry, color: &DivergingScale) {
        let x = geometry.left() + (geometry.inner_width() - LEGEND_WIDTH) / 2.0;
        let y = geometry.height - LEGEND_HEIGHT;
        let (min, max) = color.domain();
        let mid = (min + max) / 2.0;

        surface.push(
            Layer::Legend,
            Shape::Gradient {
                x,
                y,
                width: LEGEND_WIDTH,
                height: LEGEND_HEIGHT,
                stops: vec![
                    (0.0, color.color(min).to_string()),
                    (0.5, color.color(mid).to_string()),
                    (1.0, color.color(max).to_string()),
                ],
            },
        );
        for (dx, label) in [(0.0, "-1"), (LEGEND_WIDTH / 2.0, "0"), (LEGEND_WIDTH, "1")] {
            surface.push(
                Layer::Legend,
                Shape::text(
                    x + dx,
                    y - 5.0,
                    label,
                    TextStyle::new(axis::TICK_TEXT_COLOR, 9, Anchor::Middle),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::sample;

    #[test]
    fn test_cell_per_pair() {
        let surface = CorrelationHeatmap.render_surface(&sample::correlations());
        assert_eq!(surface.mark_count(), 25);
        assert!(surface.texts().contains(&"0.57"));
        assert!(surface.texts().contains(&"-0.29"));
    }

    #[test]
    fn test_cell_hover() {
        let mut surface = CorrelationHeatmap.render_surface(&sample::correlations());
        // Row 0 (person_age), column 1 (person_income)
        let cell = surface.marks()[1];
        assert_eq!(
            surface.pointer_enter(cell).unwrap().text(),
            "person_age vs person_income: 0.35"
        );
        match surface.mark_shape(cell).unwrap() {
            Shape::Rect { stroke, .. } => {
                assert_eq!(stroke, Some(Stroke::new("white", 2.0)));
            }
            other => panic!("unexpected shape {:?}", other),
        }
        surface.pointer_leave(cell);
        match surface.mark_shape(cell).unwrap() {
            Shape::Rect { stroke, .. } => {
                assert_eq!(stroke, Some(Stroke::new(CELL_STROKE, 1.0)));
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_diagonal_is_strong_blue() {
        let surface = CorrelationHeatmap.render_surface(&sample::correlations());
        match surface.mark_shape(surface.marks()[0]).unwrap() {
            Shape::Rect { fill, .. } => assert_eq!(fill, "#053061"),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_label_contrast() {
        assert_eq!(label_color(1.0), "white");
        assert_eq!(label_color(-0.57), "white");
        assert_eq!(label_color(0.5), "black");
        assert_eq!(label_color(0.12), "black");
    }

    #[test]
    fn test_gradient_legend() {
        let surface = CorrelationHeatmap.render_surface(&sample::correlations());
        let svg = surface.to_svg();
        assert!(svg.contains("<linearGradient"));
        assert!(svg.contains("#f7f7f7"));
        for label in ["-1", "0", "1"] {
            assert!(surface.texts().contains(&label));
        }
    }

    #[test]
    fn test_empty_matrix() {
        let surface = CorrelationHeatmap.render_surface(&[]);
        assert_eq!(surface.mark_count(), 0);
        assert!(surface.texts().contains(&TITLE));
    }
}
