//! Monthly default rate line chart

use serde::{Deserialize, Serialize};

use super::axis;
use super::curve::monotone_x;
use super::scale::{BandScale, LinearScale};
use super::surface::{Emphasis, Layer, Shape, Stroke, Surface, Tooltip};
use super::{ChartRenderer, Geometry, Margin};
use crate::format;

pub const TITLE: &str = "Default Rate by Month";

const LINE_COLOR: &str = "#dc3545";
const POINT_HOVER_FILL: &str = "#bb2d3b";
const POINT_RADIUS: f64 = 4.0;
const POINT_HOVER_RADIUS: f64 = 6.0;

/// Default rate (percent) for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDefaultRate {
    pub month: String,
    pub default_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRateChart;

impl ChartRenderer for DefaultRateChart {
    type Datum = MonthlyDefaultRate;

    fn geometry(&self) -> Geometry {
        Geometry::new(550.0, 300.0, Margin::new(20.0, 30.0, 40.0, 60.0))
    }

    fn draw(&self, data: &[MonthlyDefaultRate], surface: &mut Surface) {
        let geometry = self.geometry();
        let x = BandScale::new(
            data.iter().map(|d| d.month.clone()).collect(),
            (geometry.left(), geometry.right()),
            0.4,
        );
        let y = LinearScale::for_values(
            data.iter().map(|d| d.default_rate),
            (geometry.bottom(), geometry.top()),
        );
        let ticks = y.ticks(5);

        axis::grid(surface, &geometry, &y, &ticks);

        let points: Vec<(f64, f64)> = data
            .iter()
            .filter_map(|d| Some((x.center(&d.month)?, y.scale(d.default_rate))))
            .collect();

        if points.len() > 1 {
            surface.push(
                Layer::Data,
                Shape::Path {
                    d: monotone_x(&points),
                    stroke: Stroke::new(LINE_COLOR, 2.0),
                },
            );
        }

        for (datum, &(cx, cy)) in data.iter().zip(points.iter()) {
            surface.push_mark(
                Shape::Circle {
                    cx,
                    cy,
                    r: POINT_RADIUS,
                    fill: LINE_COLOR.to_string(),
                },
                Emphasis::Grow {
                    radius: POINT_HOVER_RADIUS,
                    fill: POINT_HOVER_FILL.to_string(),
                },
                Tooltip::new(cx, cy - 10.0, 70.0, vec![format!("{:.1}%", datum.default_rate)]),
            );
        }

        axis::bottom_band(surface, &geometry, &x);
        axis::left_linear(surface, &geometry, &y, &ticks, |v| {
            format!("{}%", format::number(v, 2))
        });
        axis::title(surface, &geometry, TITLE);
        axis::bottom_label(surface, &geometry, "Month");
        axis::left_label(surface, &geometry, "Default Rate (%)");
    }
}
