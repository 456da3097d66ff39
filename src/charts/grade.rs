//! Default rate by loan grade: bars on the left axis, loan volume as a
//! dashed line on a secondary right axis, with a legend for both.

use serde::{Deserialize, Serialize};

use super::axis;
use super::color::{OrdinalScale, GRADE_PALETTE};
use super::curve::monotone_x;
use super::scale::{BandScale, LinearScale};
use super::surface::{Anchor, Emphasis, Layer, Shape, Stroke, Surface, TextStyle, Tooltip};
use super::{ChartRenderer, Geometry, Margin};
use crate::format;

pub const TITLE: &str = "Default Rate by Loan Grade";

const VOLUME_COLOR: &str = "#6c757d";
const VOLUME_DASH: &str = "4,2";

/// Default rate (percent) and loan volume for one grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeStats {
    pub grade: String,
    pub default_rate: f64,
    pub total_loans: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GradeChart;

/// Secondary-axis tick label: `6000` → `6.0k`
fn thousands_label(value: f64) -> String {
    format!("{:.1}k", value / 1000.0)
}

impl ChartRenderer for GradeChart {
    type Datum = GradeStats;

    fn geometry(&self) -> Geometry {
        Geometry::new(550.0, 300.0, Margin::new(20.0, 90.0, 40.0, 60.0))
    }

    fn draw(&self, data: &[GradeStats], surface: &mut Surface) {
        let geometry = self.geometry();
        let grades: Vec<String> = data.iter().map(|d| d.grade.clone()).collect();
        let x = BandScale::new(grades.clone(), (geometry.left(), geometry.right()), 0.3);
        let y = LinearScale::for_values(
            data.iter().map(|d| d.default_rate),
            (geometry.bottom(), geometry.top()),
        );
        let y2 = LinearScale::for_values(
            data.iter().map(|d| d.total_loans as f64),
            (geometry.bottom(), geometry.top()),
        );
        let color = OrdinalScale::new(grades, &GRADE_PALETTE);
        let ticks = y.ticks(5);
        let volume_ticks = y2.ticks(5);

        axis::grid(surface, &geometry, &y, &ticks);

        for stats in data {
            let Some(left) = x.position(&stats.grade) else {
                continue;
            };
            let top = y.scale(stats.default_rate);
            let fill = color.color(&stats.grade).unwrap_or(GRADE_PALETTE[0]);
            surface.push_mark(
                Shape::rect(left, top, x.bandwidth(), geometry.bottom() - top, fill),
                Emphasis::Opacity(0.8),
                Tooltip::new(
                    left + x.bandwidth() / 2.0,
                    top - 5.0,
                    120.0,
                    vec![
                        format!("Grade {}: {:.1}%", stats.grade, stats.default_rate),
                        format!("{} loans", format::thousands(stats.total_loans)),
                    ],
                ),
            );
        }

        let volume: Vec<(f64, f64)> = data
            .iter()
            .filter_map(|d| Some((x.center(&d.grade)?, y2.scale(d.total_loans as f64))))
            .collect();
        if volume.len() > 1 {
            surface.push(
                Layer::Data,
                Shape::Path {
                    d: monotone_x(&volume),
                    stroke: Stroke::new(VOLUME_COLOR, 2.0).dashed(VOLUME_DASH),
                },
            );
        }
        for &(cx, cy) in &volume {
            surface.push(
                Layer::Data,
                Shape::Circle {
                    cx,
                    cy,
                    r: 4.0,
                    fill: VOLUME_COLOR.to_string(),
                },
            );
        }

        axis::bottom_band(surface, &geometry, &x);
        axis::left_linear(surface, &geometry, &y, &ticks, |v| {
            format!("{}%", format::number(v, 2))
        });
        axis::right_linear(surface, &geometry, &y2, &volume_ticks, thousands_label);
        axis::title(surface, &geometry, TITLE);
        axis::bottom_label(surface, &geometry, "Loan Grade");
        axis::left_label(surface, &geometry, "Default Rate (%)");
        axis::right_label(surface, &geometry, "Total Loans (thousands)");

        self.legend(surface, &geometry, color.first().unwrap_or(GRADE_PALETTE[0]));
    }
}

impl GradeChart {
    fn legend(&self, surface: &mut Surface, geometry: &Geometry, swatch: &str) {
        let x = geometry.width - geometry.margin.right + 10.0;
        let y = geometry.margin.top;
        let label = |text: &str, dy: f64| {
            Shape::text(
                x + 20.0,
                y + dy,
                text,
                TextStyle::new(axis::TICK_TEXT_COLOR, 10, Anchor::Start),
            )
        };

        surface.push(Layer::Legend, Shape::rect(x, y, 12.0, 12.0, swatch));
        surface.push(Layer::Legend, label("Default Rate", 10.0));
        surface.push(
            Layer::Legend,
            Shape::Line {
                x1: x,
                y1: y + 30.0,
                x2: x + 12.0,
                y2: y + 30.0,
                stroke: Stroke::new(VOLUME_COLOR, 2.0).dashed(VOLUME_DASH),
            },
        );
        surface.push(Layer::Legend, label("Total Loans", 34.0));
    }
}
