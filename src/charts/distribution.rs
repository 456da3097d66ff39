//! Loan amount distribution bar chart

use serde::{Deserialize, Serialize};

use super::axis;
use super::scale::{BandScale, LinearScale};
use super::surface::{Emphasis, Shape, Surface, Tooltip};
use super::{ChartRenderer, Geometry, Margin};
use crate::format;

pub const TITLE: &str = "Distribution of Loan Amounts";

const BAR_FILL: &str = "#0d6efd";
const BAR_HOVER_FILL: &str = "#0a58ca";

/// Number of loans in one amount range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBucket {
    pub range: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionChart;

impl ChartRenderer for DistributionChart {
    type Datum = AmountBucket;

    fn geometry(&self) -> Geometry {
        Geometry::new(550.0, 300.0, Margin::new(20.0, 30.0, 40.0, 60.0))
    }

    fn draw(&self, data: &[AmountBucket], surface: &mut Surface) {
        let geometry = self.geometry();
        let x = BandScale::new(
            data.iter().map(|d| d.range.clone()).collect(),
            (geometry.left(), geometry.right()),
            0.2,
        );
        let y = LinearScale::for_values(
            data.iter().map(|d| d.count as f64),
            (geometry.bottom(), geometry.top()),
        );
        let ticks = y.ticks(5);

        axis::grid(surface, &geometry, &y, &ticks);

        for bucket in data {
            let Some(left) = x.position(&bucket.range) else {
                continue;
            };
            let top = y.scale(bucket.count as f64);
            surface.push_mark(
                Shape::rect(
                    left,
                    top,
                    x.bandwidth(),
                    geometry.bottom() - top,
                    BAR_FILL,
                ),
                Emphasis::Fill(BAR_HOVER_FILL.to_string()),
                Tooltip::single(
                    left + x.bandwidth() / 2.0,
                    top - 5.0,
                    format!("{} loans", format::thousands(bucket.count)),
                ),
            );
        }

        axis::bottom_band(surface, &geometry, &x);
        axis::left_linear(surface, &geometry, &y, &ticks, |v| format::number(v, 2));
        axis::title(surface, &geometry, TITLE);
        axis::bottom_label(surface, &geometry, "Loan Amount Range");
        axis::left_label(surface, &geometry, "Number of Loans");
    }
}
