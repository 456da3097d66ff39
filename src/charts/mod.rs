//! Charts
//!
//! Four chart renderers sharing one contract: each takes a small dataset,
//! clears a [`Surface`] and redraws it from scratch with gridlines, data
//! marks, axes, titles and (where more than one encoding is present) a
//! legend.
//!
//! | Chart | Datum | Marks |
//! |-------|-------|-------|
//! | [`DistributionChart`] | [`AmountBucket`] | bars |
//! | [`DefaultRateChart`] | [`MonthlyDefaultRate`] | line + points |
//! | [`GradeChart`] | [`GradeStats`] | bars + dashed line on a second axis |
//! | [`CorrelationHeatmap`] | [`CorrelationRow`] | coloured cells |

pub mod axis;
pub mod color;
pub mod curve;
pub mod default_rate;
pub mod distribution;
pub mod grade;
pub mod heatmap;
pub mod sample;
pub mod scale;
pub mod surface;

pub use default_rate::{DefaultRateChart, MonthlyDefaultRate};
pub use distribution::{AmountBucket, DistributionChart};
pub use grade::{GradeChart, GradeStats};
pub use heatmap::{CorrelationCell, CorrelationHeatmap, CorrelationRow};
pub use surface::{MarkId, Surface, Tooltip};

use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

/// Outer margins around the plot area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Fixed size of a chart and its plot area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Geometry {
    pub const fn new(width: f64, height: f64, margin: Margin) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    /// Left edge of the plot area
    pub fn left(&self) -> f64 {
        self.margin.left
    }

    pub fn right(&self) -> f64 {
        self.margin.left + self.inner_width()
    }

    pub fn top(&self) -> f64 {
        self.margin.top
    }

    pub fn bottom(&self) -> f64 {
        self.margin.top + self.inner_height()
    }
}

/// Common contract of the chart renderers
pub trait ChartRenderer {
    type Datum;

    /// Size and margins of the rendered chart
    fn geometry(&self) -> Geometry;

    /// Draw `data` onto an already cleared surface
    fn draw(&self, data: &[Self::Datum], surface: &mut Surface);

    /// Clear `surface` (shapes and hover state) and redraw from scratch
    fn render(&self, data: &[Self::Datum], surface: &mut Surface) {
        let geometry = self.geometry();
        surface.clear();
        surface.resize(geometry.width, geometry.height);
        self.draw(data, surface);
    }

    /// Render onto a fresh surface
    fn render_surface(&self, data: &[Self::Datum]) -> Surface {
        let geometry = self.geometry();
        let mut surface = Surface::new(geometry.width, geometry.height);
        self.render(data, &mut surface);
        surface
    }

    fn render_svg(&self, data: &[Self::Datum]) -> String {
        self.render_surface(data).to_svg()
    }
}

/// Error selecting or feeding a chart
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Unknown chart: {0}")]
    UnknownKind(String),

    #[error("Invalid chart data: {0}")]
    InvalidData(#[from] serde_json::Error),
}

/// The charts the dashboard can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Distribution,
    DefaultRate,
    Grade,
    Correlation,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Distribution,
        ChartKind::DefaultRate,
        ChartKind::Grade,
        ChartKind::Correlation,
    ];

    /// URL/CLI name
    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::Distribution => "loan-distribution",
            ChartKind::DefaultRate => "default-rate",
            ChartKind::Grade => "loan-grade",
            ChartKind::Correlation => "correlation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Distribution => distribution::TITLE,
            ChartKind::DefaultRate => default_rate::TITLE,
            ChartKind::Grade => grade::TITLE,
            ChartKind::Correlation => heatmap::TITLE,
        }
    }

    /// Render the bundled sample dataset
    pub fn render_sample(&self) -> Surface {
        match self {
            ChartKind::Distribution => {
                DistributionChart.render_surface(&sample::loan_distribution())
            }
            ChartKind::DefaultRate => {
                DefaultRateChart.render_surface(&sample::monthly_default_rates())
            }
            ChartKind::Grade => GradeChart.render_surface(&sample::grade_stats()),
            ChartKind::Correlation => CorrelationHeatmap.render_surface(&sample::correlations()),
        }
    }

    /// Render a JSON array of this chart's datum type
    pub fn render_json(&self, json: &str) -> Result<Surface, ChartError> {
        Ok(match self {
            ChartKind::Distribution => DistributionChart.render_surface(&parse(json)?),
            ChartKind::DefaultRate => DefaultRateChart.render_surface(&parse(json)?),
            ChartKind::Grade => GradeChart.render_surface(&parse(json)?),
            ChartKind::Correlation => CorrelationHeatmap.render_surface(&parse(json)?),
        })
    }
}

fn parse<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, ChartError> {
    Ok(serde_json::from_str(json)?)
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ChartKind::ALL
            .into_iter()
            .find(|kind| {
                kind.slug() == normalized
                    || kind.slug().trim_start_matches("loan-") == normalized
                    || (normalized == "heatmap" && *kind == ChartKind::Correlation)
            })
            .ok_or_else(|| ChartError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_plot_area() {
        let geometry = Geometry::new(550.0, 300.0, Margin::new(20.0, 30.0, 40.0, 60.0));
        assert_eq!(geometry.inner_width(), 460.0);
        assert_eq!(geometry.inner_height(), 240.0);
        assert_eq!(geometry.right(), 520.0);
        assert_eq!(geometry.bottom(), 260.0);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("loan-grade".parse::<ChartKind>().unwrap(), ChartKind::Grade);
        assert_eq!("grade".parse::<ChartKind>().unwrap(), ChartKind::Grade);
        assert_eq!("default_rate".parse::<ChartKind>().unwrap(), ChartKind::DefaultRate);
        assert_eq!("heatmap".parse::<ChartKind>().unwrap(), ChartKind::Correlation);
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_every_sample_renders_marks() {
        for kind in ChartKind::ALL {
            let surface = kind.render_sample();
            assert!(surface.mark_count() > 0, "{} has no marks", kind);
            assert!(surface.texts().contains(&kind.title()));
        }
    }

    #[test]
    fn test_render_json() {
        let surface = ChartKind::Distribution
            .render_json(r#"[{"range": "0-5k", "count": 10}, {"range": "5k-10k", "count": 20}]"#)
            .unwrap();
        assert_eq!(surface.mark_count(), 2);

        assert!(matches!(
            ChartKind::Grade.render_json("{}"),
            Err(ChartError::InvalidData(_))
        ));
    }

    #[test]
    fn test_render_replaces_previous_content() {
        let mut surface = Surface::new(1.0, 1.0);
        DistributionChart.render(&sample::loan_distribution(), &mut surface);
        let first = surface.marks()[0];
        surface.pointer_enter(first);

        DistributionChart.render(&[], &mut surface);
        assert_eq!(surface.mark_count(), 0);
        assert_eq!(surface.hovered(), None);
        assert_eq!(surface.size(), (550.0, 300.0));
    }
}
