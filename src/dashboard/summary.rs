//! Summary cards
//!
//! Four aggregate figures derived from the dataset summary.

use serde::Serialize;

use crate::client::DataSummary;
use crate::format;
use crate::mappings::Code;

const NON_DEFAULT: Code = 0;
const DEFAULT: Code = 1;

/// Aggregate figures shown on the dashboard cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_records: u64,
    pub non_default: u64,
    pub default: u64,
    /// Default count as a percentage of all records, 0 for an empty dataset
    pub default_rate: f64,
}

impl SummaryMetrics {
    pub fn from_summary(summary: &DataSummary) -> Self {
        let total_records = summary.total_records;
        let non_default = summary.status_count(NON_DEFAULT);
        let default = summary.status_count(DEFAULT);

        Self {
            total_records,
            non_default,
            default,
            default_rate: default_rate(default, total_records),
        }
    }

    /// `(title, value)` pairs in display order
    pub fn cards(&self) -> [(&'static str, String); 4] {
        [
            ("Total Records", format::thousands(self.total_records)),
            ("Non-Default Loans", format::thousands(self.non_default)),
            ("Default Loans", format::thousands(self.default)),
            ("Default Rate", format!("{:.2}%", self.default_rate)),
        ]
    }
}

/// `default / total × 100`, or 0 when `total` is 0
pub fn default_rate(default: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        default as f64 / total as f64 * 100.0
    }
}
