//! Bundled sample datasets, one per chart.

use super::{AmountBucket, CorrelationCell, CorrelationRow, GradeStats, MonthlyDefaultRate};

pub fn loan_distribution() -> Vec<AmountBucket> {
    [
        ("0-5k", 2450),
        ("5k-10k", 5230),
        ("10k-15k", 8650),
        ("15k-20k", 6540),
        ("20k-25k", 4320),
        ("25k-30k", 2870),
        ("30k+", 1520),
    ]
    .into_iter()
    .map(|(range, count)| AmountBucket {
        range: range.to_string(),
        count,
    })
    .collect()
}

pub fn monthly_default_rates() -> Vec<MonthlyDefaultRate> {
    [
        ("Jan", 18.2),
        ("Feb", 19.1),
        ("Mar", 20.5),
        ("Apr", 22.3),
        ("May", 21.8),
        ("Jun", 20.4),
        ("Jul", 19.7),
        ("Aug", 18.9),
        ("Sep", 21.2),
        ("Oct", 22.5),
        ("Nov", 23.1),
        ("Dec", 21.7),
    ]
    .into_iter()
    .map(|(month, default_rate)| MonthlyDefaultRate {
        month: month.to_string(),
        default_rate,
    })
    .collect()
}

pub fn grade_stats() -> Vec<GradeStats> {
    [
        ("A", 5.3, 4250),
        ("B", 9.8, 6120),
        ("C", 15.6, 8340),
        ("D", 22.7, 5670),
        ("E", 31.9, 3480),
        ("F", 42.1, 1950),
        ("G", 55.8, 920),
    ]
    .into_iter()
    .map(|(grade, default_rate, total_loans)| GradeStats {
        grade: grade.to_string(),
        default_rate,
        total_loans,
    })
    .collect()
}

const FEATURES: [&str; 5] = [
    "person_age",
    "person_income",
    "loan_amnt",
    "loan_int_rate",
    "loan_status",
];

const CORRELATIONS: [[f64; 5]; 5] = [
    [1.0, 0.35, 0.22, -0.12, -0.18],
    [0.35, 1.0, 0.57, -0.05, -0.29],
    [0.22, 0.57, 1.0, 0.31, 0.14],
    [-0.12, -0.05, 0.31, 1.0, 0.42],
    [-0.18, -0.29, 0.14, 0.42, 1.0],
];

pub fn correlations() -> Vec<CorrelationRow> {
    FEATURES
        .iter()
        .zip(CORRELATIONS.iter())
        .map(|(feature, row)| CorrelationRow {
            feature: feature.to_string(),
            values: FEATURES
                .iter()
                .zip(row.iter())
                .map(|(other, &correlation)| CorrelationCell {
                    feature: other.to_string(),
                    correlation,
                })
                .collect(),
        })
        .collect()
}
