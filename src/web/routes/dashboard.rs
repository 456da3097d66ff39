//! Dashboard Routes
//!
//! - GET / - Summary cards and the four charts
//! - GET /analytics - Credit risk analysis charts with commentary

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::charts::ChartKind;
use crate::dashboard::SummaryMetrics;
use crate::web::render::{self, Page};
use crate::web::state::AppState;

use super::page;

/// Alert shown when the summary cannot be loaded
pub const SUMMARY_ERROR: &str = "Failed to load dashboard data. Please try again.";

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let body = match state.api.summary().await {
        Ok(summary) => {
            let metrics = SummaryMetrics::from_summary(&summary);
            tracing::debug!(
                total = metrics.total_records,
                default_rate = metrics.default_rate,
                "Dashboard summary loaded"
            );

            let mut body = String::from(r#"<h1 class="mb-4">Credit Risk Dashboard</h1>"#);
            body.push_str(&render::summary_cards(&metrics));

            for pair in ChartKind::ALL.chunks(2) {
                body.push_str(r#"<div class="row mt-4">"#);
                for kind in pair {
                    body.push_str(r#"<div class="col-lg-6">"#);
                    body.push_str(&render::chart_card(*kind, &kind.render_sample().to_svg(), None));
                    body.push_str("</div>");
                }
                body.push_str("</div>");
            }
            body
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fetching dashboard data");
            render::alert("danger", Some("Error"), SUMMARY_ERROR, false)
        }
    };

    Html(page(&state, "Dashboard", Page::Dashboard, &body))
}

/// Analytics cards: chart and footer commentary
const ANALYSIS: [(ChartKind, &str); 3] = [
    (
        ChartKind::Grade,
        "Lower grade loans (D-G) show significantly higher default rates, with grade G loans defaulting at over 50%.",
    ),
    (
        ChartKind::Correlation,
        "Interest rate shows the strongest positive correlation with default risk, while income shows the strongest negative correlation.",
    ),
    (
        ChartKind::DefaultRate,
        "Default rates show seasonal patterns, with higher defaults in Q4 and Q1.",
    ),
];

/// GET /analytics
pub async fn analytics(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut body = String::from(
        r#"<h1 class="mb-4">Analytics &amp; Insights</h1><h4 class="mb-4">Credit Risk Analysis</h4><p>The following visualizations highlight key patterns and relationships in the credit risk data, helping identify factors that contribute most to loan defaults.</p><div class="row">"#,
    );

    for (index, (kind, footer)) in ANALYSIS.iter().enumerate() {
        // The trend chart spans the full width below the first two
        let column = if index < 2 { "col-lg-6" } else { "col-lg-12" };
        body.push_str(&format!(r#"<div class="{}">"#, column));
        body.push_str(&render::chart_card(*kind, &kind.render_sample().to_svg(), Some(footer)));
        body.push_str("</div>");
    }
    body.push_str("</div>");

    Html(page(&state, "Analytics", Page::Analytics, &body))
}
