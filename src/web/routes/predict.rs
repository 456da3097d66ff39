//! Risk Prediction Routes
//!
//! - GET /predict - Application form with default values
//! - POST /predict - Score the submitted form (form-encoded)
//!
//! A submission with `action=reset` restores the defaults instead.

use axum::{extract::State, response::Html, Form};
use std::fmt::Write;
use std::sync::Arc;

use crate::client::CreditRiskApi;
use crate::dashboard::prediction::{FieldKind, FieldSpec, Section, FIELDS};
use crate::dashboard::{Assessment, PredictionPanel};
use crate::format::escape;
use crate::mappings::{self, Code};
use crate::web::render::{self, Page};
use crate::web::state::AppState;

use super::page;

type Panel = PredictionPanel<dyn CreditRiskApi>;

/// GET /predict
pub async fn form(State(state): State<Arc<AppState>>) -> Html<String> {
    let panel = Panel::new(Arc::clone(&state.api));
    Html(page(&state, "Risk Prediction", Page::Predict, &render_panel(&panel, None)))
}

/// POST /predict
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Html<String> {
    let mut panel = Panel::new(Arc::clone(&state.api));

    if pairs.iter().any(|(name, value)| name == "action" && value == "reset") {
        panel.reset();
        return Html(page(&state, "Risk Prediction", Page::Predict, &render_panel(&panel, None)));
    }

    let mut input_error = None;
    for (name, value) in pairs.iter().filter(|(name, _)| name != "action") {
        if let Err(e) = panel.set_field(name, value) {
            tracing::warn!(field = %name, error = %e, "Rejected prediction form input");
            input_error.get_or_insert_with(|| e.to_string());
        }
    }

    if input_error.is_none() {
        panel.submit().await;
    }

    Html(page(
        &state,
        "Risk Prediction",
        Page::Predict,
        &render_panel(&panel, input_error.as_deref()),
    ))
}

fn render_panel(panel: &Panel, input_error: Option<&str>) -> String {
    let error = input_error.or(panel.error());

    let mut body = String::from(
        r#"<h1 class="mb-4">Credit Risk Prediction</h1><div class="row"><div class="col-lg-7"><div class="card bg-dark text-white mb-4"><div class="card-header"><h5 class="mb-0"><i class="bi bi-calculator me-2"></i>Loan Application Details</h5></div><div class="card-body">"#,
    );
    if let Some(message) = error {
        body.push_str(&render::alert("danger", None, message, true));
    }
    body.push_str(&application_form(panel));
    body.push_str("</div></div></div>");

    body.push_str(
        r#"<div class="col-lg-5"><div class="card bg-dark text-white mb-4"><div class="card-header"><h5 class="mb-0"><i class="bi bi-graph-up me-2"></i>Prediction Result</h5></div><div class="card-body">"#,
    );
    match (panel.assessment(), error) {
        (Some(assessment), _) => body.push_str(&result(assessment)),
        (None, Some(message)) => {
            body.push_str(&render::alert("danger", Some("Error"), message, false))
        }
        (None, None) => body.push_str(
            r#"<div class="text-center py-5"><p class="text-muted">Complete the form and click "Predict Default Risk" to analyze this loan application.</p></div>"#,
        ),
    }
    body.push_str("</div></div></div></div>");
    body
}

fn application_form(panel: &Panel) -> String {
    let form = panel.form();
    let mut out = String::from(
        r#"<form id="prediction-form" method="post" action="/predict"><div class="row">"#,
    );

    for (section, heading) in [
        (Section::Personal, "Personal Information"),
        (Section::Loan, "Loan Information"),
    ] {
        let _ = write!(out, r#"<div class="col-md-6"><h6 class="text-white mb-3">{}</h6>"#, heading);
        for spec in FIELDS.iter().filter(|spec| spec.section == section) {
            out.push_str(&field_input(spec, form.value(spec.name).unwrap_or_default()));
        }
        out.push_str("</div>");
    }

    let (debt_to_income, income_to_loan) = form.derived_display();
    let _ = write!(
        out,
        r#"<div class="col-12"><h6 class="text-primary mb-3 mt-4">Derived Fields</h6><div class="row"><div class="col-md-6 mb-3"><label class="form-label">Debt to Income Ratio</label><input class="form-control" id="debt_to_income" value="{}" readonly></div><div class="col-md-6 mb-3"><label class="form-label">Income to Loan Ratio</label><input class="form-control" id="income_to_loan_ratio" value="{}" readonly></div></div></div>"#,
        debt_to_income, income_to_loan
    );
    out.push_str("</div>");

    let disabled = if panel.can_submit() { "" } else { " disabled" };
    let _ = write!(
        out,
        r#"<div class="d-flex justify-content-between mt-4"><button type="submit" name="action" value="reset" class="btn btn-secondary" formnovalidate><i class="bi bi-arrow-counterclockwise me-1"></i> Reset Form</button><button type="submit" id="predict-submit" class="btn btn-primary"{}><span id="predict-spinner" class="spinner-border spinner-border-sm me-1 d-none" role="status" aria-hidden="true"></span><span id="predict-label"><i class="bi bi-calculator me-1"></i> Predict Default Risk</span></button></div></form>"#,
        disabled
    );
    out.push_str(FORM_SCRIPT);
    out
}

/// Recomputes the derived ratios as the user types and marks the form
/// busy once submitted. Number formats match `derived_display`.
const FORM_SCRIPT: &str = r#"<script>
(function () {
  const form = document.getElementById("prediction-form");
  const income = document.getElementById("person_income");
  const amount = document.getElementById("loan_amnt");
  function ratio(num, den, digits) {
    const n = parseFloat(num.value), d = parseFloat(den.value);
    return (isFinite(n) && isFinite(d) && d !== 0) ? (n / d).toFixed(digits) : "-";
  }
  function recompute() {
    document.getElementById("debt_to_income").value = ratio(amount, income, 3);
    document.getElementById("income_to_loan_ratio").value = ratio(income, amount, 2);
  }
  income.addEventListener("input", recompute);
  amount.addEventListener("input", recompute);
  form.addEventListener("submit", function (event) {
    if (event.submitter && event.submitter.value === "reset") return;
    const button = document.getElementById("predict-submit");
    button.disabled = true;
    document.getElementById("predict-spinner").classList.remove("d-none");
    document.getElementById("predict-label").textContent = " Predicting...";
  });
})();
</script>"#;

fn field_input(spec: &FieldSpec, value: f64) -> String {
    let mut out = format!(
        r#"<div class="mb-3"><label class="form-label" for="{name}">{label}</label>"#,
        name = spec.name,
        label = escape(spec.label),
    );

    match spec.kind {
        FieldKind::Code(domain) => {
            let tables = mappings::mappings();
            let _ = write!(out, r#"<select class="form-select" id="{0}" name="{0}">"#, spec.name);
            for (code, label) in tables.table(domain).entries() {
                let selected = if code == value as Code { " selected" } else { "" };
                let _ = write!(
                    out,
                    r#"<option value="{code}"{selected}>{label}</option>"#,
                    label = escape(label)
                );
            }
            out.push_str("</select>");
        }
        FieldKind::Integer | FieldKind::Float => {
            let _ = write!(
                out,
                r#"<input type="number" class="form-control" id="{0}" name="{0}" value="{1}""#,
                spec.name, value
            );
            if let Some(min) = spec.min {
                let _ = write!(out, r#" min="{}""#, min);
            }
            if let Some(max) = spec.max {
                let _ = write!(out, r#" max="{}""#, max);
            }
            if let Some(step) = spec.step {
                let _ = write!(out, r#" step="{}""#, step);
            }
            out.push_str(" required>");
        }
    }

    if let Some(help) = spec.help {
        let _ = write!(out, r#"<small class="form-text text-muted">{}</small>"#, escape(help));
    }
    out.push_str("</div>");
    out
}

fn result(assessment: &Assessment) -> String {
    let variant = assessment.tier.variant();
    let percent = assessment.default_probability * 100.0;
    let marker = percent.clamp(0.0, 100.0);

    let mut out = format!(
        r#"<div class="mb-4 text-center"><h4>Risk Assessment</h4><div class="p-3 rounded-circle d-inline-block mt-3 bg-{variant}" style="width: 150px; height: 150px"><div class="d-flex align-items-center justify-content-center h-100"><div class="text-white"><h3>{classification}</h3><h5>{confidence:.2}%</h5><p class="mb-0">confidence</p></div></div></div><h4 class="mt-3 text-{variant}" id="risk-tier">{tier}</h4>"#,
        classification = escape(&assessment.classification),
        confidence = assessment.confidence * 100.0,
        tier = assessment.tier.label(),
    );

    let _ = write!(
        out,
        r#"<div class="mt-4 mb-3"><h5>Default Probability</h5><div class="progress-stacked mt-2"><div class="progress" style="width: 25%"><div class="progress-bar bg-success"></div></div><div class="progress" style="width: 25%"><div class="progress-bar bg-warning"></div></div><div class="progress" style="width: 50%"><div class="progress-bar bg-danger"></div></div></div><div class="d-flex justify-content-between mt-1"><small>0%</small><small>25%</small><small>50%</small><small>100%</small></div><div class="position-relative mt-3" style="height: 30px"><div class="position-absolute" style="left: {marker:.2}%; top: -15px; transform: translateX(-50%)"><div class="bg-{variant} text-white rounded px-2 py-1 small">{percent:.2}%</div></div></div></div></div>"#
    );

    let _ = write!(
        out,
        r#"<div class="mt-4"><h5>Model Details</h5><table class="table table-bordered table-sm table-dark"><tbody><tr><th>Model Name</th><td>{}</td></tr><tr><th>Model Version</th><td>{}</td></tr></tbody></table>"#,
        escape(&assessment.model_name),
        escape(&assessment.model_version)
    );
    if let Some(metrics) = &assessment.metrics {
        let _ = write!(
            out,
            r#"<h6 class="mt-3">Model Performance Metrics</h6><div class="row"><div class="col-6"><p class="mb-1"><strong>Accuracy:</strong> {:.4}</p><p class="mb-1"><strong>Precision:</strong> {:.4}</p></div><div class="col-6"><p class="mb-1"><strong>Recall:</strong> {:.4}</p><p class="mb-1"><strong>F1 Score:</strong> {:.4}</p></div></div>"#,
            metrics.accuracy, metrics.precision, metrics.recall, metrics.f1
        );
    }
    out.push_str("</div>");

    let recommendation_variant = if assessment.is_default() { "danger" } else { "success" };
    out.push_str(&render::alert(
        recommendation_variant,
        None,
        assessment.recommendation(),
        false,
    ));

    let _ = write!(
        out,
        r#"<details class="mt-4"><summary><i class="bi bi-code-slash me-2"></i>View API Response</summary><pre class="bg-dark text-light p-3" style="overflow: auto">{}</pre></details>"#,
        escape(&assessment.raw_json())
    );
    out
}
