//! HTML rendering
//!
//! Page shell and the small building blocks the pages share. Pages are
//! assembled as strings; every dynamic value goes through [`escape`].

use std::fmt::Write;

use crate::charts::ChartKind;
use crate::dashboard::{ApiStatus, HealthSnapshot, SummaryMetrics};
use crate::format::escape;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css";
const BOOTSTRAP_JS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/js/bootstrap.bundle.min.js";
const ICONS_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.1/font/bootstrap-icons.css";

/// Top-level navigation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Explorer,
    Predict,
    Analytics,
}

impl Page {
    const NAV: [Page; 4] = [Page::Dashboard, Page::Explorer, Page::Predict, Page::Analytics];

    pub fn path(&self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Explorer => "/explorer",
            Page::Predict => "/predict",
            Page::Analytics => "/analytics",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Explorer => "Data Explorer",
            Page::Predict => "Risk Prediction",
            Page::Analytics => "Analytics",
        }
    }
}

fn status_icon(health: &HealthSnapshot) -> &'static str {
    match health.status {
        ApiStatus::Online => "bi-heart-pulse",
        ApiStatus::Checking => "bi-hourglass-split",
        ApiStatus::Offline => "bi-exclamation-triangle",
    }
}

/// API status badge shown in the navbar
pub fn status_badge(health: &HealthSnapshot) -> String {
    format!(
        r#"<span id="api-status" class="badge bg-{variant} ms-2" data-status="{status}"><i class="bi {icon} me-1"></i> {status}</span>"#,
        variant = health.status.variant(),
        icon = status_icon(health),
        status = health.status.as_str(),
    )
}

/// Full HTML document around `body`.
///
/// The badge re-polls `/status` every `poll_secs` seconds.
pub fn layout(
    title: &str,
    active: Page,
    health: &HealthSnapshot,
    poll_secs: u64,
    body: &str,
) -> String {
    let mut nav = String::new();
    for page in Page::NAV {
        let class = if page == active { "nav-link active" } else { "nav-link" };
        let _ = write!(
            nav,
            r#"<li class="nav-item"><a class="{class} px-3 py-2" href="{href}">{label}</a></li>"#,
            href = page.path(),
            label = page.label(),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-bs-theme="dark">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Credit Risk Analytics</title>
<link rel="stylesheet" href="{css}">
<link rel="stylesheet" href="{icons}">
</head>
<body class="bg-dark text-white">
<nav class="navbar navbar-expand-lg header mb-4">
<div class="container-fluid">
<a class="navbar-brand logo-text" href="/"><i class="bi bi-graph-up-arrow me-2"></i>Credit Risk Analytics</a>
<ul class="navbar-nav me-auto">{nav}</ul>
<div class="d-flex align-items-center">
<div class="me-3 text-white">API Status:{badge}</div>
<a href="/predict" class="btn btn-outline-info me-2"><i class="bi bi-calculator me-1"></i> Predict</a>
<a href="/" class="btn btn-info"><i class="bi bi-house-door me-1"></i> Home</a>
</div>
</div>
</nav>
<main class="container-fluid">
{body}
</main>
<script src="{js}"></script>
<script>
(function () {{
  const variants = {{ online: "success", checking: "warning", offline: "danger" }};
  async function poll() {{
    try {{
      const res = await fetch("/status");
      const body = await res.json();
      const badge = document.getElementById("api-status");
      badge.className = "badge bg-" + (variants[body.status] || "danger") + " ms-2";
      badge.dataset.status = body.status;
      badge.lastChild.textContent = " " + body.status;
    }} catch (e) {{}}
  }}
  setInterval(poll, {poll_ms});
}})();
</script>
</body>
</html>"#,
        title = escape(title),
        css = BOOTSTRAP_CSS,
        icons = ICONS_CSS,
        js = BOOTSTRAP_JS,
        badge = status_badge(health),
        poll_ms = poll_secs.max(1) * 1000,
    )
}

/// Bootstrap alert; dismissible alerts carry a close button
pub fn alert(variant: &str, heading: Option<&str>, message: &str, dismissible: bool) -> String {
    let mut out = String::new();
    let class = if dismissible {
        format!("alert alert-{} alert-dismissible fade show mt-4", variant)
    } else {
        format!("alert alert-{} mt-4", variant)
    };
    let _ = write!(out, r#"<div class="{}" role="alert">"#, class);
    if let Some(heading) = heading {
        let _ = write!(out, r#"<h4 class="alert-heading">{}</h4>"#, escape(heading));
    }
    let _ = write!(out, "<p class=\"mb-0\">{}</p>", escape(message));
    if dismissible {
        out.push_str(r#"<button type="button" class="btn-close" data-bs-dismiss="alert" aria-label="Close"></button>"#);
    }
    out.push_str("</div>");
    out
}

/// The four summary cards
pub fn summary_cards(metrics: &SummaryMetrics) -> String {
    const BORDERS: [&str; 4] = ["primary", "success", "danger", "warning"];

    let mut out = String::from(r#"<div class="row">"#);
    for ((title, value), border) in metrics.cards().iter().zip(BORDERS) {
        let _ = write!(
            out,
            r#"<div class="col-md-3"><div class="card bg-dark text-white mb-4 border-{border}"><div class="card-body"><h5 class="card-title text-muted">{title}</h5><p class="card-text display-6">{value}</p></div></div></div>"#,
            title = escape(title),
            value = escape(value),
        );
    }
    out.push_str("</div>");
    out
}

/// Card wrapping an inline chart
pub fn chart_card(kind: ChartKind, svg: &str, footer: Option<&str>) -> String {
    let mut out = format!(
        r#"<div class="card bg-dark text-white border-secondary mb-4" data-chart="{slug}"><div class="card-header"><h5 class="mb-0">{title}</h5></div><div class="card-body chart-container">{svg}</div>"#,
        slug = kind.slug(),
        title = escape(kind.title()),
    );
    if let Some(footer) = footer {
        let _ = write!(
            out,
            r#"<div class="card-footer"><small class="text-muted">{}</small></div>"#,
            escape(footer)
        );
    }
    out.push_str("</div>");
    out
}

/// Centered spinner with a caption
pub fn spinner(caption: &str) -> String {
    format!(
        r#"<div class="text-center p-5"><div class="spinner-border text-primary" role="status"><span class="visually-hidden">Loading...</span></div><p class="mt-3">{}</p></div>"#,
        escape(caption)
    )
}
