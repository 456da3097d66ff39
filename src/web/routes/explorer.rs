//! Data Explorer Route
//!
//! - GET /explorer?page&per_page&loan_status - One page of loan records
//!
//! Each request builds its own [`Explorer`] from the query string, so the
//! page is fully described by its URL. Filter and page-size forms omit
//! `page`, which sends the user back to the first page.

use axum::{
    extract::{Query, State},
    response::Html,
};
use std::fmt::Write;
use std::sync::Arc;

use crate::dashboard::explorer::{COLUMNS, PAGE_SIZES};
use crate::dashboard::{
    pagination_items, Explorer, ExplorerState, ExplorerView, PageItem, TableRow,
};
use crate::format::escape;
use crate::mappings::{self, Domain};
use crate::web::dto::ExplorerParams;
use crate::web::render::{self, Page};
use crate::web::state::AppState;

use super::page;

/// GET /explorer
pub async fn explorer(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplorerParams>,
) -> Html<String> {
    let default_per_page = state.config.dashboard.default_per_page;
    let mut notices = Vec::new();

    let per_page = params.page_size(default_per_page).unwrap_or_else(|message| {
        notices.push(message);
        default_per_page
    });
    let page_number = params.page_number().unwrap_or_else(|message| {
        notices.push(message);
        1
    });
    if let Some(raw) = params.unknown_status() {
        notices.push(format!("Unknown loan status \"{}\"; showing all records", raw));
    }
    for notice in &notices {
        tracing::warn!(notice = %notice, "Ignoring explorer query parameter");
    }

    let mut query = ExplorerState::with_per_page(per_page);
    query.set_filter(params.status_filter());
    query.go_to(page_number);

    let explorer = Explorer::new(Arc::clone(&state.api), query);
    explorer.refresh().await;
    let (shown, view) = explorer.view().await;

    let mut body = String::from(r#"<h1 class="mb-4">Data Explorer</h1>"#);
    body.push_str(&filter_form(&shown));
    for notice in &notices {
        body.push_str(&render::alert("warning", None, notice, true));
    }

    match &view {
        ExplorerView::Loading => body.push_str(&render::spinner("Loading data...")),
        ExplorerView::Failed { message } => {
            body.push_str(&render::alert("danger", None, message, true));
        }
        ExplorerView::Loaded {
            rows, total_pages, ..
        } => {
            if let Some(showing) = view.showing() {
                let _ = write!(body, r#"<p class="text-muted">{}</p>"#, escape(&showing));
            }
            body.push_str(&table(rows));
            body.push_str(&pagination(&shown, *total_pages));
        }
    }

    Html(page(&state, "Data Explorer", Page::Explorer, &body))
}

/// Link to `page` under the same filter and page size
fn explorer_href(state: &ExplorerState, page: u32) -> String {
    let mut href = format!("/explorer?page={}&per_page={}", page, state.per_page);
    if let Some(status) = state.status_filter {
        let _ = write!(href, "&loan_status={}", urlencoding::encode(&status.to_string()));
    }
    href
}

fn filter_form(state: &ExplorerState) -> String {
    let table = mappings::mappings();

    let mut status_options = String::from(r#"<option value="">All</option>"#);
    for (code, label) in table.table(Domain::LoanStatus).entries() {
        let selected = if state.status_filter == Some(code) { " selected" } else { "" };
        let _ = write!(
            status_options,
            r#"<option value="{code}"{selected}>{label}</option>"#,
            label = escape(label),
        );
    }

    let mut size_options = String::new();
    for size in PAGE_SIZES {
        let selected = if state.per_page == size { " selected" } else { "" };
        let _ = write!(size_options, r#"<option value="{size}"{selected}>{size}</option>"#);
    }

    format!(
        r#"<form class="row g-3 align-items-end mb-4" method="get" action="/explorer"><div class="col-auto"><label class="form-label" for="loan_status">Loan Status</label><select class="form-select" id="loan_status" name="loan_status">{status_options}</select></div><div class="col-auto"><label class="form-label" for="per_page">Rows per page</label><select class="form-select" id="per_page" name="per_page">{size_options}</select></div><div class="col-auto"><button type="submit" class="btn btn-primary">Apply</button></div></form>"#
    )
}

fn table(rows: &[TableRow]) -> String {
    let mut out = String::from(
        r#"<div class="table-responsive"><table class="table table-dark table-striped table-hover"><thead><tr>"#,
    );
    for column in COLUMNS {
        let _ = write!(out, "<th>{}</th>", column);
    }
    out.push_str("</tr></thead><tbody>");

    if rows.is_empty() {
        let _ = write!(
            out,
            r#"<tr><td colspan="{}" class="text-center text-muted">No records found</td></tr>"#,
            COLUMNS.len()
        );
    }

    for row in rows {
        out.push_str("<tr>");
        for (index, cell) in row.cells().iter().enumerate() {
            if COLUMNS[index] == "Status" {
                let variant = if row.is_default { "danger" } else { "success" };
                let _ = write!(
                    out,
                    r#"<td><span class="badge bg-{}">{}</span></td>"#,
                    variant,
                    escape(cell)
                );
            } else {
                let _ = write!(out, "<td>{}</td>", escape(cell));
            }
        }
        out.push_str("</tr>");
    }

    out.push_str("</tbody></table></div>");
    out
}

fn pagination(state: &ExplorerState, total_pages: u32) -> String {
    let mut out = String::from(r#"<nav aria-label="Data pages"><ul class="pagination justify-content-center">"#);

    for item in pagination_items(state.page, total_pages) {
        match item {
            PageItem::Previous { target, disabled } => {
                out.push_str(&page_link(state, target, "&laquo;", disabled, false))
            }
            PageItem::Next { target, disabled } => {
                out.push_str(&page_link(state, target, "&raquo;", disabled, false))
            }
            PageItem::Page { number, active } => {
                out.push_str(&page_link(state, number, &number.to_string(), false, active))
            }
            PageItem::Ellipsis => out.push_str(
                r#"<li class="page-item disabled"><span class="page-link">&hellip;</span></li>"#,
            ),
        }
    }

    out.push_str("</ul></nav>");
    out
}

fn page_link(
    state: &ExplorerState,
    target: u32,
    text: &str,
    disabled: bool,
    active: bool,
) -> String {
    let mut class = String::from("page-item");
    if disabled {
        class.push_str(" disabled");
    }
    if active {
        class.push_str(" active");
    }
    format!(
        r#"<li class="{}"><a class="page-link" href="{}">{}</a></li>"#,
        class,
        escape(&explorer_href(state, target)),
        text
    )
}
