//! Chart Routes
//!
//! - GET /charts/:kind - Standalone SVG of one chart
//!
//! `?hover=N` renders mark `N` with its emphasis and tooltip, and
//! `?background=#rrggbb` fills the canvas for viewing outside the page.

use axum::{
    extract::{Path, Query},
    http::header,
    response::IntoResponse,
};

use crate::charts::ChartKind;
use crate::web::dto::ChartParams;
use crate::web::error::{WebError, WebResult};

/// GET /charts/:kind
pub async fn chart_svg(
    Path(kind): Path<String>,
    Query(params): Query<ChartParams>,
) -> WebResult<impl IntoResponse> {
    let kind: ChartKind = kind.parse()?;

    let mut surface = kind.render_sample();
    if let Some(background) = params.background {
        surface = surface.with_background(background);
    }
    if let Some(index) = params.hover {
        let mark = surface
            .marks()
            .get(index)
            .copied()
            .ok_or_else(|| WebError::NotFound(format!("mark {} in {} chart", index, kind)))?;
        surface.pointer_enter(mark);
    }

    Ok((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        surface.to_svg(),
    ))
}
