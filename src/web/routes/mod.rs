//! Route Handlers
//!
//! Page and endpoint handlers organized by functionality.

pub mod charts;
pub mod dashboard;
pub mod explorer;
pub mod health;
pub mod predict;

use crate::web::render::{self, Page};
use crate::web::state::AppState;

/// Wrap a page body in the shared layout
pub(crate) fn page(state: &AppState, title: &str, active: Page, body: &str) -> String {
    render::layout(
        title,
        active,
        &state.health_snapshot(),
        state.config.dashboard.health_poll_secs,
        body,
    )
}
