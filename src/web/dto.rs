//! Data Transfer Objects
//!
//! Query strings accepted by the pages and JSON bodies returned by the
//! machine-readable endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dashboard::ApiStatus;
use crate::mappings::{self, Code, Domain};

// ============================================
// EXPLORER
// ============================================

/// `GET /explorer` query string
///
/// Numbers arrive as raw text so a malformed value can be reported on the
/// page instead of rejecting the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct ExplorerParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub per_page: Option<String>,
    /// Status code or label; empty means all statuses
    #[serde(default)]
    pub loan_status: Option<String>,
}

impl ExplorerParams {
    /// Requested page; missing or empty means the first page
    pub fn page_number(&self) -> Result<u32, String> {
        parse_number(self.page.as_deref(), "page number").map(|page| page.unwrap_or(1))
    }

    /// Requested page size, `default` when absent
    pub fn page_size(&self, default: u32) -> Result<u32, String> {
        parse_number(self.per_page.as_deref(), "page size").map(|size| size.unwrap_or(default))
    }

    /// The status filter, resolving labels through the reverse mapping
    pub fn status_filter(&self) -> Option<Code> {
        let raw = self.status_raw()?;
        raw.parse::<Code>()
            .ok()
            .or_else(|| mappings::mappings().code(Domain::LoanStatus, raw))
    }

    /// A non-empty status that resolves to no code; the filter is dropped
    pub fn unknown_status(&self) -> Option<&str> {
        match self.status_filter() {
            Some(_) => None,
            None => self.status_raw(),
        }
    }

    fn status_raw(&self) -> Option<&str> {
        let raw = self.loan_status.as_deref()?.trim();
        (!raw.is_empty()).then_some(raw)
    }
}

fn parse_number(raw: Option<&str>, what: &str) -> Result<Option<u32>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<u32>()
            .map(Some)
            .map_err(|_| format!("Invalid {}: {}", what, raw)),
    }
}

// ============================================
// CHARTS
// ============================================

/// `GET /charts/:kind` query string
#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    /// Index of the mark to render in its hovered state
    #[serde(default)]
    pub hover: Option<usize>,
    /// Background fill for standalone viewing
    #[serde(default)]
    pub background: Option<String>,
}

// ============================================
// STATUS
// ============================================

/// `GET /status` response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ApiStatus,
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checks: u64,
    pub api_base: String,
    pub uptime_seconds: u64,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(status: Option<&str>) -> ExplorerParams {
        ExplorerParams {
            loan_status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_filter() {
        assert_eq!(params(None).status_filter(), None);
        assert_eq!(params(Some("")).status_filter(), None);
        assert_eq!(params(Some("1")).status_filter(), Some(1));
        assert_eq!(params(Some("Non-Default")).status_filter(), Some(0));
        assert_eq!(params(Some("bogus")).status_filter(), None);
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(params(Some("bogus")).unknown_status(), Some("bogus"));
        assert_eq!(params(Some("Default")).unknown_status(), None);
        assert_eq!(params(Some(" ")).unknown_status(), None);
        assert_eq!(params(None).unknown_status(), None);
    }

    #[test]
    fn test_page_numbers() {
        let mut params = ExplorerParams::default();
        assert_eq!(params.page_number(), Ok(1));
        assert_eq!(params.page_size(20), Ok(20));

        params.page = Some("3".to_string());
        params.per_page = Some(String::new());
        assert_eq!(params.page_number(), Ok(3));
        assert_eq!(params.page_size(20), Ok(20));

        params.page = Some("abc".to_string());
        params.per_page = Some("-5".to_string());
        assert_eq!(params.page_number(), Err("Invalid page number: abc".to_string()));
        assert_eq!(params.page_size(20), Err("Invalid page size: -5".to_string()));
    }
}
