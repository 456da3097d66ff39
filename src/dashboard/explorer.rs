//! Data explorer
//!
//! Paginated, filterable view over the loan records. Coded fields are
//! translated through the process-wide mapping tables; unmapped codes are
//! shown raw.
//!
//! Every fetch takes a request generation. If the filter, page size or page
//! changes while a fetch is in flight, the older response is discarded on
//! arrival instead of overwriting the newer one.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::client::{CreditRiskApi, DataQuery, LoanRecord};
use crate::dashboard::request::RequestSequence;
use crate::format;
use crate::mappings::{self, Code, Domain, Mappings};

/// Page sizes offered by the size selector
pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

pub const DEFAULT_PER_PAGE: u32 = 20;

/// Alert shown when a page cannot be loaded
pub const LOAD_ERROR: &str = "Failed to load data. Please try again.";

pub const COLUMNS: [&str; 11] = [
    "ID",
    "Age",
    "Income",
    "Ownership",
    "Emp. Length",
    "Intent",
    "Grade",
    "Amount",
    "Int. Rate",
    "Status",
    "Def. History",
];

// ============================================
// PAGINATION
// ============================================

/// One control in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageItem {
    Previous { target: u32, disabled: bool },
    Page { number: u32, active: bool },
    Ellipsis,
    Next { target: u32, disabled: bool },
}

/// Pagination controls for `page` of `total_pages`: previous/next, the
/// current page's ±2 neighbourhood, and first/last shortcuts separated by
/// an ellipsis when the gap exceeds one page.
pub fn pagination_items(page: u32, total_pages: u32) -> Vec<PageItem> {
    let current = page.max(1) as i64;
    let total = total_pages as i64;
    let mut items = Vec::with_capacity(11);

    items.push(PageItem::Previous {
        target: (current - 1).max(1) as u32,
        disabled: current <= 1,
    });

    if current > 3 {
        items.push(PageItem::Page {
            number: 1,
            active: false,
        });
        if current > 4 {
            items.push(PageItem::Ellipsis);
        }
    }

    for number in (current - 2).max(1)..=(current + 2).min(total) {
        items.push(PageItem::Page {
            number: number as u32,
            active: number == current,
        });
    }

    if current < total - 2 {
        if current < total - 3 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page {
            number: total as u32,
            active: false,
        });
    }

    items.push(PageItem::Next {
        target: (current + 1) as u32,
        disabled: current >= total,
    });

    items
}

// ============================================
// TABLE ROWS
// ============================================

/// A loan record prepared for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: i64,
    pub age: String,
    pub income: String,
    pub home_ownership: String,
    pub emp_length: String,
    pub intent: String,
    pub grade: String,
    pub amount: String,
    pub int_rate: String,
    pub status: String,
    /// Status is anything other than non-default; drives the badge colour
    pub is_default: bool,
    pub default_on_file: String,
}

impl TableRow {
    pub fn from_record(record: &LoanRecord, mappings: &Mappings) -> Self {
        Self {
            id: record.id,
            age: format::number(record.person_age, 1),
            income: format::currency(record.person_income),
            home_ownership: mappings.display(Domain::HomeOwnership, record.person_home_ownership),
            emp_length: record
                .person_emp_length
                .map(|years| format!("{} yrs", format::number(years, 1)))
                .unwrap_or_else(|| "-".to_string()),
            intent: mappings.display(Domain::LoanIntent, record.loan_intent),
            grade: mappings.display(Domain::LoanGrade, record.loan_grade),
            amount: format::currency(record.loan_amnt),
            int_rate: record
                .loan_int_rate
                .map(|rate| format!("{}%", format::number(rate, 2)))
                .unwrap_or_else(|| "-".to_string()),
            status: mappings.display(Domain::LoanStatus, record.loan_status),
            is_default: record.loan_status != 0,
            default_on_file: mappings
                .display(Domain::DefaultOnFile, record.cb_person_default_on_file),
        }
    }

    /// Cell texts in [`COLUMNS`] order
    pub fn cells(&self) -> [String; 11] {
        [
            self.id.to_string(),
            self.age.clone(),
            self.income.clone(),
            self.home_ownership.clone(),
            self.emp_length.clone(),
            self.intent.clone(),
            self.grade.clone(),
            self.amount.clone(),
            self.int_rate.clone(),
            self.status.clone(),
            self.default_on_file.clone(),
        ]
    }
}

// ============================================
// EXPLORER STATE
// ============================================

/// Query controls of the explorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExplorerState {
    /// 1-based
    pub page: u32,
    pub per_page: u32,
    pub status_filter: Option<Code>,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            status_filter: None,
        }
    }
}

impl ExplorerState {
    pub fn with_per_page(per_page: u32) -> Self {
        Self {
            per_page: normalize_per_page(per_page),
            ..Default::default()
        }
    }

    /// Changing the filter returns to the first page
    pub fn set_filter(&mut self, status: Option<Code>) {
        self.status_filter = status;
        self.page = 1;
    }

    /// Changing the page size returns to the first page
    pub fn set_per_page(&mut self, per_page: u32) {
        self.per_page = normalize_per_page(per_page);
        self.page = 1;
    }

    pub fn go_to(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn query(&self) -> DataQuery {
        DataQuery {
            page: self.page,
            per_page: self.per_page,
            loan_status: self.status_filter,
        }
    }
}

/// Sizes outside [`PAGE_SIZES`] fall back to the default
fn normalize_per_page(per_page: u32) -> u32 {
    if PAGE_SIZES.contains(&per_page) {
        per_page
    } else {
        DEFAULT_PER_PAGE
    }
}

/// What the explorer currently shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExplorerView {
    Loading,
    Loaded {
        rows: Vec<TableRow>,
        total_pages: u32,
        total_records: u64,
    },
    Failed { message: String },
}

impl ExplorerView {
    /// "Showing N of M records"
    pub fn showing(&self) -> Option<String> {
        match self {
            ExplorerView::Loaded {
                rows,
                total_records,
                ..
            } => Some(format!(
                "Showing {} of {} records",
                rows.len(),
                format::thousands(*total_records)
            )),
            _ => None,
        }
    }
}

/// Result of one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Committed,
    /// A newer request began while this one was in flight
    Discarded,
}

/// Explorer component: owns its query state, its view and its requests
pub struct Explorer<A: CreditRiskApi + ?Sized> {
    api: Arc<A>,
    state: RwLock<ExplorerState>,
    view: RwLock<(ExplorerState, ExplorerView)>,
    requests: RequestSequence,
}

impl<A: CreditRiskApi + ?Sized> Explorer<A> {
    pub fn new(api: Arc<A>, state: ExplorerState) -> Self {
        Self {
            api,
            state: RwLock::new(state),
            view: RwLock::new((state, ExplorerView::Loading)),
            requests: RequestSequence::new(),
        }
    }

    pub async fn state(&self) -> ExplorerState {
        *self.state.read().await
    }

    /// The committed view and the query state it reflects
    pub async fn view(&self) -> (ExplorerState, ExplorerView) {
        self.view.read().await.clone()
    }

    pub async fn set_filter(&self, status: Option<Code>) -> FetchOutcome {
        self.state.write().await.set_filter(status);
        self.refresh().await
    }

    pub async fn set_per_page(&self, per_page: u32) -> FetchOutcome {
        self.state.write().await.set_per_page(per_page);
        self.refresh().await
    }

    pub async fn go_to(&self, page: u32) -> FetchOutcome {
        self.state.write().await.go_to(page);
        self.refresh().await
    }

    /// Re-issue the current query
    pub async fn refresh(&self) -> FetchOutcome {
        let generation = self.requests.begin();
        let state = self.state().await;

        let result = self.api.data(&state.query()).await;

        if !self.requests.is_current(generation) {
            tracing::debug!(page = state.page, "Discarding stale data page");
            return FetchOutcome::Discarded;
        }

        let view = match result {
            Ok(page) => {
                let table = mappings::mappings();
                let pagination = page.pagination_or_default();
                ExplorerView::Loaded {
                    rows: page
                        .data
                        .iter()
                        .map(|record| TableRow::from_record(record, &table))
                        .collect(),
                    total_pages: pagination.total_pages,
                    total_records: pagination.total_records,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, page = state.page, "Error fetching data");
                ExplorerView::Failed {
                    message: LOAD_ERROR.to_string(),
                }
            }
        };

        *self.view.write().await = (state, view);
        FetchOutcome::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{record, FakeApi};
    use std::time::Duration;

    fn labels(items: &[PageItem]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| match item {
                PageItem::Page { number, .. } => Some(number.to_string()),
                PageItem::Ellipsis => Some("…".to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pagination_middle() {
        let items = pagination_items(5, 20);
        assert_eq!(labels(&items), ["1", "…", "3", "4", "5", "6", "7", "…", "20"]);
        assert!(items.contains(&PageItem::Page {
            number: 5,
            active: true
        }));
    }

    #[test]
    fn test_pagination_short() {
        let items = pagination_items(1, 3);
        assert_eq!(labels(&items), ["1", "2", "3"]);
        assert_eq!(
            items.first(),
            Some(&PageItem::Previous {
                target: 1,
                disabled: true
            })
        );
        assert_eq!(
            items.last(),
            Some(&PageItem::Next {
                target: 2,
                disabled: false
            })
        );
    }

    #[test]
    fn test_pagination_edges() {
        // Gap of exactly one page: shortcut without ellipsis
        assert_eq!(
            labels(&pagination_items(4, 20)),
            ["1", "2", "3", "4", "5", "6", "…", "20"]
        );
        assert_eq!(
            labels(&pagination_items(17, 20)),
            ["1", "…", "15", "16", "17", "18", "19", "20"]
        );

        let last = pagination_items(20, 20);
        assert_eq!(
            last.last(),
            Some(&PageItem::Next {
                target: 21,
                disabled: true
            })
        );
    }

    #[test]
    fn test_pagination_no_pages() {
        let items = pagination_items(1, 0);
        assert!(labels(&items).is_empty());
        assert!(matches!(items.last(), Some(PageItem::Next { disabled: true, .. })));
    }

    #[test]
    fn test_filter_and_size_reset_page() {
        let mut state = ExplorerState::default();
        state.go_to(7);
        state.set_filter(Some(1));
        assert_eq!(state.page, 1);

        state.go_to(3);
        state.set_per_page(50);
        assert_eq!(state.page, 1);
        assert_eq!(state.per_page, 50);

        state.set_per_page(33);
        assert_eq!(state.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_row_translation() {
        let table = Mappings::builtin();
        let row = TableRow::from_record(&record(7, 1), &table);
        assert_eq!(row.home_ownership, "RENT");
        assert_eq!(row.intent, "PERSONAL");
        assert_eq!(row.grade, "D");
        assert_eq!(row.status, "Default");
        assert!(row.is_default);
        assert_eq!(row.default_on_file, "Y");
        assert_eq!(row.income, "$59,000");
        assert_eq!(row.emp_length, "4 yrs");
        assert_eq!(row.int_rate, "16.02%");
    }

    #[test]
    fn test_row_unmapped_and_missing() {
        let table = Mappings::builtin();
        let mut loan = record(8, 0);
        loan.loan_grade = 42;
        loan.person_emp_length = None;
        loan.loan_int_rate = None;

        let row = TableRow::from_record(&loan, &table);
        assert_eq!(row.grade, "42");
        assert_eq!(row.emp_length, "-");
        assert_eq!(row.int_rate, "-");
        assert!(!row.is_default);
    }

    #[tokio::test]
    async fn test_refresh_loads_rows() {
        let explorer = Explorer::new(Arc::new(FakeApi::new()), ExplorerState::default());
        assert_eq!(explorer.refresh().await, FetchOutcome::Committed);

        let (state, view) = explorer.view().await;
        assert_eq!(state.page, 1);
        match &view {
            ExplorerView::Loaded {
                rows, total_pages, ..
            } => {
                assert_eq!(rows.len(), 2);
                assert_eq!(*total_pages, 20);
            }
            other => panic!("unexpected view {:?}", other),
        }
        assert_eq!(view.showing().unwrap(), "Showing 2 of 400 records");
    }

    #[tokio::test]
    async fn test_filter_change_refetches_first_page() {
        let api = Arc::new(FakeApi::new());
        let explorer = Explorer::new(api.clone(), ExplorerState::default());
        explorer.go_to(6).await;
        explorer.set_filter(Some(1)).await;

        let (state, view) = explorer.view().await;
        assert_eq!(state.page, 1);
        assert_eq!(state.status_filter, Some(1));
        match view {
            ExplorerView::Loaded { rows, .. } => {
                assert_eq!(rows[0].id, 101);
                assert_eq!(rows[0].status, "Default");
            }
            other => panic!("unexpected view {:?}", other),
        }
        assert_eq!(api.data_calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_response_discarded() {
        let api = Arc::new(FakeApi::new());
        api.delay_page(3, Duration::from_millis(150));
        let explorer = Explorer::new(api, ExplorerState::default());

        let (slow, fast) = tokio::join!(explorer.go_to(3), explorer.go_to(4));
        assert_eq!(slow, FetchOutcome::Discarded);
        assert_eq!(fast, FetchOutcome::Committed);

        let (state, view) = explorer.view().await;
        assert_eq!(state.page, 4);
        match view {
            ExplorerView::Loaded { rows, .. } => assert_eq!(rows[0].id, 401),
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_alert() {
        let explorer = Explorer::new(Arc::new(FakeApi::failing()), ExplorerState::default());
        explorer.refresh().await;
        let (_, view) = explorer.view().await;
        assert_eq!(
            view,
            ExplorerView::Failed {
                message: LOAD_ERROR.to_string()
            }
        );
        assert_eq!(view.showing(), None);
    }
}
