//! In-memory [`CreditRiskApi`] used by component and route tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{
    ClientError, ClientResult, CreditRiskApi, DataPage, DataQuery, DataSummary, LoanRecord,
    ModelInfo, PaginationInfo, PredictionRequest, PredictionResponse,
};

pub(crate) const TOTAL_PAGES: u32 = 20;

pub(crate) struct FakeApi {
    pub(crate) healthy: AtomicBool,
    pub(crate) failing: AtomicBool,
    pub(crate) health_calls: AtomicUsize,
    pub(crate) data_calls: AtomicUsize,
    /// Pages whose response is delayed
    pub(crate) slow_pages: Mutex<BTreeMap<u32, Duration>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            health_calls: AtomicUsize::new(0),
            data_calls: AtomicUsize::new(0),
            slow_pages: Mutex::new(BTreeMap::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        let api = Self::new();
        api.healthy.store(false, Ordering::SeqCst);
        api.failing.store(true, Ordering::SeqCst);
        api
    }

    pub(crate) fn delay_page(&self, page: u32, delay: Duration) {
        self.slow_pages.lock().unwrap().insert(page, delay);
    }

    fn check_failing(&self) -> ClientResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ClientError::Unavailable)
        } else {
            Ok(())
        }
    }
}

pub(crate) fn record(id: i64, loan_status: i64) -> LoanRecord {
    LoanRecord {
        id,
        person_age: 22.0,
        person_income: 59000.0,
        person_home_ownership: 2,
        person_emp_length: Some(4.0),
        loan_intent: 3,
        loan_grade: 3,
        loan_amnt: 35000.0,
        loan_int_rate: Some(16.02),
        loan_status,
        cb_person_default_on_file: 1,
    }
}

#[async_trait]
impl CreditRiskApi for FakeApi {
    async fn health(&self) -> ClientResult<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ClientError::Unavailable)
        }
    }

    async fn summary(&self) -> ClientResult<DataSummary> {
        self.check_failing()?;
        Ok(DataSummary {
            total_records: 32581,
            loan_status_distribution: [("0".to_string(), 25473), ("1".to_string(), 7108)]
                .into_iter()
                .collect(),
        })
    }

    async fn data(&self, query: &DataQuery) -> ClientResult<DataPage> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.slow_pages.lock().unwrap().get(&query.page).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failing()?;

        let status = query.loan_status.unwrap_or(0);
        let base = query.page as i64 * 100;
        Ok(DataPage {
            data: vec![record(base + 1, status), record(base + 2, status)],
            pagination: Some(PaginationInfo {
                total_pages: TOTAL_PAGES,
                total_records: 400,
            }),
        })
    }

    async fn predict(&self, request: &PredictionRequest) -> ClientResult<PredictionResponse> {
        self.check_failing()?;
        let p_default = if request.loan_grade >= 4 { 0.75 } else { 0.10 };
        Ok(PredictionResponse {
            prediction: vec![u8::from(p_default >= 0.5)],
            probability: vec![vec![1.0 - p_default, p_default]],
            model_info: ModelInfo {
                name: "xgboost".to_string(),
                version: "1.2.0".to_string(),
                metrics: Some(
                    r#"{"accuracy": 0.9312, "precision": 0.9051, "recall": 0.7213, "f1": 0.8028}"#
                        .to_string(),
                ),
            },
        })
    }
}
