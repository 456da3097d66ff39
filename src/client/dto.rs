//! Data Transfer Objects
//!
//! Request and response types for the remote credit risk API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::client::error::{ClientError, ClientResult};
use crate::mappings::Code;

// ============================================
// SUMMARY DTOs
// ============================================

/// Dataset summary returned by `GET /data/summary`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DataSummary {
    #[serde(default)]
    pub total_records: u64,
    /// Status code (as a JSON object key) to record count
    #[serde(default)]
    pub loan_status_distribution: BTreeMap<String, u64>,
}

impl DataSummary {
    /// Count for a status code, 0 when absent
    pub fn status_count(&self, code: Code) -> u64 {
        self.loan_status_distribution
            .get(&code.to_string())
            .copied()
            .unwrap_or(0)
    }
}

/// The summary endpoint answers either bare or inside a `data` envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SummaryEnvelope {
    Wrapped { data: DataSummary },
    Bare(DataSummary),
}

impl SummaryEnvelope {
    pub(crate) fn into_summary(self) -> DataSummary {
        match self {
            SummaryEnvelope::Wrapped { data } => data,
            SummaryEnvelope::Bare(summary) => summary,
        }
    }
}

// ============================================
// DATA PAGE DTOs
// ============================================

/// Query for one page of loan records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataQuery {
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    /// Optional loan status filter
    pub loan_status: Option<Code>,
}

impl Default for DataQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
            loan_status: None,
        }
    }
}

impl DataQuery {
    /// Query string pairs; absent filters are omitted
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(status) = self.loan_status {
            params.push(("loan_status", status.to_string()));
        }
        params
    }
}

/// A single loan record as served by `GET /data`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoanRecord {
    pub id: i64,
    pub person_age: f64,
    pub person_income: f64,
    pub person_home_ownership: Code,
    /// Missing for some records in the source dataset
    #[serde(default)]
    pub person_emp_length: Option<f64>,
    pub loan_intent: Code,
    pub loan_grade: Code,
    pub loan_amnt: f64,
    #[serde(default)]
    pub loan_int_rate: Option<f64>,
    pub loan_status: Code,
    pub cb_person_default_on_file: Code,
}

/// Pagination block of a data page
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct PaginationInfo {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_records: u64,
}

/// Response of `GET /data`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DataPage {
    #[serde(default)]
    pub data: Vec<LoanRecord>,
    #[serde(default)]
    pub pagination: Option<PaginationInfo>,
}

impl DataPage {
    /// Pagination info, zeroed when the API omitted it
    pub fn pagination_or_default(&self) -> PaginationInfo {
        self.pagination.unwrap_or_default()
    }
}

// ============================================
// PREDICTION DTOs
// ============================================

/// Body of `POST /ml/predict`: 11 applicant fields plus 2 derived ratios
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionRequest {
    pub person_age: u32,
    pub person_income: f64,
    pub person_home_ownership: Code,
    pub person_emp_length: f64,
    pub loan_intent: Code,
    pub loan_grade: Code,
    pub loan_amnt: f64,
    pub loan_int_rate: f64,
    pub loan_percent_income: f64,
    pub cb_person_default_on_file: Code,
    pub cb_person_cred_hist_length: u32,
    pub debt_to_income: f64,
    pub income_to_loan_ratio: f64,
}

/// Model metadata attached to a prediction
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// JSON-encoded metrics object
    #[serde(default)]
    pub metrics: Option<String>,
}

/// Evaluation metrics decoded from `ModelInfo::metrics`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ModelInfo {
    /// Decode the metrics string; `None` when absent or not valid JSON
    pub fn parsed_metrics(&self) -> Option<ModelMetrics> {
        let raw = self.metrics.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                tracing::warn!(error = %e, "Model metrics are not valid JSON");
                None
            }
        }
    }
}

/// Response of `POST /ml/predict`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionResponse {
    pub prediction: Vec<u8>,
    pub probability: Vec<Vec<f64>>,
    #[serde(default)]
    pub model_info: ModelInfo,
}

impl PredictionResponse {
    /// Predicted class of the first row
    pub fn predicted_class(&self) -> ClientResult<usize> {
        let class = self
            .prediction
            .first()
            .copied()
            .ok_or_else(|| ClientError::Malformed("empty prediction array".to_string()))?;

        let row = self.first_row()?;
        let class = class as usize;
        if class >= row.len() {
            return Err(ClientError::Malformed(format!(
                "predicted class {} has no probability",
                class
            )));
        }
        Ok(class)
    }

    /// Probability of the default class (index 1) for the first row
    pub fn default_probability(&self) -> ClientResult<f64> {
        let row = self.first_row()?;
        row.get(1).copied().ok_or_else(|| {
            ClientError::Malformed("probability row has no default class".to_string())
        })
    }

    /// Probability assigned to the predicted class
    pub fn confidence(&self) -> ClientResult<f64> {
        let class = self.predicted_class()?;
        Ok(self.first_row()?[class])
    }

    fn first_row(&self) -> ClientResult<&[f64]> {
        self.probability
            .first()
            .map(Vec::as_slice)
            .ok_or_else(|| ClientError::Malformed("empty probability array".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_accepts_both_shapes() {
        let bare: SummaryEnvelope = serde_json::from_str(
            r#"{"total_records": 100, "loan_status_distribution": {"0": 80, "1": 20}}"#,
        )
        .unwrap();
        let wrapped: SummaryEnvelope = serde_json::from_str(
            r#"{"data": {"total_records": 100, "loan_status_distribution": {"0": 80, "1": 20}}}"#,
        )
        .unwrap();

        let bare = bare.into_summary();
        assert_eq!(bare, wrapped.into_summary());
        assert_eq!(bare.status_count(1), 20);
        assert_eq!(bare.status_count(7), 0);
    }

    #[test]
    fn test_data_page_missing_pagination() {
        let page: DataPage = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_eq!(page.pagination_or_default(), PaginationInfo::default());
    }

    #[test]
    fn test_loan_record_nullable_fields() {
        let record: LoanRecord = serde_json::from_str(
            r#"{"id": 7, "person_age": 22, "person_income": 59000, "person_home_ownership": 2,
                "person_emp_length": null, "loan_intent": 3, "loan_grade": 3,
                "loan_amnt": 35000, "loan_int_rate": 16.02, "loan_status": 1,
                "cb_person_default_on_file": 1}"#,
        )
        .unwrap();
        assert_eq!(record.person_emp_length, None);
        assert_eq!(record.loan_int_rate, Some(16.02));
    }

    #[test]
    fn test_query_params_omit_empty_filter() {
        let query = DataQuery {
            page: 2,
            per_page: 20,
            loan_status: None,
        };
        assert_eq!(query.params().len(), 2);

        let query = DataQuery {
            loan_status: Some(1),
            ..query
        };
        assert!(query.params().contains(&("loan_status", "1".to_string())));
    }

    #[test]
    fn test_prediction_accessors() {
        let response = PredictionResponse {
            prediction: vec![0],
            probability: vec![vec![0.82, 0.18]],
            model_info: ModelInfo {
                name: "xgboost".to_string(),
                version: "1.0".to_string(),
                metrics: Some(
                    r#"{"accuracy": 0.93, "precision": 0.9, "recall": 0.72, "f1": 0.8}"#
                        .to_string(),
                ),
            },
        };
        assert_eq!(response.predicted_class().unwrap(), 0);
        assert!((response.confidence().unwrap() - 0.82).abs() < 1e-9);
        assert!((response.default_probability().unwrap() - 0.18).abs() < 1e-9);
        assert_eq!(response.model_info.parsed_metrics().unwrap().recall, 0.72);
    }

    #[test]
    fn test_prediction_contract_violations() {
        let response = PredictionResponse {
            prediction: vec![],
            probability: vec![vec![0.5, 0.5]],
            model_info: ModelInfo::default(),
        };
        assert!(matches!(
            response.predicted_class(),
            Err(ClientError::Malformed(_))
        ));

        let response = PredictionResponse {
            prediction: vec![3],
            probability: vec![vec![0.5, 0.5]],
            model_info: ModelInfo {
                metrics: Some("not json".to_string()),
                ..ModelInfo::default()
            },
        };
        assert!(response.confidence().is_err());
        assert!(response.model_info.parsed_metrics().is_none());
    }
}
