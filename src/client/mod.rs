//! Credit Risk API Client
//!
//! HTTP client for the remote scoring and data API.
//!
//! # Endpoints
//!
//! - `GET /health` - Liveness signal
//! - `GET /data/summary` - Record counts by loan status
//! - `GET /data?page&per_page&loan_status` - One page of loan records
//! - `POST /ml/predict` - Default-risk prediction for an application
//!
//! Components depend on the [`CreditRiskApi`] trait rather than on
//! [`ApiClient`] directly, so pages and tests can supply their own backend.

pub mod dto;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use dto::{
    DataPage, DataQuery, DataSummary, LoanRecord, ModelInfo, ModelMetrics, PaginationInfo,
    PredictionRequest, PredictionResponse,
};
pub use error::{ClientError, ClientResult};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use dto::SummaryEnvelope;

/// Default remote API base URL
pub const DEFAULT_API_BASE: &str = "https://risk-predictions.appsprojectbook.com/api";

/// Operations the dashboard needs from the remote API
#[async_trait]
pub trait CreditRiskApi: Send + Sync {
    /// Liveness check; `Ok` means the API answered with a 2xx status
    async fn health(&self) -> ClientResult<()>;

    /// Dataset summary
    async fn summary(&self) -> ClientResult<DataSummary>;

    /// One page of loan records
    async fn data(&self, query: &DataQuery) -> ClientResult<DataPage>;

    /// Score a loan application
    async fn predict(&self, request: &PredictionRequest) -> ClientResult<PredictionResponse>;
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Base URL without a trailing slash
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// reqwest-backed implementation of [`CreditRiskApi`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base(), path)
    }

    /// Turn a response into `T`, mapping non-2xx statuses to errors
    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(ClientError::from_transport)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CreditRiskApi for ApiClient {
    async fn health(&self) -> ClientResult<()> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                status: response.status().as_u16(),
                message: "API is not healthy".to_string(),
            })
        }
    }

    async fn summary(&self) -> ClientResult<DataSummary> {
        let response = self
            .client
            .get(self.url("/data/summary"))
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let envelope: SummaryEnvelope = Self::decode(response).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch data summary");
            e
        })?;
        Ok(envelope.into_summary())
    }

    async fn data(&self, query: &DataQuery) -> ClientResult<DataPage> {
        let response = self
            .client
            .get(self.url("/data"))
            .query(&query.params())
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let page: DataPage = Self::decode(response).await.map_err(|e| {
            tracing::error!(error = %e, page = query.page, "Failed to fetch loan data");
            e
        })?;

        if page.pagination.is_none() {
            tracing::warn!(page = query.page, "Data response has no pagination block");
        }
        Ok(page)
    }

    async fn predict(&self, request: &PredictionRequest) -> ClientResult<PredictionResponse> {
        let response = self
            .client
            .post(self.url("/ml/predict"))
            .json(request)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let prediction: PredictionResponse = Self::decode(response).await.map_err(|e| {
            tracing::error!(error = %e, "Prediction request failed");
            e
        })?;

        // Reject responses whose class index does not address a probability
        prediction.predicted_class()?;
        Ok(prediction)
    }
}
