//! # Credit Risk Analytics
//!
//! Dashboard and client for a remote loan default-risk API: dataset
//! summaries, a paginated record explorer, four analytic charts and a
//! prediction form that scores loan applications.
//!
//! ## Modules
//!
//! - [`mappings`]: Code ↔ label tables for the categorical loan fields
//! - [`client`]: HTTP client for the remote scoring and data API
//! - [`charts`]: Chart renderers drawing onto a retained SVG surface
//! - [`dashboard`]: Summary, explorer, prediction and health components
//! - [`web`]: Server-rendered dashboard with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use credit_risk::client::{ApiClient, ClientConfig, CreditRiskApi, DataQuery};
//! use credit_risk::dashboard::SummaryMetrics;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(ClientConfig::default())?;
//!
//!     let summary = client.summary().await?;
//!     let metrics = SummaryMetrics::from_summary(&summary);
//!     println!("Default rate: {:.2}%", metrics.default_rate);
//!
//!     let page = client.data(&DataQuery::default()).await?;
//!     println!("Fetched {} records", page.data.len());
//!
//!     Ok(())
//! }
//! ```

pub mod charts;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod logging;
pub mod mappings;
pub mod web;

// Re-export top-level types for convenience
pub use mappings::{mappings, replace_mappings, CategoryTable, Code, Domain, MappingError, Mappings};

pub use client::{
    ApiClient, ClientConfig, ClientError, ClientResult, CreditRiskApi, DataPage, DataQuery,
    DataSummary, LoanRecord, PredictionRequest, PredictionResponse,
};

pub use charts::{ChartError, ChartKind, ChartRenderer, Surface};

pub use dashboard::{
    ApiStatus, ApplicationForm, Assessment, Explorer, ExplorerState, HealthMonitor, Phase,
    PredictionPanel, RiskTier, SummaryMetrics,
};

pub use config::{Config, ConfigError};

pub use web::{build_router, serve, AppState, WebError};
