//! Credit Risk Dashboard Server
//!
//! Run with: cargo run --bin credit-risk
//!
//! # Configuration
//!
//! Settings come from the first config file found among
//! `~/.config/credit-risk/config.toml`, `/etc/credit-risk/config.toml` and
//! `./config.toml`, then environment variables:
//! - `CREDIT_RISK_API_URL`: Remote API base URL
//! - `CREDIT_RISK_HOST` / `CREDIT_RISK_PORT`: Bind address (default: 0.0.0.0:8084)
//! - `CREDIT_RISK_HEALTH_POLL_SECS`: Health polling interval (default: 30)
//! - `CREDIT_RISK_LOG_LEVEL` / `CREDIT_RISK_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the configured log filter

use anyhow::Context;
use credit_risk::client::{ApiClient, CreditRiskApi};
use credit_risk::config::Config;
use credit_risk::dashboard::HealthMonitor;
use credit_risk::logging::init_logging;
use credit_risk::web::{serve, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_logging(&config.logging).context("initializing logging")?;

    tracing::info!("Starting credit risk dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Remote API: {}", config.api.base_url);

    config
        .install_mappings()
        .context("installing category mappings")?;

    let client = ApiClient::new(config.client_config()).context("building API client")?;
    let api: Arc<dyn CreditRiskApi> = Arc::new(client);

    // Polling stops when the monitor drops at the end of main
    let monitor = HealthMonitor::spawn(Arc::clone(&api), config.dashboard.health_poll_interval());

    let server = config.server.clone();
    tracing::info!("Starting server on {}", server.addr());
    serve(AppState::with_monitor(api, &monitor, config), &server).await?;

    drop(monitor);
    tracing::info!("Credit risk dashboard stopped");

    Ok(())
}
