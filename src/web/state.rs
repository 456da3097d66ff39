//! Application State
//!
//! Shared state accessible by all page handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::client::CreditRiskApi;
use crate::config::Config;
use crate::dashboard::{ApiStatus, HealthMonitor, HealthSnapshot};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Remote scoring API
    pub api: Arc<dyn CreditRiskApi>,
    /// Latest published health check
    pub health: watch::Receiver<HealthSnapshot>,
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        api: Arc<dyn CreditRiskApi>,
        health: watch::Receiver<HealthSnapshot>,
        config: Config,
    ) -> Self {
        Self {
            api,
            health,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// State that follows a running monitor
    pub fn with_monitor(
        api: Arc<dyn CreditRiskApi>,
        monitor: &HealthMonitor,
        config: Config,
    ) -> Self {
        Self::new(api, monitor.subscribe(), config)
    }

    /// State whose health stays at `Checking`, for tools that never poll
    pub fn without_monitor(api: Arc<dyn CreditRiskApi>, config: Config) -> Self {
        let (_tx, rx) = watch::channel(HealthSnapshot::default());
        Self::new(api, rx, config)
    }

    pub fn health_snapshot(&self) -> HealthSnapshot {
        self.health.borrow().clone()
    }

    pub fn api_status(&self) -> ApiStatus {
        self.health.borrow().status
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
