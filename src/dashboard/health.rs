//! API health monitor
//!
//! Polls the remote health endpoint on a fixed interval and publishes the
//! result through a watch channel. Polling belongs to the [`HealthMonitor`]
//! handle: dropping the handle aborts the task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::CreditRiskApi;

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Indicator state of the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    /// No check has completed yet
    Checking,
    Online,
    Offline,
}

impl ApiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiStatus::Checking => "checking",
            ApiStatus::Online => "online",
            ApiStatus::Offline => "offline",
        }
    }

    /// Bootstrap contextual colour for the status badge
    pub fn variant(&self) -> &'static str {
        match self {
            ApiStatus::Checking => "warning",
            ApiStatus::Online => "success",
            ApiStatus::Offline => "danger",
        }
    }
}

/// Result of the latest health check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub status: ApiStatus,
    pub checked_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    /// Completed checks since the monitor started
    pub checks: u64,
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self {
            status: ApiStatus::Checking,
            checked_at: None,
            error: None,
            checks: 0,
        }
    }
}

/// Run one health check
pub async fn check_once(api: &dyn CreditRiskApi) -> HealthSnapshot {
    let (status, error) = match api.health().await {
        Ok(()) => (ApiStatus::Online, None),
        Err(e) => {
            tracing::warn!(error = %e, "API health check failed");
            (ApiStatus::Offline, Some(e.to_string()))
        }
    };

    HealthSnapshot {
        status,
        checked_at: Some(Utc::now()),
        error,
        checks: 1,
    }
}

/// Owner of the background polling task
pub struct HealthMonitor {
    rx: watch::Receiver<HealthSnapshot>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// Check immediately, then every `interval`
    pub fn spawn(api: Arc<dyn CreditRiskApi>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(HealthSnapshot::default());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut checks = 0u64;

            loop {
                ticker.tick().await;
                let mut snapshot = check_once(api.as_ref()).await;
                checks += 1;
                snapshot.checks = checks;

                let previous = tx.borrow().status;
                if previous != snapshot.status {
                    tracing::info!(
                        from = previous.as_str(),
                        to = snapshot.status.as_str(),
                        "API status changed"
                    );
                }
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(interval_secs = interval.as_secs(), "Health monitor started");
        Self { rx, task }
    }

    pub fn status(&self) -> ApiStatus {
        self.rx.borrow().status
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        self.rx.borrow().clone()
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<HealthSnapshot> {
        self.rx.clone()
    }

    /// True while the polling task is alive
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
