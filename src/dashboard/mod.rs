//! Dashboard components
//!
//! Each component owns its own state and request lifecycle and talks to the
//! remote API only through [`CreditRiskApi`](crate::client::CreditRiskApi).

pub mod explorer;
pub mod health;
pub mod prediction;
pub mod request;
pub mod summary;

pub use explorer::{pagination_items, Explorer, ExplorerState, ExplorerView, PageItem, TableRow};
pub use health::{ApiStatus, HealthMonitor, HealthSnapshot};
pub use prediction::{ApplicationForm, Assessment, FormError, Phase, PredictionPanel, RiskTier};
pub use request::{Generation, RequestSequence};
pub use summary::SummaryMetrics;
