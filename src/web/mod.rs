//! Dashboard Web Server
//!
//! Server-rendered dashboard built with Axum. Pages fetch from the remote
//! API on every request and render failures as inline alerts.
//!
//! # Routes
//!
//! ## Pages
//! - `GET /` - Summary cards and charts
//! - `GET /analytics` - Credit risk analysis
//! - `GET /explorer` - Paginated loan records
//! - `GET /predict` - Application form
//! - `POST /predict` - Score an application
//!
//! ## Charts
//! - `GET /charts/:kind` - Standalone SVG
//!
//! ## Status
//! - `GET /status` - Remote API indicator state
//! - `GET /health/live` - Liveness probe
//!
//! # Example
//!
//! ```rust,ignore
//! use credit_risk::client::{ApiClient, CreditRiskApi};
//! use credit_risk::config::Config;
//! use credit_risk::dashboard::HealthMonitor;
//! use credit_risk::web::{serve, AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let api: Arc<dyn CreditRiskApi> = Arc::new(ApiClient::new(config.client_config())?);
//!     let monitor = HealthMonitor::spawn(Arc::clone(&api), config.dashboard.health_poll_interval());
//!
//!     let server = config.server.clone();
//!     serve(AppState::with_monitor(api, &monitor, config), &server).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod render;
pub mod routes;
pub mod state;

pub use error::{WebError, WebResult};
pub use state::AppState;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    let health_routes = Router::new().route("/live", get(routes::health::liveness));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::dashboard::index))
        .route("/analytics", get(routes::dashboard::analytics))
        .route("/explorer", get(routes::explorer::explorer))
        .route(
            "/predict",
            get(routes::predict::form).post(routes::predict::submit),
        )
        .route("/charts/:kind", get(routes::charts::chart_svg))
        .route("/status", get(routes::health::api_status))
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Any origin when none are configured, otherwise the configured list
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Start the dashboard server
pub async fn serve(state: AppState, config: &ServerConfig) -> WebResult<()> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Credit risk dashboard listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WebError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dashboard shut down gracefully");
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeApi;
    use crate::client::CreditRiskApi;
    use crate::config::Config;
    use crate::dashboard::explorer::LOAD_ERROR;
    use crate::dashboard::prediction::SUBMIT_ERROR;
    use crate::web::dto::StatusResponse;
    use crate::web::routes::dashboard::SUMMARY_ERROR;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::util::ServiceExt;

    fn create_test_app(api: FakeApi) -> Router {
        let api: Arc<dyn CreditRiskApi> = Arc::new(api);
        build_router(AppState::without_monitor(api, Config::default()))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(app: Router, uri: &str, form: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let response = get(create_test_app(FakeApi::failing()), "/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_before_first_check() {
        let response = get(create_test_app(FakeApi::new()), "/status").await;
        assert_eq!(response.status(), StatusCode::OK);

        let status: StatusResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(status.status, crate::dashboard::ApiStatus::Checking);
        assert!(status.checked_at.is_none());
        assert_eq!(status.checks, 0);
    }

    #[tokio::test]
    async fn test_dashboard_renders_summary_and_charts() {
        let response = get(create_test_app(FakeApi::new()), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("32,581"));
        assert!(html.contains("25,473"));
        assert!(html.contains("7,108"));
        assert!(html.contains("21.82%"));
        for slug in ["loan-distribution", "default-rate", "loan-grade", "correlation"] {
            assert!(html.contains(&format!(r#"data-chart="{}""#, slug)), "missing {}", slug);
        }
        assert!(html.contains("bg-warning"));
    }

    #[tokio::test]
    async fn test_dashboard_alert_when_api_fails() {
        let response = get(create_test_app(FakeApi::failing()), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains(SUMMARY_ERROR));
        assert!(!html.contains("data-chart="));
    }

    #[tokio::test]
    async fn test_analytics() {
        let html = body_text(get(create_test_app(FakeApi::failing()), "/analytics").await).await;
        assert!(html.contains("Credit Risk Analysis"));
        assert!(html.contains(r#"data-chart="loan-grade""#));
        assert!(!html.contains(r#"data-chart="loan-distribution""#));
    }

    #[tokio::test]
    async fn test_explorer_page() {
        let response = get(
            create_test_app(FakeApi::new()),
            "/explorer?page=2&per_page=10&loan_status=1",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("<td>201</td>"));
        assert!(html.contains("<td>202</td>"));
        assert!(html.contains(r#"<span class="badge bg-danger">Default</span>"#));
        assert!(html.contains("Showing 2 of 400 records"));
        assert!(html.contains(r#"<option value="10" selected>10</option>"#));
        assert!(html.contains("page=3&amp;per_page=10&amp;loan_status=1"));
    }

    #[tokio::test]
    async fn test_explorer_defaults() {
        let html = body_text(get(create_test_app(FakeApi::new()), "/explorer").await).await;
        assert!(html.contains("<td>101</td>"));
        assert!(html.contains(r#"<option value="20" selected>20</option>"#));
        assert!(html.contains(r#"<option value="">All</option>"#));
    }

    #[tokio::test]
    async fn test_explorer_reports_ignored_parameters() {
        let response = get(
            create_test_app(FakeApi::new()),
            "/explorer?page=abc&per_page=10&loan_status=bogus",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("alert-warning"));
        assert!(html.contains("Invalid page number: abc"));
        assert!(html.contains("Unknown loan status &quot;bogus&quot;; showing all records"));
        assert!(html.contains("<td>101</td>"));
        assert!(html.contains(r#"<option value="10" selected>10</option>"#));
        assert!(html.contains(r#"<option value="">All</option>"#));
    }

    #[tokio::test]
    async fn test_explorer_valid_query_has_no_warnings() {
        let html = body_text(get(create_test_app(FakeApi::new()), "/explorer?page=1").await).await;
        assert!(!html.contains("alert-warning"));
    }

    #[tokio::test]
    async fn test_explorer_alert_when_api_fails() {
        let html = body_text(get(create_test_app(FakeApi::failing()), "/explorer").await).await;
        assert!(html.contains(LOAD_ERROR));
        assert!(!html.contains("<tbody>"));
    }

    #[tokio::test]
    async fn test_predict_form_defaults() {
        let html = body_text(get(create_test_app(FakeApi::new()), "/predict").await).await;
        assert!(html.contains(r#"name="person_income" value="85000""#));
        assert!(html.contains(r#"value="0.176""#));
        assert!(html.contains(r#"value="5.67""#));
        assert!(html.contains("Complete the form"));
    }

    #[tokio::test]
    async fn test_predict_form_live_ratios_and_busy_state() {
        let html = body_text(get(create_test_app(FakeApi::new()), "/predict").await).await;
        assert!(html.contains(r#"<form id="prediction-form""#));
        assert!(html.contains(r#"income.addEventListener("input", recompute)"#));
        assert!(html.contains(r#"amount.addEventListener("input", recompute)"#));
        assert!(html.contains("ratio(amount, income, 3)"));
        assert!(html.contains("ratio(income, amount, 2)"));
        assert!(html.contains(r#"form.addEventListener("submit""#));
        assert!(html.contains("button.disabled = true"));
        assert!(html.contains(r#"id="predict-spinner" class="spinner-border"#));
        assert!(html.contains(r#"id="predict-submit" class="btn btn-primary">"#));
    }

    #[tokio::test]
    async fn test_predict_high_risk() {
        let response = post_form(
            create_test_app(FakeApi::new()),
            "/predict",
            "person_age=40&loan_grade=E&loan_amnt=20000",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("High Risk"));
        assert!(html.contains("75.00%"));
        assert!(html.contains("Caution is advised."));
        assert!(html.contains("xgboost"));
        assert!(html.contains(r#"name="person_age" value="40""#));
    }

    #[tokio::test]
    async fn test_predict_low_risk() {
        let app = create_test_app(FakeApi::new());
        let html = body_text(post_form(app, "/predict", "loan_grade=0").await).await;
        assert!(html.contains("Low Risk"));
        assert!(html.contains("Recommended for approval."));
        assert!(html.contains("Accuracy:</strong> 0.9312"));
    }

    #[tokio::test]
    async fn test_predict_alert_when_api_fails() {
        let app = create_test_app(FakeApi::failing());
        let html = body_text(post_form(app, "/predict", "person_age=30").await).await;
        assert!(html.contains(SUBMIT_ERROR));
        assert!(!html.contains("Risk Assessment"));
    }

    #[tokio::test]
    async fn test_predict_rejects_bad_input() {
        let app = create_test_app(FakeApi::new());
        let html = body_text(post_form(app, "/predict", "person_age=abc").await).await;
        assert!(html.contains("alert-danger"));
        assert!(!html.contains("Risk Assessment"));

        let app = create_test_app(FakeApi::new());
        let html = body_text(post_form(app, "/predict", "person_age=12").await).await;
        assert!(html.contains("alert-danger"));
        assert!(!html.contains("Risk Assessment"));
    }

    #[tokio::test]
    async fn test_predict_reset() {
        let app = create_test_app(FakeApi::new());
        let html = body_text(post_form(app, "/predict", "person_age=50&action=reset").await).await;
        assert!(html.contains(r#"name="person_age" value="35""#));
        assert!(!html.contains("Risk Assessment"));
    }

    #[tokio::test]
    async fn test_chart_svg() {
        let response = get(create_test_app(FakeApi::new()), "/charts/grade").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );

        let svg = body_text(response).await;
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[tokio::test]
    async fn test_chart_hover_renders_tooltip() {
        let app = create_test_app(FakeApi::new());
        let svg = body_text(get(app, "/charts/loan-grade?hover=0").await).await;
        assert!(svg.contains("tooltip"));
        assert!(svg.contains("Grade A"));

        let response = get(create_test_app(FakeApi::new()), "/charts/loan-grade?hover=999").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_chart() {
        let response = get(create_test_app(FakeApi::new()), "/charts/pie").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
