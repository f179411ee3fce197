//! JSON API over the dashboard view coordinator
//!
//! Routes are organized into modules:
//! - routes::dashboard: composed view, employee picker, mode transitions
//! - routes::transactions: pagination and approval edits

pub mod error;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    routing::{get, post, put},
    Router,
};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use txnreview_config::Config;
use txnreview_core::{ApprovalMutation, ApprovalOverrideStore, RequestExecutor, ServiceRef, ViewCoordinator};

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub view: Arc<ViewCoordinator>,
    pub approvals: Arc<ApprovalMutation>,
    pub config: Config,
}

impl AppState {
    /// Wire the executor, override store and coordinator around `service`
    pub fn new(config: Config, service: ServiceRef) -> Self {
        let executor = Arc::new(RequestExecutor::new(service));
        let overrides = Arc::new(ApprovalOverrideStore::new());
        let view = Arc::new(ViewCoordinator::new(executor.clone(), overrides.clone(), &config.cache));
        let approvals = Arc::new(ApprovalMutation::new(executor, overrides));
        Self {
            view,
            approvals,
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::dashboard::{api_clear_cache, api_dashboard, api_employees, api_select_all, api_select_employee};
    use routes::transactions::{api_load_more, api_set_approval};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/dashboard", get(api_dashboard))
        .route("/api/employees", get(api_employees))
        .route("/api/view/all", post(api_select_all))
        .route("/api/view/employees/:id", post(api_select_employee))
        .route("/api/transactions/more", post(api_load_more))
        .route("/api/transactions/:id/approval", put(api_set_approval))
        .route("/api/cache/clear", post(api_clear_cache))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(target: "txnreview::api", "serving dashboard API on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!(target: "txnreview::api", "failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!(target: "txnreview::api", "shutting down");
}
