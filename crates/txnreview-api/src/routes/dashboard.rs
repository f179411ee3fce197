//! Dashboard routes - composed view and mode transitions
//!
//! Endpoints:
//! - api_dashboard: current view, bootstrapping on first use
//! - api_employees: picker items ("All" sentinel first)
//! - api_select_all: switch to the global feed
//! - api_select_employee: switch to one employee's history
//! - api_clear_cache: drop memoized remote results, optionally per operation

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use txnreview_core::{DashboardView, Employee};

use crate::{ApiResult, AppState};

/// Get the composed dashboard view (JSON API)
pub async fn api_dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardView>> {
    state.view.ensure_bootstrapped().await?;
    Ok(Json(state.view.snapshot()))
}

/// Get employee picker items (JSON API)
pub async fn api_employees(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.view.employee_options())
}

/// Show all transactions
pub async fn api_select_all(State(state): State<AppState>) -> ApiResult<Json<DashboardView>> {
    state.view.select_all().await?;
    Ok(Json(state.view.snapshot()))
}

/// Show one employee's transactions; the "All" sentinel id selects everything
pub async fn api_select_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<DashboardView>> {
    state.view.select(employee_id.trim()).await?;
    Ok(Json(state.view.snapshot()))
}

/// Query parameters for cache clearing
#[derive(Debug, Deserialize)]
pub struct ClearCacheQuery {
    /// Only drop results of this remote operation
    pub operation: Option<String>,
}

/// Drop memoized remote results so the next fetches hit the service
pub async fn api_clear_cache(
    State(state): State<AppState>,
    Query(query): Query<ClearCacheQuery>,
) -> Json<serde_json::Value> {
    let executor = state.view.executor();
    match query.operation.as_deref() {
        Some(operation) => executor.clear_cache_for(operation),
        None => executor.clear_cache(),
    }
    Json(serde_json::json!({ "success": true, "remaining": executor.cached_entries() }))
}
