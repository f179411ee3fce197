//! Transaction routes - pagination and approval edits

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use txnreview_core::{DashboardView, TransactionView};

use crate::{ApiError, ApiResult, AppState};

/// Body of an approval edit
#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub value: bool,
}

/// Append the next page of the global feed
pub async fn api_load_more(State(state): State<AppState>) -> ApiResult<Json<DashboardView>> {
    state.view.load_more().await?;
    Ok(Json(state.view.snapshot()))
}

/// Set the approval of a visible transaction.
///
/// The override is visible to concurrent readers before the remote call
/// completes and is rolled back if it fails.
pub async fn api_set_approval(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> ApiResult<Json<TransactionView>> {
    let transaction = state
        .view
        .transaction(&transaction_id)
        .ok_or_else(|| ApiError::NotFound {
            resource: format!("transaction {} in the current view", transaction_id),
        })?;

    state.approvals.set_approval(&transaction, request.value).await?;

    Ok(Json(TransactionView::new(transaction, &state.view.approvals())))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{app, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_more_until_last_page() {
        let (router, _) = app();
        send(&router, "GET", "/api/dashboard", None).await;

        let (status, body) = send(&router, "POST", "/api/transactions/more", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactions"].as_array().map(|t| t.len()), Some(3));
        assert_eq!(body["isLastPage"], true);
        assert_eq!(body["canLoadMore"], false);

        let (status, body) = send(&router, "POST", "/api/transactions/more", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactions"].as_array().map(|t| t.len()), Some(3));
    }

    #[tokio::test]
    async fn test_load_more_conflicts_in_employee_mode() {
        let (router, _) = app();
        send(&router, "POST", "/api/view/employees/e2", None).await;

        let (status, body) = send(&router, "POST", "/api/transactions/more", None).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_MODE_TRANSITION");
    }

    #[tokio::test]
    async fn test_approval_persists_across_modes() {
        let (router, _) = app();
        send(&router, "GET", "/api/dashboard", None).await;

        let (status, body) = send(
            &router,
            "PUT",
            "/api/transactions/t1/approval",
            Some(json!({ "value": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "t1");
        assert_eq!(body["approved"], true);
        assert_eq!(body["isPending"], false);

        let (_, body) = send(&router, "POST", "/api/view/employees/e1", None).await;
        assert_eq!(body["transactions"][0]["id"], "t1");
        assert_eq!(body["transactions"][0]["approved"], true);
    }

    #[tokio::test]
    async fn test_approval_for_hidden_transaction_is_not_found() {
        let (router, _) = app();
        send(&router, "POST", "/api/view/employees/e2", None).await;

        let (status, body) = send(
            &router,
            "PUT",
            "/api/transactions/t1/approval",
            Some(json!({ "value": true })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
