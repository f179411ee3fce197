//! Router fixtures for handler tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;
use txnreview_backend::FixtureDataService;
use txnreview_config::Config;

use crate::{create_router, AppState};

const FIXTURE: &str = r#"{
    "employees": [
        { "id": "e1", "firstName": "Ada", "lastName": "Lovelace" },
        { "id": "e2", "firstName": "Grace", "lastName": "Hopper" }
    ],
    "transactions": [
        { "id": "t1", "merchant": "Cafe", "amount": 4.5, "date": "2024-01-02",
          "employee": { "id": "e1", "firstName": "Ada", "lastName": "Lovelace" }, "approved": false },
        { "id": "t2", "merchant": "Books", "amount": 20.0, "date": "2024-01-03",
          "employee": { "id": "e2", "firstName": "Grace", "lastName": "Hopper" }, "approved": true },
        { "id": "t3", "merchant": "Taxi", "amount": 31.25, "date": "2024-01-04",
          "employee": { "id": "e1", "firstName": "Ada", "lastName": "Lovelace" }, "approved": false }
    ]
}"#;

/// Router over the fixture with two transactions per page
pub(crate) fn app() -> (Router, AppState) {
    let mut config = Config::default();
    config.backend.page_size = 2;
    let service = FixtureDataService::from_json(FIXTURE, &config.backend).unwrap();
    let state = AppState::new(config, Arc::new(service));
    (create_router(state.clone()), state)
}

pub(crate) async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
