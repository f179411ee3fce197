//! Memoizing request runner in front of the remote data service

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{CoreError, CoreResult, ServiceError};
use crate::lock;
use crate::service::ServiceRef;

/// Per-call options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Always hit the service and overwrite any cached entry
    pub bypass_cache: bool,
}

impl RequestOptions {
    pub fn cached() -> Self {
        Self { bypass_cache: false }
    }

    pub fn bypass() -> Self {
        Self { bypass_cache: true }
    }
}

/// Runs remote calls, memoizing results by `(operation, params)`.
///
/// Calls under different keys may run concurrently. Failures are never
/// retried here.
pub struct RequestExecutor {
    service: ServiceRef,
    cache: RwLock<HashMap<String, serde_json::Value>>,
    in_flight: AtomicUsize,
}

/// Decrements the outstanding-call counter even if the call future is dropped.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RequestExecutor {
    pub fn new(service: ServiceRef) -> Self {
        Self {
            service,
            cache: RwLock::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Execute `operation` with `params`, serving from cache unless bypassed
    pub async fn execute<Req, Res>(
        &self,
        operation: &str,
        params: &Req,
        options: RequestOptions,
    ) -> CoreResult<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let params = serde_json::to_value(params)
            .map_err(|e| CoreError::request_failed(operation, ServiceError::Decode(e)))?;
        let key = cache_key(operation, &params);

        if !options.bypass_cache {
            let hit = lock::read(&self.cache).get(&key).cloned();
            if let Some(value) = hit {
                debug!(target: "txnreview::executor", "cache hit for {}", key);
                return decode(operation, value);
            }
        }

        let response = {
            let _guard = InFlightGuard::enter(&self.in_flight);
            self.service.call(operation, params).await
        }
        .map_err(|cause| CoreError::request_failed(operation, cause))?;

        let result = decode(operation, response.clone())?;
        lock::write(&self.cache).insert(key, response);
        Ok(result)
    }

    /// True while at least one remote call is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Drop every memoized result
    pub fn clear_cache(&self) {
        lock::write(&self.cache).clear();
    }

    /// Drop memoized results of one operation
    pub fn clear_cache_for(&self, operation: &str) {
        let prefix = format!("{operation}@");
        lock::write(&self.cache).retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn cached_entries(&self) -> usize {
        lock::read(&self.cache).len()
    }
}

// serde_json maps are ordered, so equal params always render the same key.
fn cache_key(operation: &str, params: &serde_json::Value) -> String {
    format!("{operation}@{params}")
}

fn decode<Res: DeserializeOwned>(operation: &str, value: serde_json::Value) -> CoreResult<Res> {
    serde_json::from_value(value)
        .map_err(|e| CoreError::request_failed(operation, ServiceError::Decode(e)))
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Page, PaginatedRequestParams, Transaction};
    use crate::service::operations;
    use crate::test_support::{employee, transaction, ScriptedService};
    use std::sync::Arc;

    fn executor(service: &Arc<ScriptedService>) -> RequestExecutor {
        RequestExecutor::new(service.clone())
    }

    #[tokio::test]
    async fn test_cached_call_is_memoized() {
        let service = ScriptedService::new()
            .with_employees(vec![employee("e1", "Ada", "Lovelace")])
            .shared();
        let executor = executor(&service);

        let first: Vec<Employee> = executor
            .execute(operations::EMPLOYEES, &(), RequestOptions::cached())
            .await
            .unwrap();
        let second: Vec<Employee> = executor
            .execute(operations::EMPLOYEES, &(), RequestOptions::cached())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(service.count(operations::EMPLOYEES), 1);
    }

    #[tokio::test]
    async fn test_bypass_always_calls_and_overwrites() {
        let service = ScriptedService::new()
            .with_employees(vec![employee("e1", "Ada", "Lovelace")])
            .shared();
        let executor = executor(&service);

        let _: Vec<Employee> = executor
            .execute(operations::EMPLOYEES, &(), RequestOptions::cached())
            .await
            .unwrap();
        service.set_employees(vec![employee("e2", "Grace", "Hopper")]);

        let fresh: Vec<Employee> = executor
            .execute(operations::EMPLOYEES, &(), RequestOptions::bypass())
            .await
            .unwrap();
        assert_eq!(fresh[0].id, "e2");

        let cached: Vec<Employee> = executor
            .execute(operations::EMPLOYEES, &(), RequestOptions::cached())
            .await
            .unwrap();
        assert_eq!(cached[0].id, "e2");
        assert_eq!(service.count(operations::EMPLOYEES), 2);
    }

    #[tokio::test]
    async fn test_distinct_params_are_distinct_keys() {
        let service = ScriptedService::new().with_pages(vec![
            Page::new(vec![transaction("a", "e1", false)], Some(1)),
            Page::new(vec![transaction("b", "e1", false)], None),
        ])
        .shared();
        let executor = executor(&service);

        let first: Page<Transaction> = executor
            .execute(
                operations::PAGINATED_TRANSACTIONS,
                &PaginatedRequestParams { page: None },
                RequestOptions::cached(),
            )
            .await
            .unwrap();
        let second: Page<Transaction> = executor
            .execute(
                operations::PAGINATED_TRANSACTIONS,
                &PaginatedRequestParams { page: Some(1) },
                RequestOptions::cached(),
            )
            .await
            .unwrap();

        assert_eq!(first.data[0].id, "a");
        assert_eq!(second.data[0].id, "b");
        assert_eq!(executor.cached_entries(), 2);
    }

    #[tokio::test]
    async fn test_failure_propagates_as_request_failed() {
        let service = ScriptedService::new().shared();
        service.fail(operations::EMPLOYEES);
        let executor = executor(&service);

        let err = executor
            .execute::<_, Vec<Employee>>(operations::EMPLOYEES, &(), RequestOptions::cached())
            .await
            .unwrap_err();

        match err {
            CoreError::RequestFailed { operation, .. } => assert_eq!(operation, "employees"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!executor.is_in_flight());
        assert_eq!(executor.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_decode_failure_is_not_cached() {
        let service = ScriptedService::new()
            .with_employees(vec![employee("e1", "Ada", "Lovelace")])
            .shared();
        let executor = executor(&service);

        let err = executor
            .execute::<_, Vec<Transaction>>(operations::EMPLOYEES, &(), RequestOptions::cached())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::RequestFailed { cause: ServiceError::Decode(_), .. }
        ));
        assert_eq!(executor.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_in_flight_flag_tracks_outstanding_calls() {
        let service = ScriptedService::new().with_employees(vec![]).shared();
        let gate = service.hold(operations::EMPLOYEES);
        let executor = executor(&service);

        let (result, seen_in_flight) = tokio::join!(
            executor.execute::<_, Vec<Employee>>(operations::EMPLOYEES, &(), RequestOptions::bypass()),
            async {
                tokio::task::yield_now().await;
                let seen = executor.is_in_flight();
                gate.notify_one();
                seen
            }
        );

        assert!(result.is_ok());
        assert!(seen_in_flight);
        assert!(!executor.is_in_flight());
    }

    #[tokio::test]
    async fn test_clear_cache_for_operation() {
        let service = ScriptedService::new()
            .with_employees(vec![])
            .with_pages(vec![Page::new(vec![], None)])
            .shared();
        let executor = executor(&service);

        let _: Vec<Employee> = executor
            .execute(operations::EMPLOYEES, &(), RequestOptions::cached())
            .await
            .unwrap();
        let _: Page<Transaction> = executor
            .execute(
                operations::PAGINATED_TRANSACTIONS,
                &PaginatedRequestParams::default(),
                RequestOptions::cached(),
            )
            .await
            .unwrap();

        executor.clear_cache_for(operations::EMPLOYEES);
        assert_eq!(executor.cached_entries(), 1);

        executor.clear_cache();
        assert_eq!(executor.cached_entries(), 0);
    }
}
