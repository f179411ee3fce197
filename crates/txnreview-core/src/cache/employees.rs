//! Employee directory

use log::debug;
use std::sync::{Arc, RwLock};

use super::CacheSlot;
use crate::error::CoreResult;
use crate::executor::{RequestExecutor, RequestOptions};
use crate::lock;
use crate::models::Employee;
use crate::service::operations;

#[derive(Default)]
struct DirectoryState {
    slot: CacheSlot<Vec<Employee>>,
    /// Fetches started and not yet finished or dropped
    outstanding: usize,
}

/// One-shot directory of every employee. Always re-fetched on request.
pub struct EmployeeDirectoryCache {
    executor: Arc<RequestExecutor>,
    state: RwLock<DirectoryState>,
}

/// Keeps the slot loading while at least one fetch is alive
struct OutstandingFetch<'a>(&'a RwLock<DirectoryState>);

impl<'a> OutstandingFetch<'a> {
    fn start(state: &'a RwLock<DirectoryState>) -> Self {
        let mut guard = lock::write(state);
        guard.outstanding += 1;
        guard.slot.is_loading = true;
        Self(state)
    }
}

impl Drop for OutstandingFetch<'_> {
    fn drop(&mut self) {
        let mut state = lock::write(self.0);
        state.outstanding = state.outstanding.saturating_sub(1);
        state.slot.is_loading = state.outstanding > 0;
    }
}

impl EmployeeDirectoryCache {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            state: RwLock::new(DirectoryState::default()),
        }
    }

    /// Fetch the whole directory and replace the slot value
    pub async fn fetch_all(&self) -> CoreResult<Vec<Employee>> {
        let _outstanding = OutstandingFetch::start(&self.state);

        let employees = self
            .executor
            .execute::<_, Vec<Employee>>(operations::EMPLOYEES, &(), RequestOptions::bypass())
            .await?;

        debug!(target: "txnreview::cache", "employee directory holds {} entries", employees.len());
        lock::write(&self.state).slot.value = Some(employees.clone());
        Ok(employees)
    }

    pub fn value(&self) -> Option<Vec<Employee>> {
        lock::read(&self.state).slot.value.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock::read(&self.state).slot.is_loading
    }

    pub fn has_fetched(&self) -> bool {
        lock::read(&self.state).slot.is_populated()
    }
}
