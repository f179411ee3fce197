//! Full transaction history of one employee

use log::{debug, warn};
use std::sync::{Arc, RwLock};

use super::CacheSlot;
use crate::error::{CoreError, CoreResult};
use crate::executor::{RequestExecutor, RequestOptions};
use crate::lock;
use crate::models::{RequestByEmployeeParams, Transaction, ALL_EMPLOYEES_ID};
use crate::service::operations;

#[derive(Default)]
struct HistoryState {
    slot: CacheSlot<Vec<Transaction>>,
    employee_id: Option<String>,
    /// Bumped by every request and by invalidation; only the latest applies.
    generation: u64,
}

/// Lowers the loading flag if the request is still the latest when dropped
struct PendingHistory<'a> {
    state: &'a RwLock<HistoryState>,
    generation: u64,
}

impl Drop for PendingHistory<'_> {
    fn drop(&mut self) {
        let mut state = lock::write(self.state);
        if state.generation == self.generation {
            state.slot.is_loading = false;
        }
    }
}

pub struct EmployeeTransactionCache {
    executor: Arc<RequestExecutor>,
    discard_stale: bool,
    state: RwLock<HistoryState>,
}

impl EmployeeTransactionCache {
    pub fn new(executor: Arc<RequestExecutor>, discard_stale: bool) -> Self {
        Self {
            executor,
            discard_stale,
            state: RwLock::new(HistoryState::default()),
        }
    }

    /// Replace the slot with `employee_id`'s full history
    pub async fn fetch_for_employee(&self, employee_id: &str) -> CoreResult<()> {
        if employee_id == ALL_EMPLOYEES_ID {
            return Err(CoreError::invalid_transition(
                "employee-scoped fetch requires a non-empty employee id",
            ));
        }

        let generation = {
            let mut state = lock::write(&self.state);
            state.generation += 1;
            state.slot.is_loading = true;
            state.generation
        };
        let _pending = PendingHistory {
            state: &self.state,
            generation,
        };

        let result = self
            .executor
            .execute::<_, Vec<Transaction>>(
                operations::TRANSACTIONS_BY_EMPLOYEE,
                &RequestByEmployeeParams {
                    employee_id: employee_id.to_string(),
                },
                RequestOptions::cached(),
            )
            .await;

        let mut state = lock::write(&self.state);
        let current = state.generation == generation;
        if current {
            state.slot.is_loading = false;
        }
        let transactions = result?;

        if !current && self.discard_stale {
            warn!(
                target: "txnreview::cache",
                "discarding stale history for employee {} (generation {}, now {})",
                employee_id, generation, state.generation
            );
            return Ok(());
        }

        debug!(
            target: "txnreview::cache",
            "employee {} has {} transactions", employee_id, transactions.len()
        );
        state.slot.value = Some(transactions);
        state.employee_id = Some(employee_id.to_string());
        Ok(())
    }

    pub fn invalidate(&self) {
        let mut state = lock::write(&self.state);
        state.generation += 1;
        state.slot = CacheSlot::default();
        state.employee_id = None;
    }

    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        lock::read(&self.state).slot.value.clone()
    }

    /// Employee whose history currently fills the slot
    pub fn employee_id(&self) -> Option<String> {
        lock::read(&self.state).employee_id.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock::read(&self.state).slot.is_loading
    }
}
