//! Optimistic approval overrides
//!
//! An approval decision is a fact about a transaction, not about a view, so
//! the override map outlives every feed invalidation and mode switch. The
//! displayed approval of a transaction is `override ?? fetched snapshot`.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{CoreError, CoreResult};
use crate::executor::{RequestExecutor, RequestOptions};
use crate::lock;
use crate::models::{SetTransactionApprovalParams, Transaction};
use crate::service::operations;

/// Latest approval written per transaction id for this session, plus the
/// ids whose write is still outstanding.
#[derive(Debug, Default)]
pub struct ApprovalOverrideStore {
    overrides: RwLock<HashMap<String, bool>>,
    pending: Mutex<HashSet<String>>,
}

/// Marks a transaction as mutating until dropped
struct PendingWrite<'a> {
    pending: &'a Mutex<HashSet<String>>,
    transaction_id: String,
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        lock::lock(self.pending).remove(&self.transaction_id);
    }
}

impl ApprovalOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `approved` visible immediately, ahead of remote confirmation
    pub fn stage(&self, transaction_id: &str, approved: bool) {
        lock::write(&self.overrides).insert(transaction_id.to_string(), approved);
    }

    pub fn get(&self, transaction_id: &str) -> Option<bool> {
        lock::read(&self.overrides).get(transaction_id).copied()
    }

    /// Approval shown for `transaction`
    pub fn displayed_approval(&self, transaction: &Transaction) -> bool {
        self.get(&transaction.id).unwrap_or(transaction.approved)
    }

    /// Keep the staged value on success, re-stage `previous` on failure.
    ///
    /// Returns whether the staged value was kept.
    pub fn confirm_or_revert<T>(&self, transaction_id: &str, previous: bool, result: &CoreResult<T>) -> bool {
        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    target: "txnreview::approvals",
                    "rolling back approval of {} to {}: {}", transaction_id, previous, e
                );
                self.stage(transaction_id, previous);
                false
            }
        }
    }

    /// True while a remote write for `transaction_id` is outstanding
    pub fn is_pending(&self, transaction_id: &str) -> bool {
        lock::lock(&self.pending).contains(transaction_id)
    }

    /// True while any approval write is outstanding
    pub fn is_mutating(&self) -> bool {
        !lock::lock(&self.pending).is_empty()
    }

    fn begin(&self, transaction_id: &str) -> CoreResult<PendingWrite<'_>> {
        if !lock::lock(&self.pending).insert(transaction_id.to_string()) {
            return Err(CoreError::MutationInFlight {
                transaction_id: transaction_id.to_string(),
            });
        }
        Ok(PendingWrite {
            pending: &self.pending,
            transaction_id: transaction_id.to_string(),
        })
    }
}

/// Stage-and-mutate for the UI layer.
///
/// At most one mutation per transaction id is outstanding at a time; calls
/// for different ids run independently.
pub struct ApprovalMutation {
    executor: Arc<RequestExecutor>,
    store: Arc<ApprovalOverrideStore>,
}

impl ApprovalMutation {
    pub fn new(executor: Arc<RequestExecutor>, store: Arc<ApprovalOverrideStore>) -> Self {
        Self { executor, store }
    }

    /// Stage `approved` for `transaction`, persist it remotely, and roll the
    /// override back if the remote call fails.
    pub async fn set_approval(&self, transaction: &Transaction, approved: bool) -> CoreResult<()> {
        let _pending = self.store.begin(&transaction.id)?;

        let previous = self.store.displayed_approval(transaction);
        self.store.stage(&transaction.id, approved);
        debug!(
            target: "txnreview::approvals",
            "staged approval {} -> {} for {}", previous, approved, transaction.id
        );

        let result = self
            .executor
            .execute::<_, ()>(
                operations::SET_TRANSACTION_APPROVAL,
                &SetTransactionApprovalParams {
                    transaction_id: transaction.id.clone(),
                    value: approved,
                },
                RequestOptions::bypass(),
            )
            .await;

        self.store.confirm_or_revert(&transaction.id, previous, &result);
        result
    }
}
