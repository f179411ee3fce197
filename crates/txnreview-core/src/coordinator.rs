//! View mode state machine
//!
//! The coordinator owns the three cache components and shares the approval
//! store with the UI layer. Transitions:
//! - `select_all`: invalidate the employee feed, refresh the directory, fetch
//!   the next page of the global feed
//! - `select_employee`: invalidate the global feed, fetch the employee's history
//! - `load_more`: next page of the global feed, only in `All` mode
//!
//! The losing feed is always invalidated before the winning fetch is issued,
//! so at most one feed holds a value at any observable point. Every transition
//! takes a ticket; a transition overtaken by a later one stops before its
//! next fetch.

use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use txnreview_config::CacheConfig;

use crate::approvals::ApprovalOverrideStore;
use crate::cache::{EmployeeDirectoryCache, EmployeeTransactionCache, PaginatedTransactionCache};
use crate::error::{CoreError, CoreResult};
use crate::executor::RequestExecutor;
use crate::lock;
use crate::models::{Employee, Transaction, ALL_EMPLOYEES_ID};

/// Active dataset of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "employeeId", rename_all = "camelCase")]
pub enum ViewMode {
    All,
    ByEmployee(String),
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::All
    }
}

/// Transaction as displayed, with overrides applied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: String,
    pub merchant: String,
    pub amount: f64,
    pub date: String,
    pub employee: Employee,
    pub approved: bool,
    /// An approval write for this transaction is outstanding
    pub is_pending: bool,
}

impl TransactionView {
    pub fn new(transaction: Transaction, approvals: &ApprovalOverrideStore) -> Self {
        Self {
            approved: approvals.displayed_approval(&transaction),
            is_pending: approvals.is_pending(&transaction.id),
            id: transaction.id,
            merchant: transaction.merchant,
            amount: transaction.amount,
            date: transaction.date,
            employee: transaction.employee,
        }
    }
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub mode: ViewMode,
    pub transactions: Option<Vec<TransactionView>>,
    pub employees: Vec<Employee>,
    pub is_loading: bool,
    pub is_employees_loading: bool,
    pub is_last_page: bool,
    pub can_load_more: bool,
    pub is_mutating: bool,
}

/// The visible feed: the global feed if populated, else the employee feed.
pub fn compose_transactions(
    paginated: Option<Vec<Transaction>>,
    by_employee: Option<Vec<Transaction>>,
) -> Option<Vec<Transaction>> {
    paginated.or(by_employee)
}

/// Counts one outstanding load for its lifetime; the flag reads true while
/// any load is outstanding.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Lowers a claimed flag when dropped
struct ClaimGuard<'a>(&'a AtomicBool);

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ViewCoordinator {
    executor: Arc<RequestExecutor>,
    approvals: Arc<ApprovalOverrideStore>,
    employees: EmployeeDirectoryCache,
    paginated: PaginatedTransactionCache,
    by_employee: EmployeeTransactionCache,
    mode: RwLock<ViewMode>,
    /// Ticket of the latest transition
    transition: AtomicU64,
    is_loading: AtomicUsize,
    is_employees_loading: AtomicUsize,
    bootstrapping: AtomicBool,
}

impl ViewCoordinator {
    pub fn new(
        executor: Arc<RequestExecutor>,
        approvals: Arc<ApprovalOverrideStore>,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            employees: EmployeeDirectoryCache::new(executor.clone()),
            paginated: PaginatedTransactionCache::new(executor.clone(), cache.discard_stale_responses),
            by_employee: EmployeeTransactionCache::new(executor.clone(), cache.discard_stale_responses),
            executor,
            approvals,
            mode: RwLock::new(ViewMode::All),
            transition: AtomicU64::new(0),
            is_loading: AtomicUsize::new(0),
            is_employees_loading: AtomicUsize::new(0),
            bootstrapping: AtomicBool::new(false),
        }
    }

    // ==================== Transitions ====================

    /// Show the global feed. Re-runs the full directory + page sequence.
    pub async fn select_all(&self) -> CoreResult<()> {
        info!(target: "txnreview::view", "switching to all transactions");
        let _loading = LoadingGuard::enter(&self.is_loading);
        let ticket = self.begin_transition(ViewMode::All);
        self.by_employee.invalidate();

        {
            let _employees_loading = LoadingGuard::enter(&self.is_employees_loading);
            self.employees.fetch_all().await?;
        }

        if self.is_superseded(ticket) {
            debug!(target: "txnreview::view", "switch to all transactions overtaken, skipping page fetch");
            return Ok(());
        }
        self.paginated.fetch_next_page().await
    }

    /// Show one employee's full history
    pub async fn select_employee(&self, employee_id: &str) -> CoreResult<()> {
        if employee_id == ALL_EMPLOYEES_ID {
            warn!(target: "txnreview::view", "refusing employee view for the \"All\" sentinel");
            return Err(CoreError::invalid_transition(
                "employee view requires a non-empty employee id",
            ));
        }

        info!(target: "txnreview::view", "switching to transactions of employee {}", employee_id);
        self.begin_transition(ViewMode::ByEmployee(employee_id.to_string()));
        self.paginated.invalidate();

        let _employees_loading = LoadingGuard::enter(&self.is_employees_loading);
        self.by_employee.fetch_for_employee(employee_id).await
    }

    /// Picker entry point: the sentinel selects the global feed
    pub async fn select(&self, employee_id: &str) -> CoreResult<()> {
        if employee_id == ALL_EMPLOYEES_ID {
            self.select_all().await
        } else {
            self.select_employee(employee_id).await
        }
    }

    /// Append the next page of the global feed
    pub async fn load_more(&self) -> CoreResult<()> {
        if let ViewMode::ByEmployee(employee_id) = self.mode() {
            warn!(target: "txnreview::view", "load more requested while viewing employee {}", employee_id);
            return Err(CoreError::invalid_transition(
                "load more is only available while viewing all transactions",
            ));
        }
        if self.paginated.is_last_page() {
            debug!(target: "txnreview::view", "load more ignored, last page reached");
            return Ok(());
        }
        self.paginated.fetch_next_page().await
    }

    /// Run `select_all` once if the directory has never been fetched
    pub async fn ensure_bootstrapped(&self) -> CoreResult<()> {
        if self.employees.has_fetched() || self.bootstrapping.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let _claim = ClaimGuard(&self.bootstrapping);
        info!(target: "txnreview::view", "bootstrapping dashboard");
        self.select_all().await
    }

    /// Record `mode` and take the ticket of the new transition
    fn begin_transition(&self, mode: ViewMode) -> u64 {
        let mut current = lock::write(&self.mode);
        *current = mode;
        self.transition.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.transition.load(Ordering::SeqCst) != ticket
    }

    // ==================== Projections ====================

    pub fn mode(&self) -> ViewMode {
        lock::read(&self.mode).clone()
    }

    /// Visible transactions without overrides applied
    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        compose_transactions(self.paginated.transactions(), self.by_employee.transactions())
    }

    /// Visible transactions with the displayed approval
    pub fn transaction_views(&self) -> Option<Vec<TransactionView>> {
        self.transactions().map(|transactions| {
            transactions
                .into_iter()
                .map(|tx| TransactionView::new(tx, &self.approvals))
                .collect()
        })
    }

    /// A visible transaction by id
    pub fn transaction(&self, transaction_id: &str) -> Option<Transaction> {
        self.transactions()?
            .into_iter()
            .find(|tx| tx.id == transaction_id)
    }

    /// Picker items: the sentinel followed by the directory, once loaded
    pub fn employee_options(&self) -> Vec<Employee> {
        match self.employees.value() {
            Some(employees) => std::iter::once(Employee::all()).chain(employees).collect(),
            None => Vec::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst) > 0
    }

    pub fn is_employees_loading(&self) -> bool {
        self.is_employees_loading.load(Ordering::SeqCst) > 0
    }

    pub fn is_last_page(&self) -> bool {
        self.paginated.is_last_page()
    }

    pub fn can_load_more(&self) -> bool {
        self.paginated.transactions().is_some()
            && self.by_employee.transactions().is_none()
            && !self.is_last_page()
    }

    pub fn snapshot(&self) -> DashboardView {
        DashboardView {
            mode: self.mode(),
            transactions: self.transaction_views(),
            employees: self.employee_options(),
            is_loading: self.is_loading(),
            is_employees_loading: self.is_employees_loading(),
            is_last_page: self.is_last_page(),
            can_load_more: self.can_load_more(),
            is_mutating: self.approvals.is_mutating(),
        }
    }

    pub fn approvals(&self) -> Arc<ApprovalOverrideStore> {
        self.approvals.clone()
    }

    pub fn executor(&self) -> Arc<RequestExecutor> {
        self.executor.clone()
    }

    #[cfg(test)]
    fn feeds_populated(&self) -> (bool, bool) {
        (
            self.paginated.transactions().is_some(),
            self.by_employee.transactions().is_some(),
        )
    }
}

// ==================== Tests ====================
