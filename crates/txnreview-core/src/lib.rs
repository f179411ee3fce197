//! Client-side data synchronization for the transaction approval dashboard
//!
//! The crate is organized bottom-up:
//! - service: the remote data service contract and operation names
//! - executor: memoizing / bypassable request runner
//! - cache: employee directory, paginated feed and per-employee feed slots
//! - approvals: process-wide optimistic approval overrides
//! - coordinator: view mode state machine composing everything for the UI

pub mod approvals;
pub mod cache;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod models;
pub mod service;

mod lock;

#[cfg(test)]
pub(crate) mod test_support;

pub use approvals::{ApprovalMutation, ApprovalOverrideStore};
pub use cache::{CacheSlot, EmployeeDirectoryCache, EmployeeTransactionCache, PaginatedTransactionCache};
pub use coordinator::{compose_transactions, DashboardView, TransactionView, ViewCoordinator, ViewMode};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity, ServiceError};
pub use executor::{RequestExecutor, RequestOptions};
pub use models::{
    Cursor, Employee, Page, PaginatedRequestParams, RequestByEmployeeParams,
    SetTransactionApprovalParams, Transaction, ALL_EMPLOYEES_ID,
};
pub use service::{operations, RemoteDataService, ServiceRef};
