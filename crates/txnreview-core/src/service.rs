//! Remote data service contract

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ServiceError;

/// Logical operation names understood by the remote service
pub mod operations {
    pub const PAGINATED_TRANSACTIONS: &str = "paginatedTransactions";
    pub const TRANSACTIONS_BY_EMPLOYEE: &str = "transactionsByEmployee";
    pub const EMPLOYEES: &str = "employees";
    pub const SET_TRANSACTION_APPROVAL: &str = "setTransactionApproval";
}

/// Service reference type
pub type ServiceRef = Arc<dyn RemoteDataService>;

/// Remote store of employees and transactions.
///
/// Only `RequestExecutor` calls this directly.
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    /// Invoke `operation` with JSON params and return its JSON result
    async fn call(
        &self,
        operation: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ServiceError>;
}
