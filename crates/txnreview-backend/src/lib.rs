//! Fixture-backed remote data service
//!
//! Serves employees and transactions from a JSON fixture held in memory.
//! Approval writes are applied to the in-memory copy, so later fetches see
//! them the way a real backend would.

pub mod error;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use txnreview_config::BackendConfig;
use txnreview_core::{
    operations, Employee, Page, PaginatedRequestParams, RemoteDataService, RequestByEmployeeParams,
    ServiceError, SetTransactionApprovalParams, Transaction,
};

pub use error::BackendError;

/// Contents of the fixture file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    pub employees: Vec<Employee>,
    pub transactions: Vec<Transaction>,
}

pub struct FixtureDataService {
    data: RwLock<Fixture>,
    page_size: usize,
    latency: Duration,
}

impl FixtureDataService {
    pub fn new(fixture: Fixture, config: &BackendConfig) -> Self {
        Self {
            data: RwLock::new(fixture),
            page_size: config.page_size.max(1),
            latency: Duration::from_millis(config.latency_ms),
        }
    }

    /// Load the fixture named by the backend configuration
    pub async fn load(config: &BackendConfig) -> Result<Self, BackendError> {
        let path = config.fixture_path.as_path();
        if !path.exists() {
            return Err(BackendError::FixtureNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content, config)
    }

    pub fn from_json(content: &str, config: &BackendConfig) -> Result<Self, BackendError> {
        let fixture: Fixture = serde_json::from_str(content)?;
        Ok(Self::new(fixture, config))
    }

    fn paginated_transactions(&self, params: PaginatedRequestParams) -> Result<Page<Transaction>, ServiceError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let page = params.page.unwrap_or(0);
        let start = page as usize * self.page_size;

        if start > 0 && start >= data.transactions.len() {
            return Err(ServiceError::NotFound {
                resource: format!("page {}", page),
            });
        }

        let end = (start + self.page_size).min(data.transactions.len());
        let next_page = if end < data.transactions.len() { Some(page + 1) } else { None };
        Ok(Page::new(data.transactions[start..end].to_vec(), next_page))
    }

    fn transactions_by_employee(&self, params: RequestByEmployeeParams) -> Result<Vec<Transaction>, ServiceError> {
        if params.employee_id.is_empty() {
            return Err(ServiceError::Status {
                status: 400,
                message: "Employee id cannot be empty".to_string(),
            });
        }

        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data
            .transactions
            .iter()
            .filter(|tx| tx.belongs_to(&params.employee_id))
            .cloned()
            .collect())
    }

    fn set_transaction_approval(&self, params: SetTransactionApprovalParams) -> Result<(), ServiceError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let transaction = data
            .transactions
            .iter_mut()
            .find(|tx| tx.id == params.transaction_id)
            .ok_or_else(|| ServiceError::NotFound {
                resource: format!("transaction {}", params.transaction_id),
            })?;
        transaction.approved = params.value;
        Ok(())
    }
}

#[async_trait]
impl RemoteDataService for FixtureDataService {
    async fn call(&self, operation: &str, params: Value) -> Result<Value, ServiceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        debug!(target: "txnreview::backend", "{} {}", operation, params);

        let response = match operation {
            operations::EMPLOYEES => {
                let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
                serde_json::to_value(&data.employees)?
            }
            operations::PAGINATED_TRANSACTIONS => {
                let page = self.paginated_transactions(serde_json::from_value(params)?)?;
                serde_json::to_value(page)?
            }
            operations::TRANSACTIONS_BY_EMPLOYEE => {
                let transactions = self.transactions_by_employee(serde_json::from_value(params)?)?;
                serde_json::to_value(transactions)?
            }
            operations::SET_TRANSACTION_APPROVAL => {
                self.set_transaction_approval(serde_json::from_value(params)?)?;
                Value::Null
            }
            other => {
                return Err(ServiceError::UnknownOperation {
                    operation: other.to_string(),
                })
            }
        };

        Ok(response)
    }
}

// ==================== Tests ====================
