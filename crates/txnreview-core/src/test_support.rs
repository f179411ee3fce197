//! Scripted remote service for unit tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::error::ServiceError;
use crate::models::{Employee, Page, Transaction};
use crate::service::{operations, RemoteDataService};

pub(crate) fn employee(id: &str, first: &str, last: &str) -> Employee {
    Employee {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}

pub(crate) fn transaction(id: &str, employee_id: &str, approved: bool) -> Transaction {
    Transaction {
        id: id.to_string(),
        merchant: format!("Merchant {id}"),
        amount: 10.0,
        date: "2024-06-15".to_string(),
        employee: employee(employee_id, "First", "Last"),
        approved,
    }
}

/// In-memory service that records every call.
#[derive(Default)]
pub(crate) struct ScriptedService {
    employees: Mutex<Vec<Employee>>,
    pages: Mutex<Vec<Page<Transaction>>>,
    by_employee: Mutex<HashMap<String, Vec<Transaction>>>,
    failing: Mutex<HashSet<String>>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(self, employees: Vec<Employee>) -> Self {
        self.set_employees(employees);
        self
    }

    /// Pages served in order; page `n` answers the request with `page = n`.
    pub fn with_pages(self, pages: Vec<Page<Transaction>>) -> Self {
        *self.pages.lock().unwrap() = pages;
        self
    }

    pub fn with_employee_transactions(self, employee_id: &str, transactions: Vec<Transaction>) -> Self {
        self.by_employee
            .lock()
            .unwrap()
            .insert(employee_id.to_string(), transactions);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_employees(&self, employees: Vec<Employee>) {
        *self.employees.lock().unwrap() = employees;
    }

    pub fn fail(&self, operation: &str) {
        self.failing.lock().unwrap().insert(operation.to_string());
    }

    pub fn recover(&self, operation: &str) {
        self.failing.lock().unwrap().remove(operation);
    }

    /// Hold every response of `operation` until the returned handle is notified.
    pub fn hold(&self, operation: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .insert(operation.to_string(), Arc::clone(&notify));
        notify
    }

    pub fn release(&self, operation: &str) {
        self.holds.lock().unwrap().remove(operation);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| op == operation)
            .count()
    }
}

#[async_trait]
impl RemoteDataService for ScriptedService {
    async fn call(&self, operation: &str, params: Value) -> Result<Value, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), params.clone()));

        let hold = self.holds.lock().unwrap().get(operation).cloned();
        if let Some(notify) = hold {
            notify.notified().await;
        }

        if self.failing.lock().unwrap().contains(operation) {
            return Err(ServiceError::Status {
                status: 500,
                message: format!("{operation} unavailable"),
            });
        }

        match operation {
            operations::EMPLOYEES => Ok(json!(*self.employees.lock().unwrap())),
            operations::PAGINATED_TRANSACTIONS => {
                let index = params["page"].as_u64().unwrap_or(0) as usize;
                let pages = self.pages.lock().unwrap();
                let page = pages.get(index).ok_or_else(|| ServiceError::NotFound {
                    resource: format!("page {index}"),
                })?;
                Ok(serde_json::to_value(page)?)
            }
            operations::TRANSACTIONS_BY_EMPLOYEE => {
                let id = params["employeeId"].as_str().unwrap_or_default();
                if id.is_empty() {
                    return Err(ServiceError::Status {
                        status: 400,
                        message: "employee id is required".to_string(),
                    });
                }
                let found = self.by_employee.lock().unwrap().get(id).cloned().unwrap_or_default();
                Ok(json!(found))
            }
            operations::SET_TRANSACTION_APPROVAL => Ok(Value::Null),
            other => Err(ServiceError::UnknownOperation {
                operation: other.to_string(),
            }),
        }
    }
}
