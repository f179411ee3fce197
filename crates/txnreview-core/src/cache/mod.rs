//! Cache slots for the dashboard's remote datasets
//!
//! Each component owns exactly one slot; nothing outside the component can
//! write to it.
//! - employees: the employee directory, fetched wholesale
//! - paginated: the global feed, accumulated page by page
//! - by_employee: one employee's full history

pub mod by_employee;
pub mod employees;
pub mod paginated;

use serde::Serialize;

pub use by_employee::EmployeeTransactionCache;
pub use employees::EmployeeDirectoryCache;
pub use paginated::PaginatedTransactionCache;

/// Holder of one logical dataset.
///
/// `value = None` means never populated since the last invalidation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSlot<T> {
    pub value: Option<T>,
    pub is_loading: bool,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self {
            value: None,
            is_loading: false,
        }
    }
}

impl<T> CacheSlot<T> {
    pub fn is_populated(&self) -> bool {
        self.value.is_some()
    }
}
