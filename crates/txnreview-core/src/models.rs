//! Core data models for the dashboard

use serde::{Deserialize, Serialize};

/// Identifier of the "All" pseudo-employee used by the picker.
pub const ALL_EMPLOYEES_ID: &str = "";

/// Opaque position in the paginated feed (the next page number).
pub type Cursor = u32;

/// Employee information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique employee identifier (empty only for the "All" sentinel)
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    /// The "no employee filter" sentinel
    pub fn all() -> Self {
        Self {
            id: ALL_EMPLOYEES_ID.to_string(),
            first_name: "All".to_string(),
            last_name: "Employees".to_string(),
        }
    }

    /// Check if this is the "All" sentinel
    pub fn is_all(&self) -> bool {
        self.id == ALL_EMPLOYEES_ID
    }
}

/// Transaction as returned by the remote service.
///
/// `approved` is the value at fetch time. Once an override exists for the
/// id, the override is what the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub merchant: String,
    /// Amount in a currency-agnostic unit
    pub amount: f64,
    /// Transaction date (YYYY-MM-DD format)
    pub date: String,
    /// Employee snapshot taken with the transaction
    pub employee: Employee,
    pub approved: bool,
}

impl Transaction {
    /// Check if the transaction belongs to an employee
    pub fn belongs_to(&self, employee_id: &str) -> bool {
        self.employee.id == employee_id
    }
}

/// One page of a cursor-paginated feed.
///
/// `next_page = None` means no further pages exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_page: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, next_page: Option<Cursor>) -> Self {
        Self { data, next_page }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_page.is_none()
    }
}

/// Parameters of `paginatedTransactions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRequestParams {
    pub page: Option<Cursor>,
}

/// Parameters of `transactionsByEmployee`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestByEmployeeParams {
    pub employee_id: String,
}

/// Parameters of `setTransactionApproval`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
    pub transaction_id: String,
    pub value: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sentinel() {
        let all = Employee::all();
        assert!(all.is_all());
        assert_eq!(all.first_name, "All");

        let ada = Employee {
            id: "e1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };
        assert!(!ada.is_all());
    }

    #[test]
    fn test_transaction_wire_format() {
        let json = serde_json::json!({
            "id": "t1",
            "merchant": "Cafe",
            "amount": 12.5,
            "date": "2024-06-15",
            "employee": { "id": "e1", "firstName": "Ada", "lastName": "Lovelace" },
            "approved": false
        });
        let tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.employee.first_name, "Ada");
        assert!(tx.belongs_to("e1"));
        assert_eq!(tx.date, "2024-06-15");
    }

    #[test]
    fn test_page_wire_format() {
        let page: Page<u32> = serde_json::from_str(r#"{"data":[1,2],"nextPage":null}"#).unwrap();
        assert!(page.is_terminal());
        assert_eq!(page.data, vec![1, 2]);

        let json = serde_json::to_value(Page::new(vec![3], Some(2))).unwrap();
        assert_eq!(json["nextPage"], 2);
    }

    #[test]
    fn test_params_are_camel_case() {
        let params = SetTransactionApprovalParams {
            transaction_id: "t1".to_string(),
            value: true,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "transactionId": "t1", "value": true }));
    }
}
