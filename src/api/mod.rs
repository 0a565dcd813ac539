//! The JSON bodies exchanged over the REST API, shared by the server and the client.
//!
//! | Method | Path                | Success                                    | Failure       |
//! |--------|---------------------|--------------------------------------------|---------------|
//! | GET    | `/api/health`       | 200 `Health`                               |               |
//! | GET    | `/api/expenses`     | 200 `Summary`                              |               |
//! | POST   | `/api/expenses`     | 201 `Change`                               | 400 `ApiError`|
//! | DELETE | `/api/expenses/:id` | 200 `Change`                               | 404 `ApiError`|

mod client;

pub use client::ApiClient;

use crate::model::{Amount, Expense, Summary};
use serde::{Deserialize, Serialize};

pub const HEALTH_PATH: &str = "/api/health";
pub const EXPENSES_PATH: &str = "/api/expenses";

/// The body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
}

impl Health {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Expense tracker backend is running".to_string(),
        }
    }
}

/// The body returned after a successful create or delete: the full collection and its total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub message: String,
    pub total_amount: Amount,
    pub expenses: Vec<Expense>,
}

impl Change {
    pub fn new(message: impl Into<String>, summary: Summary) -> Self {
        Self {
            message: message.into(),
            total_amount: summary.total_amount(),
            expenses: summary.into_expenses(),
        }
    }

    /// Converts into the same shape as a list response.
    pub fn into_summary(self) -> Summary {
        Summary::with_total(self.expenses, self.total_amount)
    }
}

/// The body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpenseDraft, ExpenseId};
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_change_json_shape() {
        let expense = ExpenseDraft::new(
            "Coffee",
            "Food",
            Amount::from_str("4.5").unwrap(),
            "2024-01-01",
        )
        .validate()
        .unwrap()
        .into_expense(ExpenseId::new(3));
        let summary = Summary::new(vec![expense]).unwrap();
        let change = Change::new("Expense added successfully", summary);

        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["message"], json!("Expense added successfully"));
        assert_eq!(value["totalAmount"], json!(4.5));
        assert_eq!(value["expenses"][0]["id"], json!(3));
        assert!(value.get("count").is_none());

        let back: Change = serde_json::from_value(value).unwrap();
        assert_eq!(back.into_summary().count(), 1);
    }

    #[test]
    fn test_health_json_shape() {
        let value = serde_json::to_value(Health::ok()).unwrap();
        assert_eq!(value["status"], json!("ok"));
        assert!(value["message"].is_string());
    }
}
