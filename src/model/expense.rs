use crate::error::{ErrorType, IntoResult};
use crate::model::Amount;
use crate::{pub_bail, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The category labels offered by the clients. The server accepts any non-empty text.
pub const CATEGORIES: [&str; 5] = ["Food", "Travel", "Shopping", "Bills", "Other"];

/// The category selected when a client form is reset.
pub const DEFAULT_CATEGORY: &str = "Food";

/// Identifies an expense. Identifiers are issued in strictly increasing order and are never
/// reused while the document exists.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExpenseId(u64);

impl ExpenseId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ExpenseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single expense record, exactly as it is stored on disk and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub(crate) id: ExpenseId,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) amount: Amount,
    /// Calendar date as entered, usually `YYYY-MM-DD`. Not checked for calendar correctness.
    pub(crate) date: String,
}

impl Expense {
    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }
}

/// The amount of an `ExpenseDraft` before validation. Clients send either a JSON number or the
/// raw text of a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DraftAmount {
    Number(serde_json::Number),
    Text(String),
}

impl DraftAmount {
    fn parse(&self) -> Result<Option<Amount>> {
        let text = match self {
            DraftAmount::Number(n) => n.to_string(),
            DraftAmount::Text(s) if s.trim().is_empty() => return Ok(None),
            DraftAmount::Text(s) => s.clone(),
        };
        Amount::from_str(&text)
            .with_context(|| format!("Amount must be a number, got '{text}'"))
            .pub_result(ErrorType::Validation)
            .map(Some)
    }
}

impl From<Amount> for DraftAmount {
    fn from(value: Amount) -> Self {
        DraftAmount::Text(value.to_string())
    }
}

/// The body of a create request. Every field is optional here so that a missing field can be
/// reported as a validation failure rather than as a malformed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<DraftAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ExpenseDraft {
    pub fn new(
        description: impl Into<String>,
        category: impl Into<String>,
        amount: impl Into<DraftAmount>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            category: Some(category.into()),
            amount: Some(amount.into()),
            date: Some(date.into()),
        }
    }

    /// Checks that all four fields are present and non-empty and that the amount is a
    /// non-negative number. Text fields are trimmed.
    pub(crate) fn validate(&self) -> Result<ValidDraft> {
        let description = required(self.description.as_deref());
        let category = required(self.category.as_deref());
        let date = required(self.date.as_deref());
        let amount = match &self.amount {
            Some(amount) => amount.parse()?,
            None => None,
        };

        let (Some(description), Some(category), Some(amount), Some(date)) =
            (description, category, amount, date)
        else {
            pub_bail!(ErrorType::Validation, "All fields are required");
        };

        if amount.is_negative() {
            pub_bail!(ErrorType::Validation, "Amount cannot be negative");
        }
        if amount > Amount::MAX {
            pub_bail!(
                ErrorType::Validation,
                "Amount cannot be more than {}",
                Amount::MAX
            );
        }

        Ok(ValidDraft {
            description: description.to_string(),
            category: category.to_string(),
            amount,
            date: date.to_string(),
        })
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// An `ExpenseDraft` that passed validation and only lacks an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidDraft {
    description: String,
    category: String,
    amount: Amount,
    date: String,
}

impl ValidDraft {
    pub(crate) fn amount(&self) -> Amount {
        self.amount
    }

    pub(crate) fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            description: self.description,
            category: self.category,
            amount: self.amount,
            date: self.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::find_error_type;
    use serde_json::json;

    fn draft(value: serde_json::Value) -> ExpenseDraft {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_validate_ok() {
        let d = draft(json!({
            "description": " Coffee ",
            "category": "Food",
            "amount": 4.5,
            "date": "2024-01-01"
        }));
        let expense = d.validate().unwrap().into_expense(ExpenseId::new(1));
        assert_eq!(expense.description(), "Coffee");
        assert_eq!(expense.category(), "Food");
        assert_eq!(expense.amount(), Amount::from_str("4.5").unwrap());
        assert_eq!(expense.date(), "2024-01-01");
    }

    #[test]
    fn test_validate_string_amount() {
        let d = draft(json!({
            "description": "Train",
            "category": "Travel",
            "amount": "120.75",
            "date": "2024-02-03"
        }));
        let valid = d.validate().unwrap();
        assert_eq!(valid.amount, Amount::from_str("120.75").unwrap());
    }

    #[test]
    fn test_validate_free_text_category() {
        let d = ExpenseDraft::new("Gift", "Birthdays", Amount::from_str("10").unwrap(), "x");
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_fields() {
        let complete = json!({
            "description": "Coffee",
            "category": "Food",
            "amount": 4.5,
            "date": "2024-01-01"
        });
        for field in ["description", "category", "amount", "date"] {
            let mut missing = complete.clone();
            missing.as_object_mut().unwrap().remove(field);
            let e = draft(missing).validate().unwrap_err();
            assert_eq!(find_error_type(&e), Some(ErrorType::Validation), "{field}");
            assert_eq!(e.to_string(), "All fields are required");

            let mut empty = complete.clone();
            empty[field] = json!("   ");
            let e = draft(empty).validate().unwrap_err();
            assert_eq!(find_error_type(&e), Some(ErrorType::Validation), "{field}");
        }
    }

    #[test]
    fn test_validate_non_numeric_amount() {
        let d = draft(json!({
            "description": "Coffee",
            "category": "Food",
            "amount": "a lot",
            "date": "2024-01-01"
        }));
        let e = d.validate().unwrap_err();
        assert_eq!(find_error_type(&e), Some(ErrorType::Validation));
        assert!(e.to_string().contains("Amount must be a number"));
    }

    #[test]
    fn test_validate_negative_amount() {
        let d = draft(json!({
            "description": "Refund",
            "category": "Other",
            "amount": -3,
            "date": "2024-01-01"
        }));
        let e = d.validate().unwrap_err();
        assert_eq!(find_error_type(&e), Some(ErrorType::Validation));
    }

    #[test]
    fn test_validate_amount_limit() {
        let at_limit = ExpenseDraft::new("House", "Bills", Amount::MAX, "2024-01-01");
        assert_eq!(at_limit.validate().unwrap().amount, Amount::MAX);

        for amount in [json!("1000000000000000.01"), json!(5e28), json!("5e28")] {
            let d = draft(json!({
                "description": "Island",
                "category": "Shopping",
                "amount": amount,
                "date": "2024-01-01"
            }));
            let e = d.validate().unwrap_err();
            assert_eq!(find_error_type(&e), Some(ErrorType::Validation), "{amount}");
            assert_eq!(e.to_string(), "Amount cannot be more than 1000000000000000");
        }
    }

    #[test]
    fn test_validate_amount_with_letters() {
        for amount in ["abc12", "USD 7", "e5"] {
            let d = draft(json!({
                "description": "Coffee",
                "category": "Food",
                "amount": amount,
                "date": "2024-01-01"
            }));
            let e = d.validate().unwrap_err();
            assert_eq!(find_error_type(&e), Some(ErrorType::Validation), "{amount}");
        }
    }

    #[test]
    fn test_validate_zero_amount() {
        let d = draft(json!({
            "description": "Free sample",
            "category": "Food",
            "amount": 0,
            "date": "2024-01-01"
        }));
        assert!(d.validate().unwrap().amount.is_zero());
    }

    #[test]
    fn test_expense_json_shape() {
        let expense = Expense {
            id: ExpenseId::new(1704067200000),
            description: "Coffee".into(),
            category: "Food".into(),
            amount: Amount::from_str("4.5").unwrap(),
            date: "2024-01-01".into(),
        };
        assert_eq!(
            serde_json::to_value(&expense).unwrap(),
            json!({
                "id": 1704067200000u64,
                "description": "Coffee",
                "category": "Food",
                "amount": 4.5,
                "date": "2024-01-01"
            })
        );
    }

    #[test]
    fn test_expense_id_parse() {
        assert_eq!(" 42 ".parse::<ExpenseId>().unwrap(), ExpenseId::new(42));
        assert!("abc".parse::<ExpenseId>().is_err());
        assert!("-1".parse::<ExpenseId>().is_err());
    }
}
