use crate::model::{Amount, Expense};
use serde::{Deserialize, Serialize};

/// Sums the amounts of `expenses`. An empty collection totals zero. Returns `None` if the sum is
/// too large to represent.
pub fn total<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Option<Amount> {
    expenses
        .into_iter()
        .try_fold(Amount::ZERO, |sum, e| sum.checked_add(e.amount))
}

/// A snapshot of the whole collection together with its total. This is the body of
/// `GET /api/expenses`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub(crate) total_amount: Amount,
    pub(crate) count: usize,
    pub(crate) expenses: Vec<Expense>,
}

impl Summary {
    /// Totals `expenses`. Returns `None` if the total is too large to represent.
    pub fn new(expenses: Vec<Expense>) -> Option<Self> {
        let total_amount = total(&expenses)?;
        Some(Self::with_total(expenses, total_amount))
    }

    /// For callers that already hold the total of `expenses`.
    pub(crate) fn with_total(expenses: Vec<Expense>, total_amount: Amount) -> Self {
        Self {
            total_amount,
            count: expenses.len(),
            expenses,
        }
    }

    pub fn total_amount(&self) -> Amount {
        self.total_amount
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn into_expenses(self) -> Vec<Expense> {
        self.expenses
    }
}
