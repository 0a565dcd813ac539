//! Types that represent the core data model: `Expense`, `Amount` and the aggregate `Summary`.
mod amount;
mod expense;
mod summary;

pub use amount::{Amount, AmountError};
pub use expense::{DraftAmount, Expense, ExpenseDraft, ExpenseId, CATEGORIES, DEFAULT_CATEGORY};
pub(crate) use expense::ValidDraft;
pub use summary::{total, Summary};
