//! The record store owns the expense collection and keeps the expenses document in step with it.
//!
//! Every mutation runs inside one critical section: change the collection, write the whole
//! document, and only then release the lock. If the write fails the change is undone, so the
//! collection and the document agree after every call, successful or not.

use crate::error::{ErrorType, IntoResult};
use crate::model::{total, Amount, Expense, ExpenseDraft, ExpenseId, Summary};
use crate::storage::ExpenseFile;
use crate::{pub_bail, Result};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// A cheaply cloneable handle to the record store. All clones share the same collection.
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    file: ExpenseFile,
    expenses: Vec<Expense>,
    /// Always the exact sum of `expenses`.
    total: Amount,
    last_id: u64,
    clock: fn() -> u64,
}

impl ExpenseStore {
    /// Loads the collection from `file`, creating an empty document if there is none.
    pub async fn open(file: ExpenseFile) -> Result<Self> {
        Self::open_with_clock(file, now_millis).await
    }

    async fn open_with_clock(file: ExpenseFile, clock: fn() -> u64) -> Result<Self> {
        let expenses = file.load().await?;
        let total = total(&expenses)
            .with_context(|| {
                format!(
                    "The expenses in {} add up to too much",
                    file.path().display()
                )
            })
            .pub_result(ErrorType::CorruptStore)?;
        let last_id = expenses.iter().map(|e| e.id().get()).max().unwrap_or(0);
        info!(
            "Opened {} with {} expenses",
            file.path().display(),
            expenses.len()
        );
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                file,
                expenses,
                total,
                last_id,
                clock,
            })),
        })
    }

    /// Returns every expense in insertion order along with the total and the count.
    pub async fn list(&self) -> Summary {
        self.inner.lock().await.summary()
    }

    /// Validates `draft`, appends it as a new expense and saves the collection.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if a field is missing or empty, the amount is not a
    ///   non-negative number no larger than `Amount::MAX`, or the new total would be too large to
    ///   represent. Nothing is changed.
    /// - `ErrorType::Persistence` if the document cannot be written. Nothing is changed.
    pub async fn create(&self, draft: &ExpenseDraft) -> Result<(Expense, Summary)> {
        let valid = draft.validate()?;

        let mut inner = self.inner.lock().await;
        let Some(new_total) = inner.total.checked_add(valid.amount()) else {
            pub_bail!(
                ErrorType::Validation,
                "Adding this expense would make the total too large"
            );
        };
        let id = inner.next_id();
        let expense = valid.into_expense(id);
        inner.expenses.push(expense.clone());

        if let Err(e) = inner.persist().await {
            inner.expenses.pop();
            error!("Unable to save new expense, it has been discarded: {e:#}");
            return Err(e);
        }
        inner.last_id = id.get();
        inner.total = new_total;

        info!(
            "Added expense {} '{}' ({})",
            id, expense.description, expense.amount
        );
        Ok((expense, inner.summary()))
    }

    /// Removes the expense with `id` and saves the collection.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if no expense has `id`. Nothing is changed.
    /// - `ErrorType::Persistence` if the document cannot be written. Nothing is changed.
    pub async fn delete(&self, id: ExpenseId) -> Result<(Expense, Summary)> {
        let mut inner = self.inner.lock().await;
        let Some(index) = inner.expenses.iter().position(|e| e.id() == id) else {
            pub_bail!(ErrorType::NotFound, "Expense {id} not found");
        };
        let new_total = inner
            .total
            .checked_sub(inner.expenses[index].amount())
            .with_context(|| format!("Unable to subtract expense {id} from the total"))
            .pub_result(ErrorType::Service)?;
        let removed = inner.expenses.remove(index);

        if let Err(e) = inner.persist().await {
            inner.expenses.insert(index, removed);
            error!("Unable to save after deleting expense {id}, it has been restored: {e:#}");
            return Err(e);
        }

        inner.total = new_total;

        info!("Deleted expense {id} '{}'", removed.description);
        Ok((removed, inner.summary()))
    }

    /// The path of the document backing this store.
    pub async fn path(&self) -> std::path::PathBuf {
        self.inner.lock().await.file.path().to_path_buf()
    }
}

impl Inner {
    /// Ids follow the wall clock in milliseconds but always move forward by at least one, so two
    /// creates in the same millisecond, or a clock that steps backwards, still get distinct,
    /// increasing ids.
    fn next_id(&self) -> ExpenseId {
        ExpenseId::new((self.clock)().max(self.last_id + 1))
    }

    fn summary(&self) -> Summary {
        Summary::with_total(self.expenses.clone(), self.total)
    }

    async fn persist(&self) -> Result<()> {
        self.file.save(&self.expenses).await
    }
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}
