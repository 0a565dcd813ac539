//! Reads and writes the expenses document, a JSON array of `Expense` records.

use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Expense};
use crate::{pub_bail, utils, Result};
use anyhow::Context;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The on-disk expenses document. Every `save` rewrites the whole document.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExpenseFile {
    path: PathBuf,
}

impl ExpenseFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all records from the document. If the document does not exist yet it is created
    /// holding an empty array.
    ///
    /// # Errors
    /// - `ErrorType::Persistence` if the document cannot be created or read.
    /// - `ErrorType::CorruptStore` if the document is not a JSON array of expenses, if two
    ///   records share an id, or if a record's amount is negative or larger than `Amount::MAX`.
    pub async fn load(&self) -> Result<Vec<Expense>> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Unable to check for {}", self.path.display()))
            .pub_result(ErrorType::Persistence)?;
        if !exists {
            info!(
                "No expenses file at {}, starting with an empty one",
                self.path.display()
            );
            self.save(&[]).await?;
        }

        let content = utils::read(&self.path)
            .await
            .pub_result(ErrorType::Persistence)?;
        let expenses: Vec<Expense> = serde_json::from_str(&content)
            .with_context(|| {
                format!(
                    "The expenses file at {} is not a valid list of expenses",
                    self.path.display()
                )
            })
            .pub_result(ErrorType::CorruptStore)?;

        let mut seen = BTreeSet::new();
        for expense in &expenses {
            if !seen.insert(expense.id()) {
                pub_bail!(
                    ErrorType::CorruptStore,
                    "The expenses file at {} contains the id {} more than once",
                    self.path.display(),
                    expense.id()
                );
            }
            if expense.amount().is_negative() || expense.amount() > Amount::MAX {
                pub_bail!(
                    ErrorType::CorruptStore,
                    "The expenses file at {} has an invalid amount {} for expense {}",
                    self.path.display(),
                    expense.amount(),
                    expense.id()
                );
            }
        }

        debug!(
            "Loaded {} expenses from {}",
            expenses.len(),
            self.path.display()
        );
        Ok(expenses)
    }

    /// Overwrites the document with `expenses`. The parent directory is created if needed.
    ///
    /// # Errors
    /// - `ErrorType::Persistence` if the document cannot be written.
    pub async fn save(&self, expenses: &[Expense]) -> Result<()> {
        let data = serde_json::to_string_pretty(expenses)
            .context("Unable to serialize expenses")
            .pub_result(ErrorType::Persistence)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::make_dir(parent)
                .await
                .pub_result(ErrorType::Persistence)?;
        }
        utils::write_replace(&self.path, data)
            .await
            .with_context(|| format!("Unable to save expenses to {}", self.path.display()))
            .pub_result(ErrorType::Persistence)?;
        debug!("Saved {} expenses to {}", expenses.len(), self.path.display());
        Ok(())
    }
}
