use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Creates the data directory with an initial `config.json` holding the default settings and an
/// empty expenses file.
///
/// # Arguments
/// - `expense_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/expense-tracker`
///
/// # Errors
/// - Returns an error if `config.json` already exists or if any file operations fail.
pub async fn init(expense_home: &Path) -> Result<Out<PathBuf>> {
    let config = Config::create(expense_home)
        .await
        .context("Unable to create the data directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(Out::new(
        format!(
            "Successfully created the expense tracker directory at {}",
            config.root().display()
        ),
        config.expenses_path(),
    ))
}
