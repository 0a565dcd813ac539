//! Configuration file handling for the expense tracker.
//!
//! The configuration file is stored at `$EXPENSE_HOME/config.json` and holds the address the
//! server binds to, the currency symbol used when showing amounts, and the location of the
//! expenses document.

use crate::storage::ExpenseFile;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "expense-tracker";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPENSES_JSON: &str = "expenses.json";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CURRENCY: &str = "₹";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSE_HOME` and from there it loads `$EXPENSE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and:
    /// - Writes an initial `config.json` with default settings
    /// - Creates an empty expenses document
    ///
    /// # Errors
    /// - Returns an error if a `config.json` already exists in `dir`.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expense tracker home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The config file '{}' already exists, refusing to overwrite it",
                config_path.display()
            )
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            config_path,
            config_file,
        };
        config
            .expense_file()
            .load()
            .await
            .context("Unable to create the expenses file")?;
        Ok(config)
    }

    /// This will
    /// - validate that `expense_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(expense_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = expense_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expense tracker home directory is missing, run 'init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn host(&self) -> &str {
        &self.config_file.host
    }

    pub fn port(&self) -> u16 {
        self.config_file.port
    }

    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    /// Returns the stored `expenses_path` if it is absolute, otherwise resolves it against the
    /// home directory.
    pub fn expenses_path(&self) -> PathBuf {
        let p = self.config_file.expenses_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    pub fn expense_file(&self) -> ExpenseFile {
        ExpenseFile::new(self.expenses_path())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expense-tracker",
///   "config_version": 1,
///   "host": "127.0.0.1",
///   "port": 5000,
///   "currency": "₹",
///   "expenses_path": "expenses.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expense-tracker"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The address the server binds to
    #[serde(default = "default_host")]
    host: String,

    /// The port the server listens on
    #[serde(default = "default_port")]
    port: u16,

    /// The symbol shown in front of amounts
    #[serde(default = "default_currency")]
    currency: String,

    /// Path to the expenses document (optional, relative to the home directory or absolute)
    /// Defaults to $EXPENSE_HOME/expenses.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    expenses_path: Option<PathBuf>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            host: default_host(),
            port: DEFAULT_PORT,
            currency: default_currency(),
            expenses_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the expenses document path, `expenses.json` unless configured otherwise.
    pub fn expenses_path(&self) -> PathBuf {
        self.expenses_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(EXPENSES_JSON))
    }
}
