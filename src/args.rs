//! These structs provide the CLI interface for the expense-tracker CLI.

use crate::model::DEFAULT_CATEGORY;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
const DEFAULT_CURRENCY: &str = "₹";

/// expense-tracker: record what you spend and keep a running total.
///
/// Run `expense-tracker init` once to create the data directory, then `expense-tracker serve` to
/// start the server. Open the server's address in a browser for the web page, or use the `list`,
/// `add` and `delete` subcommands to work with a running server from the terminal.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory with a default config.json and an empty expenses file.
    Init,
    /// Run the HTTP server: the REST API under /api and the web page at /.
    Serve(ServeArgs),
    /// Show all expenses and the total, as reported by a running server.
    List(ClientArgs),
    /// Add an expense through a running server.
    Add(AddArgs),
    /// Delete an expense through a running server.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the config and the expenses file are held. Defaults to
    /// ~/expense-tracker
    #[arg(long, env = "EXPENSE_HOME", default_value_t = default_expense_home())]
    expense_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expense_home: PathBuf) -> Self {
        Self {
            log_level,
            expense_home: expense_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expense_home(&self) -> &DisplayPath {
        &self.expense_home
    }
}

/// Args for the `serve` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ServeArgs {
    /// The address to bind to. Defaults to the `host` in config.json.
    #[arg(long)]
    host: Option<String>,

    /// The port to listen on. Defaults to the `port` in config.json.
    #[arg(long)]
    port: Option<u16>,
}

impl ServeArgs {
    pub fn new(host: Option<String>, port: Option<u16>) -> Self {
        Self { host, port }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

/// Args shared by the commands that talk to a running server.
#[derive(Debug, Parser, Clone)]
pub struct ClientArgs {
    /// The address of the running server.
    #[arg(long, env = "EXPENSE_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// The symbol shown in front of amounts.
    #[arg(long, env = "EXPENSE_CURRENCY", default_value = DEFAULT_CURRENCY)]
    currency: String,
}

impl ClientArgs {
    pub fn new(server_url: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            currency: currency.into(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// Args for the `add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[clap(flatten)]
    client: ClientArgs,

    /// What the money was spent on.
    #[arg(long, short)]
    description: String,

    /// One of Food, Travel, Shopping, Bills, Other, or any other label.
    #[arg(long, short, default_value = DEFAULT_CATEGORY)]
    category: String,

    /// How much was spent, e.g. 4.50
    #[arg(long, short)]
    amount: String,

    /// The date of the expense as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<String>,
}

impl AddArgs {
    pub fn new(
        client: ClientArgs,
        description: impl Into<String>,
        category: impl Into<String>,
        amount: impl Into<String>,
        date: Option<String>,
    ) -> Self {
        Self {
            client,
            description: description.into(),
            category: category.into(),
            amount: amount.into(),
            date,
        }
    }

    pub fn client(&self) -> &ClientArgs {
        &self.client
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// Args for the `delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[clap(flatten)]
    client: ClientArgs,

    /// The id of the expense to delete, as shown by `list`.
    id: u64,
}

impl DeleteArgs {
    pub fn new(client: ClientArgs, id: u64) -> Self {
        Self { client, id }
    }

    pub fn client(&self) -> &ClientArgs {
        &self.client
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

fn default_expense_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expense-tracker"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expense-home or EXPENSE_HOME instead of relying on the \
                default directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("expense-tracker")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let args = Args::try_parse_from([
            "expense-tracker",
            "--expense-home",
            "/tmp/x",
            "serve",
            "--port",
            "8080",
        ])
        .unwrap();
        assert_eq!(args.common().expense_home().path(), Path::new("/tmp/x"));
        match args.command() {
            Command::Serve(serve) => {
                assert_eq!(serve.port(), Some(8080));
                assert_eq!(serve.host(), None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_defaults() {
        let args = Args::try_parse_from([
            "expense-tracker",
            "add",
            "--description",
            "Coffee",
            "--amount",
            "4.5",
            "--server-url",
            "http://example.com:9000",
        ])
        .unwrap();
        match args.command() {
            Command::Add(add) => {
                assert_eq!(add.description(), "Coffee");
                assert_eq!(add.category(), "Food");
                assert_eq!(add.amount(), "4.5");
                assert_eq!(add.date(), None);
                assert_eq!(add.client().server_url(), "http://example.com:9000");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete_requires_numeric_id() {
        assert!(Args::try_parse_from(["expense-tracker", "delete", "abc"]).is_err());
        let args = Args::try_parse_from(["expense-tracker", "delete", "17"]).unwrap();
        match args.command() {
            Command::Delete(delete) => assert_eq!(delete.id(), 17),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_log_level() {
        let args =
            Args::try_parse_from(["expense-tracker", "--log-level", "debug", "init"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}
