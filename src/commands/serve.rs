use crate::args::ServeArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::server::{self, AppState};
use crate::store::ExpenseStore;
use crate::{Config, Result};
use anyhow::Context;
use std::future::Future;
use std::net::SocketAddr;
use tracing::{error, info};

/// Runs the HTTP server until the process receives Ctrl-C.
///
/// The expenses file is loaded before the port is bound, so a corrupt file stops the server from
/// starting at all.
///
/// # Arguments
/// - `config` - The loaded configuration. `host`, `port` and `currency` come from here.
/// - `args` - Overrides for the host and port from the command line.
pub async fn serve(config: Config, args: &ServeArgs) -> Result<Out<()>> {
    serve_until(config, args, shutdown_signal()).await
}

pub(crate) async fn serve_until<F>(config: Config, args: &ServeArgs, shutdown: F) -> Result<Out<()>>
where
    F: Future<Output = ()>,
{
    let store = ExpenseStore::open(config.expense_file())
        .await
        .context("Unable to load the expenses file")?;
    info!("Expenses are stored in {}", store.path().await.display());

    let host = args.host().unwrap_or(config.host());
    let port = args.port().unwrap_or(config.port());
    let addr = resolve(host, port).await?;
    let listener = server::bind(addr).await?;

    let state = AppState::new(store, config.currency());
    server::serve(listener, state, shutdown).await?;
    Ok("The server has stopped".into())
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Unable to resolve the host '{host}'"))
        .pub_result(ErrorType::Config)?
        .next()
        .with_context(|| format!("The host '{host}' did not resolve to any address"))
        .pub_result(ErrorType::Config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for Ctrl-C, the server must be stopped some other way: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::find_error_type;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let env = TestEnv::new().await;
        let args = ServeArgs::new(Some("127.0.0.1".to_string()), Some(0));
        let out = serve_until(env.config(), &args, async {}).await.unwrap();
        assert_eq!(out.message(), "The server has stopped");
    }

    #[tokio::test]
    async fn test_serve_refuses_corrupt_file() {
        let env = TestEnv::new().await;
        std::fs::write(env.config().expenses_path(), "{ not a list").unwrap();
        let args = ServeArgs::new(Some("127.0.0.1".to_string()), Some(0));
        let e = serve_until(env.config(), &args, async {})
            .await
            .unwrap_err();
        assert_eq!(find_error_type(&e), Some(ErrorType::CorruptStore));
    }

    #[tokio::test]
    async fn test_resolve() {
        let addr = resolve("127.0.0.1", 5000).await.unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 5000)));
        assert!(resolve("not a host name", 5000).await.is_err());
    }
}
