//! The HTTP server: a hyper HTTP/1.1 server that puts the record store behind the REST API and
//! serves the bundled web page.

mod routes;

use crate::error::{ErrorType, IntoResult};
use crate::store::ExpenseStore;
use crate::Result;
use anyhow::Context;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

pub(crate) use routes::{handle, MAX_BODY_BYTES};

/// Everything a request handler needs. Each connection gets a clone; the store inside is shared.
#[derive(Debug, Clone)]
pub struct AppState {
    store: ExpenseStore,
    currency: String,
}

impl AppState {
    pub fn new(store: ExpenseStore, currency: impl Into<String>) -> Self {
        Self {
            store,
            currency: currency.into(),
        }
    }

    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// Binds `addr` and returns the listener.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))
        .pub_result(ErrorType::Service)
}

/// Serves requests from `listener` until `shutdown` completes. Each connection is handled on its
/// own task; requests in flight when `shutdown` fires are allowed to finish on their tasks.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let local = listener
        .local_addr()
        .context("Unable to read the listening address")
        .pub_result(ErrorType::Service)?;
    info!("Server running on http://{local}");

    tokio::pin!(shutdown);
    loop {
        let (stream, remote) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Unable to accept a connection: {e}");
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("Shutting down the server");
                break;
            }
        };

        debug!("Accepted connection from {remote}");
        let state = state.clone();
        tokio::spawn(async move {
            let service = service_fn(move |request| {
                let state = state.clone();
                async move { Ok::<_, Infallible>(handle(request, &state).await) }
            });
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("Connection from {remote} ended with an error: {e}");
            }
        });
    }
    Ok(())
}
