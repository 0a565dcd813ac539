//! A client for the REST API, used by the terminal commands.

use crate::api::{ApiError, Change, Health, EXPENSES_PATH, HEALTH_PATH};
use crate::error::{ErrorType, IntoResult};
use crate::model::{ExpenseDraft, ExpenseId, Summary};
use crate::{pub_bail, Result};
use anyhow::Context;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Talks to a running expense tracker server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the server at `base_url`, e.g. `http://localhost:5000`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid server URL '{base_url}'"))
            .pub_result(ErrorType::Config)?;
        if base.cannot_be_a_base() {
            pub_bail!(ErrorType::Config, "Invalid server URL '{base_url}'");
        }
        // The server is usually on this machine; do not route it through a system proxy.
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .context("Unable to create an HTTP client")
            .pub_result(ErrorType::Service)?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn health(&self) -> Result<Health> {
        let response = self.send(self.http.get(self.url(HEALTH_PATH)?)).await?;
        read(response).await
    }

    pub async fn fetch_expenses(&self) -> Result<Summary> {
        let response = self.send(self.http.get(self.url(EXPENSES_PATH)?)).await?;
        read(response).await
    }

    pub async fn create_expense(&self, draft: &ExpenseDraft) -> Result<Change> {
        let request = self.http.post(self.url(EXPENSES_PATH)?).json(draft);
        let response = self.send(request).await?;
        read(response).await
    }

    pub async fn delete_expense(&self, id: ExpenseId) -> Result<Change> {
        let path = format!("{EXPENSES_PATH}/{id}");
        let response = self.send(self.http.delete(self.url(&path)?)).await?;
        read(response).await
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("Unable to build a URL from '{}' and '{path}'", self.base))
            .pub_result(ErrorType::Service)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Unable to reach the expense tracker server at {}", self.base))
            .pub_result(ErrorType::Service)?;
        debug!("{} -> {}", response.url(), response.status());
        Ok(response)
    }
}

/// Decodes a successful response, or turns the server's `{error}` body into an error tagged
/// with the matching `ErrorType`.
async fn read<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .context("The server sent a response that could not be understood")
            .pub_result(ErrorType::Service);
    }

    let message = match response.json::<ApiError>().await {
        Ok(body) => body.error,
        Err(_) => format!("The server responded with {status}"),
    };
    let error_type = match status {
        StatusCode::BAD_REQUEST => ErrorType::Validation,
        StatusCode::NOT_FOUND => ErrorType::NotFound,
        StatusCode::PAYLOAD_TOO_LARGE => ErrorType::TooLarge,
        _ => ErrorType::Service,
    };
    pub_bail!(error_type, "{message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::find_error_type;
    use crate::model::Amount;
    use crate::test::TestServer;
    use std::str::FromStr;

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:someone@example.com").is_err());
        assert!(ApiClient::new("http://localhost:5000").is_ok());
    }

    #[tokio::test]
    async fn test_round_trip_against_server() {
        let server = TestServer::start().await;
        let client = server.client();

        assert_eq!(client.health().await.unwrap().status, "ok");

        let empty = client.fetch_expenses().await.unwrap();
        assert_eq!(empty.count(), 0);

        let draft = ExpenseDraft::new(
            "Coffee",
            "Food",
            Amount::from_str("4.5").unwrap(),
            "2024-01-01",
        );
        let change = client.create_expense(&draft).await.unwrap();
        assert_eq!(change.message, "Expense added successfully");
        assert_eq!(change.total_amount, Amount::from_str("4.5").unwrap());
        assert_eq!(change.expenses.len(), 1);
        let id = change.expenses[0].id();

        let listed = client.fetch_expenses().await.unwrap();
        assert_eq!(listed.expenses(), change.expenses.as_slice());

        let change = client.delete_expense(id).await.unwrap();
        assert!(change.expenses.is_empty());
        assert!(change.total_amount.is_zero());

        let e = client.delete_expense(id).await.unwrap_err();
        assert_eq!(find_error_type(&e), Some(ErrorType::NotFound));
        assert_eq!(e.to_string(), format!("Expense {id} not found"));
    }

    #[tokio::test]
    async fn test_validation_error_message() {
        let server = TestServer::start().await;
        let draft = ExpenseDraft {
            description: Some("Coffee".into()),
            ..Default::default()
        };
        let e = server.client().create_expense(&draft).await.unwrap_err();
        assert_eq!(find_error_type(&e), Some(ErrorType::Validation));
        assert_eq!(e.to_string(), "All fields are required");
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let server = TestServer::start().await;
        let draft = ExpenseDraft::new(
            "x".repeat(crate::server::MAX_BODY_BYTES),
            "Food",
            Amount::from_str("1").unwrap(),
            "2024-01-01",
        );
        let e = server.client().create_expense(&draft).await.unwrap_err();
        assert_eq!(find_error_type(&e), Some(ErrorType::TooLarge));
        assert!(server.env().store().list().await.expenses().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Bind and drop a listener to find a port that nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&format!("http://{addr}")).unwrap();
        let e = client.fetch_expenses().await.unwrap_err();
        assert_eq!(find_error_type(&e), Some(ErrorType::Service));
        assert!(e.to_string().contains("Unable to reach"));
    }
}
