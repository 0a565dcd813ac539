//! Maps requests onto the record store and shapes the JSON responses.

use crate::api::{ApiError, Change, Health, EXPENSES_PATH, HEALTH_PATH};
use crate::error::{find_error_type, ErrorType, IntoResult};
use crate::model::{ExpenseDraft, ExpenseId};
use crate::server::AppState;
use crate::{pub_bail, Error, Result};
use anyhow::Context;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use std::error::Error as StdError;
use tracing::{debug, error};

const INDEX_HTML: &str = include_str!("index.html");
const CURRENCY_PLACEHOLDER: &str = "__CURRENCY__";

/// Request bodies larger than this are refused with 413.
pub(crate) const MAX_BODY_BYTES: usize = 100 * 1024;

type Res = Response<Full<Bytes>>;

/// Handles one request. Failures are turned into `{error}` responses here, so this never fails.
pub(crate) async fn handle<B>(request: Request<B>, state: &AppState) -> Res
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = match route(request, state).await {
        Ok(response) => response,
        Err(e) => error_response(&e),
    };
    add_cors_headers(&mut response);

    debug!("{method} {path} -> {}", response.status());
    response
}

async fn route<B>(request: Request<B>, state: &AppState) -> Result<Res>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let path = match request.uri().path().trim_end_matches('/') {
        "" => "/".to_string(),
        p => p.to_string(),
    };

    if *request.method() == Method::OPTIONS {
        return Ok(response(StatusCode::NO_CONTENT, None, Vec::new()));
    }

    match (request.method(), path.as_str()) {
        (&Method::GET, "/" | "/index.html") => Ok(index(state)),
        (_, "/" | "/index.html") => Ok(method_not_allowed()),

        (&Method::GET, HEALTH_PATH) => Ok(json(StatusCode::OK, &Health::ok())),
        (_, HEALTH_PATH) => Ok(method_not_allowed()),

        (&Method::GET, EXPENSES_PATH) => {
            let summary = state.store().list().await;
            Ok(json(StatusCode::OK, &summary))
        }
        (&Method::POST, EXPENSES_PATH) => {
            let draft = read_draft(request.into_body()).await?;
            let (_, summary) = state.store().create(&draft).await?;
            let change = Change::new("Expense added successfully", summary);
            Ok(json(StatusCode::CREATED, &change))
        }
        (_, EXPENSES_PATH) => Ok(method_not_allowed()),

        (method, p) => match p
            .strip_prefix(EXPENSES_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(raw_id) if *method == Method::DELETE => {
                // An id that is not a number cannot belong to any expense.
                let Ok(id) = raw_id.parse::<ExpenseId>() else {
                    pub_bail!(ErrorType::NotFound, "Expense {raw_id} not found");
                };
                let (_, summary) = state.store().delete(id).await?;
                let change = Change::new("Expense deleted successfully", summary);
                Ok(json(StatusCode::OK, &change))
            }
            Some(_) => Ok(method_not_allowed()),
            None => Ok(json(StatusCode::NOT_FOUND, &ApiError::new("Not found"))),
        },
    }
}

/// Reads a create request body of at most `MAX_BODY_BYTES`. An empty body is treated as an empty
/// object, so it fails validation with the usual missing-fields message.
async fn read_draft<B>(body: B) -> Result<ExpenseDraft>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let bytes = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => pub_bail!(
            ErrorType::TooLarge,
            "The request body is larger than {MAX_BODY_BYTES} bytes"
        ),
        Err(e) => pub_bail!(
            ErrorType::Validation,
            "Unable to read the request body: {e}"
        ),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ExpenseDraft::default());
    }
    serde_json::from_slice(&bytes)
        .context("The request body is not a valid expense")
        .pub_result(ErrorType::Validation)
}

fn index(state: &AppState) -> Res {
    let currency = serde_json::to_string(state.currency()).unwrap_or_else(|_| "\"\"".into());
    let html = INDEX_HTML.replace(CURRENCY_PLACEHOLDER, &currency);
    response(
        StatusCode::OK,
        Some("text/html; charset=utf-8"),
        html.into_bytes(),
    )
}

fn error_response(e: &Error) -> Res {
    let status = match find_error_type(e) {
        Some(ErrorType::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorType::NotFound) => StatusCode::NOT_FOUND,
        Some(ErrorType::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {e:#}");
    }
    json(status, &ApiError::new(e.to_string()))
}

fn method_not_allowed() -> Res {
    json(
        StatusCode::METHOD_NOT_ALLOWED,
        &ApiError::new("Method not allowed"),
    )
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> Res {
    match serde_json::to_vec(body) {
        Ok(bytes) => response(status, Some("application/json"), bytes),
        Err(e) => {
            error!("Unable to serialize a response body: {e}");
            response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("application/json"),
                br#"{"error":"Unable to serialize the response"}"#.to_vec(),
            )
        }
    }
}

fn response(status: StatusCode, content_type: Option<&'static str>, body: Vec<u8>) -> Res {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type),
        );
    }
    response
}

fn add_cors_headers(response: &mut Res) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}
