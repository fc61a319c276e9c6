//! Blocking JSON-over-HTTP client.
//!
//! Health checks and snapshot fetching only ever issue GETs that must
//! return a JSON body, so the seam is a single method.

use crate::error::{Error, ErrorCode, Result};
use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;

/// Timeout applied to every JSON GET.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Source of JSON documents addressed by URL.
pub trait JsonSource {
    fn get_json(&self, url: &str) -> Result<Value>;
}

fn http_error(url: &str, e: reqwest::Error) -> Error {
    Error::remote_request_failed(url, e.to_string())
}

fn api_error(url: &str, status: u16, body: &str) -> Error {
    Error::new(
        ErrorCode::RemoteRequestFailed,
        format!("API error: HTTP {}", status),
        json!({ "url": url, "status": status, "body": body }),
    )
}

fn parse_error(url: &str, msg: impl Into<String>) -> Error {
    Error::new(
        ErrorCode::InternalJsonError,
        msg,
        json!({ "url": url }),
    )
}

/// `reqwest` implementation of [`JsonSource`].
pub struct HttpJsonClient {
    client: Client,
}

impl HttpJsonClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal_unexpected(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { client })
    }
}

impl JsonSource for HttpJsonClient {
    fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| http_error(url, e))?;
        parse_json_response(url, response)
    }
}

fn parse_json_response(url: &str, response: Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().map_err(|e| http_error(url, e))?;

    if !status.is_success() {
        return Err(api_error(url, status.as_u16(), &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| parse_error(url, format!("Invalid JSON response: {}", e)))
}

/// Join a configured base URL and an endpoint path, ignoring trailing slashes
/// on the base.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
