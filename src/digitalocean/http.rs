//! HTTP utilities for DigitalOcean REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Non-success response from the DigitalOcean API
#[derive(Debug, thiserror::Error)]
#[error("{method} {url}: {status} {message}")]
pub struct ApiError {
    pub method: String,
    pub url: String,
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

/// Whether an error chain carries a 404 from the API
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|e| e.downcast_ref::<ApiError>())
        .any(ApiError::is_not_found)
}

/// Pull the human-readable message out of a DigitalOcean error body
/// (`{"id": "not_found", "message": "..."}`), falling back to the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}

/// HTTP client wrapper for DigitalOcean API calls
#[derive(Clone)]
pub struct DoHttpClient {
    client: Client,
}

impl DoHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("do-logsink/{}", crate::VERSION))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);
        self.execute("GET", url, self.client.get(url).bearer_auth(token))
            .await
    }

    /// Make a POST request with a JSON body
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        body: &B,
    ) -> Result<Value> {
        tracing::debug!("POST {}", url);
        self.execute("POST", url, self.client.post(url).bearer_auth(token).json(body))
            .await
    }

    /// Make a PUT request with a JSON body
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        body: &B,
    ) -> Result<Value> {
        tracing::debug!("PUT {}", url);
        self.execute("PUT", url, self.client.put(url).bearer_auth(token).json(body))
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("DELETE {}", url);
        self.execute("DELETE", url, self.client.delete(url).bearer_auth(token))
            .await
    }

    async fn execute(&self, method: &str, url: &str, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only the sanitized/truncated body is logged
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError {
                method: method.to_string(),
                url: url.to_string(),
                status,
                message: error_message(status, &body),
            }
            .into());
        }

        // 204 No Content on update and delete
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

/// User-facing hint for an API error, if the chain carries one
pub fn api_error_hint(error: &anyhow::Error) -> Option<&'static str> {
    let status = error
        .chain()
        .find_map(|e| e.downcast_ref::<ApiError>())?
        .status;

    match status.as_u16() {
        401 => Some("Authentication failed. Check DIGITALOCEAN_TOKEN."),
        403 => Some("Permission denied. Check the token's scopes."),
        404 => Some("Resource not found."),
        422 => Some("Invalid request. Check the logsink attributes."),
        429 => Some("Rate limit exceeded. Please try again later."),
        s if s >= 500 => Some("DigitalOcean API temporarily unavailable. Please try again."),
        _ => None,
    }
}

/// Format a DigitalOcean API error for display
pub fn format_api_error(error: &anyhow::Error) -> String {
    match api_error_hint(error) {
        Some(hint) => format!("{:#}\n{}", error, hint),
        None => format!("{:#}", error),
    }
}
