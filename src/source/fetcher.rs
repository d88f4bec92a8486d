//! HTTP fetcher shared by the built-in adapters
//!
//! This module handles:
//! - Building the HTTP client with a descriptive user agent
//! - Issuing GET requests and reading bodies
//! - Classifying transport errors and status codes into failure kinds

use crate::config::UserAgentConfig;
use crate::source::{FailureKind, FetchOutcome};
use reqwest::Client;
use std::time::Duration;

/// A response body that arrived with a success status
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    pub body: String,
}

/// Builds the HTTP client shared by all adapters
///
/// No overall request timeout is set here: the fallback chain bounds every
/// adapter call individually.
///
/// # Example
///
/// ```no_run
/// use outage_watch::config::UserAgentConfig;
/// use outage_watch::source::build_http_client;
///
/// let config = UserAgentConfig {
///     name: "outage-watch".to_string(),
///     version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body, or the failure it maps to
///
/// | Condition | Failure kind |
/// |-----------|--------------|
/// | Non-2xx status | HttpError |
/// | Request or body read timed out | Timeout |
/// | DNS, connect, TLS or other transport error | Unreachable |
pub async fn fetch_text(client: &Client, url: &str) -> Result<FetchedBody, FetchOutcome> {
    let response = client.get(url).send().await.map_err(classify_error)?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        tracing::debug!("{} answered {}", url, status);
        return Err(FetchOutcome::failure(
            FailureKind::HttpError,
            format!("HTTP {} from {}", status, final_url),
        ));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response.text().await.map_err(classify_error)?;

    Ok(FetchedBody {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}

/// Maps a reqwest error onto the failure taxonomy
pub fn classify_error(error: reqwest::Error) -> FetchOutcome {
    if error.is_timeout() {
        FetchOutcome::failure(FailureKind::Timeout, format!("Request timeout: {}", error))
    } else if error.is_connect() {
        FetchOutcome::failure(
            FailureKind::Unreachable,
            format!("Connection failed: {}", error),
        )
    } else if let Some(status) = error.status() {
        FetchOutcome::failure(FailureKind::HttpError, format!("HTTP {}", status))
    } else {
        FetchOutcome::failure(FailureKind::Unreachable, error.to_string())
    }
}
