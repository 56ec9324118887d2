//! HTTP client construction

use crate::config::SourceConfig;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// Connect timeout ceiling; never longer than the per-call timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client for the content server
///
/// Every request carries the configured browser-like `User-Agent` and a JSON
/// content type, and is bounded by the configured per-call timeout.
///
/// # Example
///
/// ```no_run
/// use transcript_harvester::config::SourceConfig;
/// use transcript_harvester::remote::build_http_client;
///
/// let client = build_http_client(&SourceConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let timeout = config.timeout();

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}
