//! HTTP fetcher implementation
//!
//! This module performs the single HTTP attempt behind every crawl fetch:
//! - building the HTTP client with a proper user agent string
//! - routing the request through the relay pool
//! - dispatching the response body by Content-Type
//! - classifying failures into retryable and non-retryable
//!
//! Retry and backoff live in the coordinator; one call here is exactly one
//! request on the wire, which keeps per-URL attempt counts exact.

use crate::config::UserAgentConfig;
use crate::proxy::ProxyRouter;
use reqwest::{header, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Redirect chain cap; exceeding it fails the URL, not the crawl
const MAX_REDIRECTS: usize = 5;

/// Body of a successfully fetched page, dispatched by Content-Type
#[derive(Debug, Clone)]
pub enum FetchedBody {
    /// HTML, subject to content extraction and link discovery
    Html(String),

    /// Plain text, passed through untouched
    PlainText(String),

    /// JSON, pretty-printed
    Json(String),
}

impl FetchedBody {
    /// The canonical MIME type for this body kind
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Html(_) => "text/html",
            Self::PlainText(_) => "text/plain",
            Self::Json(_) => "application/json",
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Dispatched body
    pub body: FetchedBody,

    /// HTTP status code
    pub status_code: u16,

    /// Raw Content-Type header value
    pub content_type: String,
}

/// Classified fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Unsupported content type '{content_type}' for {url}")]
    UnsupportedContentType { url: String, content_type: String },
}

impl FetchError {
    /// Whether another attempt at this URL could succeed
    ///
    /// Timeouts, network errors, 5xx, and 429 are transient; everything else
    /// fails the URL immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::RedirectLimit { .. } | Self::UnsupportedContentType { .. } => false,
        }
    }
}

/// Builds the HTTP client used for every fetch in a crawl session
///
/// The user agent follows the `Name/Version (+ContactURL; ContactEmail)`
/// convention so site operators can identify and reach the crawler.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout_secs` - Hard per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs exactly one GET for `url` through the relay pool
///
/// On a network-class failure (timeout, connect, body read) the relay that
/// served the request is marked unhealthy; HTTP status errors are attributed
/// to the target site and leave relay health alone.
///
/// A response with no Content-Type header is treated as HTML, which is what
/// servers that omit the header overwhelmingly serve.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `router` - The relay pool to route through
/// * `url` - The target URL
///
/// # Returns
///
/// * `Ok(FetchedPage)` - Status was 2xx and the body type is supported
/// * `Err(FetchError)` - Classified failure for the coordinator to act on
pub async fn fetch_once(
    client: &Client,
    router: &mut ProxyRouter,
    url: &Url,
) -> Result<FetchedPage, FetchError> {
    let routed = router.route(url);
    tracing::trace!("GET {} (via {:?})", routed.url, routed.via);

    let response = match client
        .get(&routed.url)
        .header(
            header::ACCEPT,
            "text/html,application/xhtml+xml,text/plain;q=0.9,application/json;q=0.8,*/*;q=0.5",
        )
        .header(header::CACHE_CONTROL, "no-cache")
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            let error = classify_send_error(&e, url);
            if matches!(error, FetchError::Timeout { .. } | FetchError::Network { .. }) {
                if let Some(via) = &routed.via {
                    router.mark_unhealthy(via);
                }
            }
            return Err(error);
        }
    };

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            if let Some(via) = &routed.via {
                router.mark_unhealthy(via);
            }
            return Err(FetchError::Network {
                url: url.to_string(),
                message: format!("body read failed: {}", e),
            });
        }
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    let body = if essence.is_empty()
        || essence.contains("text/html")
        || essence.contains("application/xhtml")
    {
        FetchedBody::Html(text)
    } else if essence.contains("text/plain") {
        FetchedBody::PlainText(text)
    } else if essence.contains("json") {
        // Pretty-print when the body parses; otherwise pass it through as-is
        let pretty = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or(text);
        FetchedBody::Json(pretty)
    } else {
        return Err(FetchError::UnsupportedContentType {
            url: url.to_string(),
            content_type,
        });
    };

    Ok(FetchedPage {
        body,
        status_code: status.as_u16(),
        content_type,
    })
}

/// Maps a reqwest send error to a classified fetch error
fn classify_send_error(error: &reqwest::Error, url: &Url) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_redirect() {
        FetchError::RedirectLimit {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "connection failed".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
