// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - The Reachability trait: "given a URL, tell me if it works"
// - HttpChecker: the real implementation, built on reqwest
//   - HEAD request first (lightweight, no body download)
//   - Falls back to GET when a server refuses HEAD (405/403/501)
//   - Retries timeouts and connection failures
//   - Detects various failure modes (404, timeout, SSL errors, etc.)
// - check_links: runs many checks concurrently with a limit
//
// Rust concepts:
// - Traits: so tests (and the scanner) can swap in another checker
// - async/await: For concurrent network I/O
// - Enums: To represent different link states
// - Streams: For processing many items concurrently
// =============================================================================

use crate::config::ScanConfig;
use crate::error::ScanError;
use futures::stream::{self, StreamExt}; // StreamExt gives us .buffered()
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use url::Url;

// Pause before retrying a request that timed out or couldn't connect
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Represents the status of a link after checking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    /// Link is working (2xx), or the file exists
    Ok,
    /// Link works but ended up somewhere else
    Redirect { to: String },
    /// Link is broken (404, 410), or the file is missing
    Broken,
    /// Request timed out
    Timeout,
    /// SSL/TLS certificate error
    SslError,
    /// Too many redirects (redirect loop)
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Other error (5xx, connection refused, ...)
    Error,
}

/// The result of checking a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCheckResult {
    /// The URL (or relative path) that was checked
    pub url: String,
    #[serde(flatten)] // This merges the LinkStatus fields into LinkCheckResult
    pub status: LinkStatus,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LinkCheckResult {
    pub fn new(url: impl Into<String>, status: LinkStatus, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            message: Some(message.into()),
        }
    }

    /// Returns true for Ok and Redirect statuses
    pub fn is_ok(&self) -> bool {
        matches!(self.status, LinkStatus::Ok | LinkStatus::Redirect { .. })
    }
}

// Anything that can tell us whether a URL is reachable
//
// The scanner only talks to this trait, never to reqwest directly, so the
// network part can be replaced (a stub in tests, a throttled wrapper in
// the scanner, a cache, ...).
pub trait Reachability: Send + Sync {
    fn check(&self, url: String) -> impl Future<Output = LinkCheckResult> + Send;
}

// The real checker: one shared reqwest client (connection pooling) plus
// the retry setting
pub struct HttpChecker {
    client: Client,
    retries: u8,
}

impl HttpChecker {
    // Builds the HTTP client from the scan settings
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            retries: config.retries,
        })
    }

    // Sends one request, retrying transient failures
    async fn send(&self, method: reqwest::Method, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let mut attempt = 0;
        loop {
            match self.client.request(method.clone(), url).send().await {
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(url, attempt, "retrying after: {}", e);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                result => return result,
            }
        }
    }
}

impl Reachability for HttpChecker {
    fn check(&self, url: String) -> impl Future<Output = LinkCheckResult> + Send {
        async move { self.check_single_link(url).await }
    }
}

impl HttpChecker {
    // Checks a single link
    //
    // Tries HEAD first. Some servers answer HEAD with 405 (or 403/501) even
    // though the page is fine, so those get a second chance with GET.
    async fn check_single_link(&self, url: String) -> LinkCheckResult {
        let mut result = self.send(reqwest::Method::HEAD, &url).await;

        let head_refused = matches!(
            result.as_ref().map(|response| response.status()),
            Ok(StatusCode::METHOD_NOT_ALLOWED | StatusCode::FORBIDDEN | StatusCode::NOT_IMPLEMENTED)
        );
        if head_refused {
            tracing::debug!(url = %url, "HEAD refused, retrying with GET");
            result = self.send(reqwest::Method::GET, &url).await;
        }

        let checked = match result {
            Ok(response) => analyze_response(url, response),
            Err(e) => categorize_error(url, e),
        };
        tracing::debug!(url = %checked.url, ok = checked.is_ok(), "checked");
        checked
    }
}

// Checks multiple links concurrently
//
// Up to `concurrency` checks run at once. Results come back in the same
// order as `urls`, so reports look the same from run to run. A failing
// check is just a result; it never stops the others.
pub async fn check_links<R: Reachability>(
    checker: &R,
    urls: Vec<String>,
    concurrency: usize,
) -> Vec<LinkCheckResult> {
    stream::iter(urls)
        .map(|url| checker.check(url))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

// Analyzes an HTTP response to determine link status
//
// HTTP status codes:
// - 200-299: Success (a redirect may have been followed to get there)
// - 300-399: Redirect we didn't follow
// - 404/410: Broken
// - everything else: Error
fn analyze_response(url: String, response: reqwest::Response) -> LinkCheckResult {
    let status_code = response.status();
    let code = format!("HTTP {}", status_code.as_u16());

    if status_code.is_success() {
        // reqwest followed redirects for us; compare where we ended up
        let landed = response.url();
        if Url::parse(&url).map_or(false, |requested| requested != *landed) {
            let to = landed.to_string();
            return LinkCheckResult::new(
                url,
                LinkStatus::Redirect { to: to.clone() },
                format!("{} -> {}", code, to),
            );
        }
        LinkCheckResult::new(url, LinkStatus::Ok, code)
    } else if status_code.is_redirection() {
        // Try to get the Location header to show where it redirects to
        let to = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let message = format!("{} -> {}", code, to);
        LinkCheckResult::new(url, LinkStatus::Redirect { to }, message)
    } else if matches!(status_code, StatusCode::NOT_FOUND | StatusCode::GONE) {
        LinkCheckResult::new(url, LinkStatus::Broken, code)
    } else {
        // e.g. 500 server errors or 429 rate limiting: not proof the link
        // is dead, but not healthy either
        LinkCheckResult::new(url, LinkStatus::Error, code)
    }
}

// Categorizes different error types from reqwest
fn categorize_error(url: String, error: reqwest::Error) -> LinkCheckResult {
    let error_string = error.to_string().to_lowercase();

    let (status, message) = if error.is_timeout() {
        (LinkStatus::Timeout, "Request timed out".to_string())
    } else if error.is_redirect() {
        (LinkStatus::TooManyRedirects, "Too many redirects".to_string())
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            (LinkStatus::DnsError, "Could not resolve hostname".to_string())
        } else {
            (LinkStatus::Error, "Connection failed".to_string())
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        (LinkStatus::SslError, "SSL certificate error".to_string())
    } else {
        (LinkStatus::Error, error.to_string())
    };

    LinkCheckResult::new(url, status, message)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a trait instead of calling reqwest directly?
//    - The link extractor and scanner don't care HOW a URL is probed
//    - Tests can plug in a checker that never touches the network
//
// 2. `impl Future<Output = ...> + Send` in a trait
//    - The returned future has to be Send so tokio may move it between
//      worker threads; spelling it out in the trait makes every
//      implementation promise that
//
// 3. buffered vs buffer_unordered
//    - Both run up to N futures at once
//    - buffered hands results back in input order, which keeps the
//      report stable; buffer_unordered would return them as they finish
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn checker() -> HttpChecker {
        let config = ScanConfig {
            retries: 0,
            timeout_secs: 5,
            ..ScanConfig::default()
        };
        HttpChecker::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_ok_link() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = checker().check(format!("{}/ok", server.uri())).await;
        assert_eq!(result.status, LinkStatus::Ok);
        assert_eq!(result.message.as_deref(), Some("HTTP 200"));
    }

    #[tokio::test]
    async fn test_not_found_is_broken() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = checker().check(format!("{}/missing", server.uri())).await;
        assert_eq!(result.status, LinkStatus::Broken);
        assert!(!result.is_ok());
    }

    #[tokio::test]
    async fn test_server_error_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = checker().check(format!("{}/boom", server.uri())).await;
        assert_eq!(result.status, LinkStatus::Error);
    }

    #[tokio::test]
    async fn test_head_refused_falls_back_to_get() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = checker().check(format!("{}/no-head", server.uri())).await;
        assert_eq!(result.status, LinkStatus::Ok);
    }

    #[tokio::test]
    async fn test_followed_redirect_is_reported() {
        let server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
            .mount(&server)
            .await;
        Mock::given(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = checker().check(format!("{}/old", server.uri())).await;
        assert_eq!(
            result.status,
            LinkStatus::Redirect {
                to: format!("{}/new", server.uri())
            }
        );
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_not_ok() {
        // Nothing listens on port 1
        let result = checker().check("http://127.0.0.1:1/".to_string()).await;
        assert!(!result.is_ok());
    }

    struct Stub;

    impl Reachability for Stub {
        fn check(&self, url: String) -> impl Future<Output = LinkCheckResult> + Send {
            async move {
                let status = if url.contains("good") {
                    LinkStatus::Ok
                } else {
                    LinkStatus::Broken
                };
                LinkCheckResult::new(url, status, "stub")
            }
        }
    }

    #[tokio::test]
    async fn test_check_links_keeps_input_order() {
        let urls = vec![
            "https://good.example.com/1".to_string(),
            "https://bad.example.com/2".to_string(),
            "https://good.example.com/3".to_string(),
        ];

        let results = check_links(&Stub, urls.clone(), 2).await;
        let checked: Vec<_> = results.iter().map(|r| r.url.clone()).collect();
        assert_eq!(checked, urls);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
    }

    #[test]
    fn test_link_result_is_ok() {
        let ok_result = LinkCheckResult::new("https://example.com", LinkStatus::Ok, "HTTP 200");
        assert!(ok_result.is_ok());

        let broken_result = LinkCheckResult::new("https://example.com", LinkStatus::Broken, "HTTP 404");
        assert!(!broken_result.is_ok());
    }

    #[test]
    fn test_status_serializes_flat() {
        let result = LinkCheckResult::new(
            "https://a.example.com",
            LinkStatus::Redirect {
                to: "https://b.example.com/".to_string(),
            },
            "HTTP 200 -> https://b.example.com/",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "redirect");
        assert_eq!(json["to"], "https://b.example.com/");
        assert_eq!(json["url"], "https://a.example.com");
    }
}
