// src/checker/probe.rs
// =============================================================================
// This module checks a single bookmark: is it alive, and what is it about?
//
// Key functionality:
// - Makes one HTTP GET request per URL (no retries)
// - Reads <title> and <meta name="description"> from the start of 200 responses
// - Classifies the outcome into one of four statuses
// - Never fails: network errors become a "Dead" result, not an Err
//
// Rust concepts:
// - Traits: `Probe` lets the runner work with fake probers in tests
// - async-trait: async methods on a trait object
// - Enums: To represent the four outcomes
// =============================================================================

use crate::checker::metadata::extract_metadata;
use crate::config::ProbeConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode as HttpStatus};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// Placeholder shown for a missing title or description
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a 200 page that has no description meta tag
pub const NO_DESCRIPTION: &str = "No description found";

/// How much of a 200 body is read looking for metadata. <title> and
/// <meta> live in <head>, so the rest of a large page or file is skipped.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// The four possible outcomes of probing a bookmark.
//
// The serialized names are the labels users see in reports and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeStatus {
    /// HTTP 200 with a title and/or a description
    #[serde(rename = "Active")]
    Active,
    /// HTTP 200, but neither a title nor a description
    #[serde(rename = "Active but no metadata")]
    ActiveNoMetadata,
    /// The server answered with something other than 200
    #[serde(rename = "Inactive")]
    Inactive,
    /// No HTTP answer at all (timeout, DNS, refused connection, bad URL)
    #[serde(rename = "Dead")]
    Dead,
}

impl ProbeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProbeStatus::Active => "Active",
            ProbeStatus::ActiveNoMetadata => "Active but no metadata",
            ProbeStatus::Inactive => "Inactive",
            ProbeStatus::Dead => "Dead",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Either the numeric HTTP status, or a description of why there wasn't one.
//
// #[serde(untagged)] writes the inner value directly, so JSON gets
// `"status_code": 404` or `"status_code": "Request timed out"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusCode {
    Http(u16),
    Failure(String),
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Http(code) => write!(f, "{}", code),
            StatusCode::Failure(reason) => f.write_str(reason),
        }
    }
}

// The result of probing one bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The bookmark URL, exactly as it was received
    pub url: String,
    pub title: String,
    pub description: String,
    pub status: ProbeStatus,
    pub status_code: StatusCode,
    /// Filled in later by the summarizer, if it runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ProbeResult {
    /// Classifies a 200 response from its body
    pub fn from_page(url: &str, html: &str) -> Self {
        let metadata = extract_metadata(html);
        let title = metadata.title.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let description = metadata
            .description
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        if title == NOT_AVAILABLE && description == NO_DESCRIPTION {
            return Self::placeholder(url, ProbeStatus::ActiveNoMetadata, StatusCode::Http(200));
        }

        Self {
            url: url.to_string(),
            title,
            description,
            status: ProbeStatus::Active,
            status_code: StatusCode::Http(200),
            explanation: None,
        }
    }

    /// The server answered, but not with 200
    pub fn inactive(url: &str, code: u16) -> Self {
        Self::placeholder(url, ProbeStatus::Inactive, StatusCode::Http(code))
    }

    /// The request never got an HTTP answer
    pub fn dead(url: &str, reason: impl Into<String>) -> Self {
        let mut reason = reason.into();
        if reason.trim().is_empty() {
            reason = "Unknown network error".to_string();
        }
        Self::placeholder(url, ProbeStatus::Dead, StatusCode::Failure(reason))
    }

    fn placeholder(url: &str, status: ProbeStatus, status_code: StatusCode) -> Self {
        Self {
            url: url.to_string(),
            title: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            status,
            status_code,
            explanation: None,
        }
    }

    /// What to show for this bookmark: the title if we have a real one,
    /// otherwise the URL itself
    pub fn display_text(&self) -> &str {
        if self.title == NOT_AVAILABLE || self.title == "Metadata not accessible" {
            &self.url
        } else {
            &self.title
        }
    }
}

/// Something that can check one URL.
///
/// Implementations must be total: every failure is reported through the
/// returned ProbeResult, never by panicking or erroring.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

// The real prober: one reqwest GET per URL
//
// Client is cheap to clone (it's an Arc internally), so every probe shares
// the same connection settings without sharing any per-request state.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .redirect(redirect)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    /// Overrides the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        log::debug!("Probing {}", url);

        // The timeout covers getting an answer. Reading the body has its own
        // deadline in read_page_prefix.
        let result = tokio::time::timeout(self.timeout, self.client.get(url).send()).await;

        let probed = match result {
            Ok(Ok(response)) => analyze_response(url, response, self.timeout).await,
            Ok(Err(e)) => categorize_error(url, e),
            Err(_) => ProbeResult::dead(
                url,
                format!("Request timed out after {:?}", self.timeout),
            ),
        };

        log::debug!("{} -> {} ({})", url, probed.status, probed.status_code);
        probed
    }
}

// Looks at the HTTP status and, for 200, the start of the body
async fn analyze_response(url: &str, response: Response, timeout: Duration) -> ProbeResult {
    let status_code = response.status();

    if status_code != HttpStatus::OK {
        return ProbeResult::inactive(url, status_code.as_u16());
    }

    let body = read_page_prefix(url, response, timeout).await;
    ProbeResult::from_page(url, &String::from_utf8_lossy(&body))
}

// Reads at most MAX_BODY_BYTES of the body, giving up at the deadline.
//
// The server has already answered 200, so a body that is huge, slow or cut
// off still belongs to a live page: we keep whatever arrived and let the
// metadata decide between Active and Active but no metadata.
async fn read_page_prefix(url: &str, mut response: Response, timeout: Duration) -> Vec<u8> {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut body = Vec::new();

    while body.len() < MAX_BODY_BYTES {
        match tokio::time::timeout_at(deadline, response.chunk()).await {
            Ok(Ok(Some(chunk))) => body.extend_from_slice(&chunk),
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                log::debug!("{}: body read failed after {} bytes: {}", url, body.len(), e);
                break;
            }
            Err(_) => {
                log::debug!(
                    "{}: body still streaming after {:?}, using {} bytes",
                    url,
                    timeout,
                    body.len()
                );
                break;
            }
        }
    }

    body.truncate(MAX_BODY_BYTES);
    body
}

// Turns a reqwest error into a Dead result with a readable reason
fn categorize_error(url: &str, error: reqwest::Error) -> ProbeResult {
    let detail = error_chain(&error);

    let reason = if error.is_timeout() {
        format!("Request timed out: {}", detail)
    } else if error.is_builder() {
        format!("Invalid URL: {}", detail)
    } else if error.is_redirect() {
        format!("Too many redirects: {}", detail)
    } else if error.is_connect() {
        format!("Connection failed: {}", detail)
    } else {
        detail
    };

    ProbeResult::dead(url, reason)
}

// reqwest's Display only shows the outermost error ("error sending request"),
// the useful part (dns error, connection refused) is further down the chain
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why is probe() not a Result?
//    - One bad bookmark must not stop the other few hundred
//    - Every way a request can fail maps to a status, so there's nothing
//      left for the caller to handle
//
// 2. Why only 200 counts as active?
//    - 201/204 and friends don't come back from a plain GET of a bookmark
//      in practice, and when they do there is no page to read metadata from
//    - With redirects followed (the default), a 301 ends up as the status
//      of the final page anyway
//
// 3. What does #[async_trait] do?
//    - Rewrites `async fn probe` into a method returning a boxed future
//    - That makes `Arc<dyn Probe>` possible, which the runner relies on
// -----------------------------------------------------------------------------
