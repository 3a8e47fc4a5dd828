#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Document fetching and page-level table primitives.
//!
//! Provides the [`DocumentFetcher`] trait (with the `reqwest`-backed
//! [`HttpFetcher`] and the in-memory [`MemoryFetcher`]), plus parsers that
//! turn fetched documents into [`drug_nme_approval_models::PageTable`]s:
//! HTML tables ([`html_table`]) and CSV files ([`csv_table`]). Link
//! discovery on listing pages lives in [`links`].
//!
//! This crate knows nothing about FDA page layouts; it only fetches bytes
//! and splits them into rows and cells.

pub mod csv_table;
pub mod html_table;
pub mod links;
pub mod progress;

use std::collections::BTreeMap;

use progress::ProgressCallback;

/// Errors that can occur while fetching or parsing documents.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// URL that was requested.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// Parsing the response body failed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A listing page contained no link matching the expected pattern.
    #[error("No link matching '{pattern}' found on {url}")]
    NoMatchingLinks {
        /// Listing page that was scanned.
        url: String,
        /// Description of what was looked for.
        pattern: String,
    },
}

/// Fetches raw documents by URL.
///
/// Implementations report download progress in bytes through the given
/// [`ProgressCallback`].
pub trait DocumentFetcher: Send + Sync {
    /// Downloads the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the request fails or the server answers
    /// with a non-success status.
    fn fetch(
        &self,
        url: &str,
        progress: &dyn ProgressCallback,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, ScrapeError>> + Send;
}

/// [`DocumentFetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Browser-like user agent; some government sites reject the default.
    pub const USER_AGENT: &'static str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

    /// Creates a fetcher with no extra headers.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the client cannot be built.
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_headers(&BTreeMap::new())
    }

    /// Creates a fetcher that sends `headers` with every request.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Parse`] for an invalid header name or value,
    /// or [`ScrapeError::Http`] if the client cannot be built.
    pub fn with_headers(headers: &BTreeMap<String, String>) -> Result<Self, ScrapeError> {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in headers {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| ScrapeError::Parse(format!("invalid header name '{key}': {e}")))?;
            let val = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| ScrapeError::Parse(format!("invalid header value '{value}': {e}")))?;
            header_map.insert(name, val);
        }
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .default_headers(header_map)
            .build()?;
        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<u8>, ScrapeError> {
        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        if let Some(total) = response.content_length() {
            progress.set_total(total);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            progress.inc(chunk.len() as u64);
            body.extend_from_slice(&chunk);
        }

        log::debug!("Downloaded {} bytes from {url}", body.len());
        Ok(body)
    }
}

/// [`DocumentFetcher`] serving canned documents from memory.
///
/// Unknown URLs answer with HTTP 404. Useful for replaying saved pages and
/// for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: BTreeMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    /// Creates an empty fetcher.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: BTreeMap::new(),
        }
    }

    /// Serves `body` for `url`.
    #[must_use]
    pub fn with_document(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(url.to_owned(), body.into());
        self
    }
}

impl DocumentFetcher for MemoryFetcher {
    async fn fetch(
        &self,
        url: &str,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<u8>, ScrapeError> {
        let body = self
            .documents
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Status {
                url: url.to_owned(),
                status: 404,
            })?;
        progress.set_total(body.len() as u64);
        progress.inc(body.len() as u64);
        Ok(body)
    }
}

/// Fetches `url` and decodes the body as UTF-8 text (lossily).
///
/// # Errors
///
/// Returns [`ScrapeError`] if the fetch fails.
pub async fn fetch_text(
    fetcher: &impl DocumentFetcher,
    url: &str,
    progress: &dyn ProgressCallback,
) -> Result<String, ScrapeError> {
    let bytes = fetcher.fetch(url, progress).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetches `url` and parses the body as JSON.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the fetch fails or the body is not JSON.
pub async fn fetch_json(
    fetcher: &impl DocumentFetcher,
    url: &str,
    progress: &dyn ProgressCallback,
) -> Result<serde_json::Value, ScrapeError> {
    let bytes = fetcher.fetch(url, progress).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
