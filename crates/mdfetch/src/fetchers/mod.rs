//! Fetcher system for timed HTTP retrieval
//!
//! Design: a fetcher performs one logical GET (including redirect hops)
//! against a URL and returns the body plus the service token estimate.
//! Orchestration (conversion service, fallback, batching) lives in
//! [`client`](crate::client) and [`batch`](crate::batch), and only talks to
//! this trait.

mod http;
#[cfg(test)]
pub(crate) mod scripted;

pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Body returned by a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    /// Response body, decoded as UTF-8 (lossy)
    pub content: String,

    /// Value of the `x-markdown-tokens` header, if present and numeric
    pub tokens: Option<u64>,

    /// URL that produced the body, after redirects
    pub final_url: Url,
}

/// Trait for timed content fetchers
///
/// Implementations perform a single GET, follow redirects, and enforce
/// `timeout` on every hop. They never retry; retry policy belongs to the
/// caller.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Fetch the content at `url`
    ///
    /// Resolves with the body of the first 2xx response in the redirect
    /// chain. Non-2xx statuses, timeouts and transport failures are errors.
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedBody, FetchError>;
}
