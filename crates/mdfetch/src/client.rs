//! Markdown fetch entry points for MdFetch
//!
//! This module routes a URL through the conversion service and, when the
//! service fails, optionally falls back to fetching the URL directly.
//! Network access is delegated to a [`Fetcher`](crate::fetchers::Fetcher).

use crate::error::FetchError;
use crate::fetchers::{Fetcher, HttpFetcher};
use crate::types::{FetchMethod, FetchResult};
use crate::{DEFAULT_MAX_REDIRECTS, DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_MS};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Per-call fetch configuration
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Fetch the original URL directly when the conversion service fails
    pub fallback: bool,
    /// Timeout applied to every request hop
    pub timeout: Duration,
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Conversion service base URL; the target URL is appended to it
    pub service_url: String,
    /// Maximum redirects followed per fetch
    pub max_redirects: usize,
    /// Maximum in-flight fetches in a batch (unbounded when `None`)
    pub max_concurrency: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            fallback: true,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: None,
            service_url: DEFAULT_SERVICE_URL.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_concurrency: None,
        }
    }
}

impl FetchOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the direct fetch fallback
    pub fn fallback(mut self, enable: bool) -> Self {
        self.fallback = enable;
        self
    }

    /// Set the per-hop timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-hop timeout in milliseconds
    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the conversion service base URL
    pub fn service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Set the redirect limit
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Cap the number of concurrent fetches in a batch
    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = Some(max);
        self
    }
}

/// Normalize a user-supplied URL
///
/// Blank input is rejected. Input without an `http://` or `https://` prefix
/// gets `https://` prepended; the result must parse as a URL with a host.
pub fn normalize_url(input: &str) -> Result<String, FetchError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FetchError::MissingUrl);
    }

    let normalized = match explicit_scheme(trimmed) {
        Some(scheme)
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
        {
            trimmed.to_string()
        }
        Some(_) => {
            return Err(FetchError::InvalidUrl {
                url: trimmed.to_string(),
                reason: "must start with http:// or https://".to_string(),
            })
        }
        None => format!("https://{}", trimmed),
    };

    let parsed = parse_url(&normalized)?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(FetchError::InvalidUrl {
            url: normalized,
            reason: "missing host".to_string(),
        });
    }

    Ok(normalized)
}

/// Scheme of `input` if it starts with `<scheme>://`
///
/// A `://` after the first `/`, `?` or `#` belongs to the path or query
/// and does not count.
fn explicit_scheme(input: &str) -> Option<&str> {
    let (scheme, rest) = input.split_once(':')?;
    if !rest.starts_with("//") {
        return None;
    }
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Build the conversion service URL for a normalized target URL
///
/// The target is appended verbatim as a path suffix of the service base.
pub fn conversion_url(service_url: &str, normalized: &str) -> String {
    if service_url.ends_with('/') {
        format!("{}{}", service_url, normalized)
    } else {
        format!("{}/{}", service_url, normalized)
    }
}

/// Fetch a URL as markdown, returning content and metadata
///
/// Uses the built-in [`HttpFetcher`]. For a custom fetcher, use
/// [`fetch_markdown_with`].
pub async fn fetch_markdown(url: &str, options: &FetchOptions) -> Result<FetchResult, FetchError> {
    let fetcher = HttpFetcher::new(options)?;
    fetch_markdown_with(&fetcher, url, options).await
}

/// Fetch a URL as markdown, returning only the content
pub async fn fetch_content(url: &str, options: &FetchOptions) -> Result<String, FetchError> {
    fetch_markdown(url, options)
        .await
        .map(|result| result.content)
}

/// Fetch a URL as markdown using the given fetcher
///
/// Tries the conversion service first. On failure, either returns
/// [`FetchError::ConversionFailed`] (fallback disabled) or fetches the
/// normalized URL directly, returning [`FetchError::DualFetchFailed`] if
/// that fails too.
pub async fn fetch_markdown_with(
    fetcher: &dyn Fetcher,
    url: &str,
    options: &FetchOptions,
) -> Result<FetchResult, FetchError> {
    let normalized = normalize_url(url)?;
    if options.timeout.is_zero() {
        return Err(FetchError::InvalidTimeout);
    }

    let service_url = parse_url(&conversion_url(&options.service_url, &normalized))?;
    let direct_url = parse_url(&normalized)?;

    debug!(fetcher = fetcher.name(), url = %service_url, "Fetching via conversion service");

    let conversion_error = match fetcher.fetch(&service_url, options.timeout).await {
        Ok(body) => {
            return Ok(FetchResult {
                url: normalized,
                method: FetchMethod::Converted,
                tokens: body.tokens,
                content: body.content,
            })
        }
        Err(e) if !options.fallback => return Err(FetchError::ConversionFailed(Box::new(e))),
        Err(e) => e,
    };

    warn!(
        url = %normalized,
        error = %conversion_error,
        "Conversion service failed, falling back to direct fetch"
    );

    match fetcher.fetch(&direct_url, options.timeout).await {
        Ok(body) => Ok(FetchResult {
            url: normalized,
            method: FetchMethod::Direct,
            tokens: None,
            content: body.content,
        }),
        Err(direct) => Err(FetchError::DualFetchFailed {
            direct: Box::new(direct),
            conversion: Box::new(conversion_error),
        }),
    }
}

fn parse_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
