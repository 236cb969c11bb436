//! HTTP fetcher
//!
//! Issues plain GET requests with reqwest. Automatic redirects are disabled
//! so that each hop gets its own timeout budget.

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::fetchers::{FetchedBody, Fetcher};
use crate::{DEFAULT_USER_AGENT, TOKENS_HEADER};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Outcome of a single request hop
enum Hop {
    Redirect(Url),
    Done(FetchedBody),
}

/// Default HTTP fetcher
///
/// Handles HTTP/HTTPS URLs with:
/// - A configurable User-Agent
/// - Manual redirect following, bounded by `max_redirects`
/// - The same timeout applied to every hop (no cumulative deadline)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_redirects: usize,
}

impl HttpFetcher {
    /// Create a fetcher configured from `options`
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/markdown, text/html, text/plain, */*;q=0.8"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(Policy::none())
            .build()
            .map_err(FetchError::ClientBuildError)?;

        Ok(Self {
            client,
            max_redirects: options.max_redirects,
        })
    }

    async fn fetch_hop(&self, url: &Url) -> Result<Hop, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();

        if status.is_redirection() {
            if let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
            {
                let next = url.join(location).map_err(|e| FetchError::InvalidRedirect {
                    location: location.to_string(),
                    reason: e.to_string(),
                })?;
                return Ok(Hop::Redirect(next));
            }
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let tokens = parse_tokens_header(response.headers());
        let body = read_body(response).await?;

        Ok(Hop::Done(FetchedBody {
            content: String::from_utf8_lossy(&body).into_owned(),
            tokens,
            final_url: url.clone(),
        }))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedBody, FetchError> {
        if timeout.is_zero() {
            return Err(FetchError::InvalidTimeout);
        }
        if let Some(reason) = unfetchable_reason(url) {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: reason.to_string(),
            });
        }

        let mut current = url.clone();
        let mut redirects = 0;

        loop {
            // Dropping the hop future on expiry aborts the in-flight request
            let hop = match tokio::time::timeout(timeout, self.fetch_hop(&current)).await {
                Ok(hop) => hop?,
                Err(_) => {
                    let timeout_ms = millis(timeout);
                    warn!(url = %current, timeout_ms, "Request timed out");
                    return Err(FetchError::Timeout { timeout_ms });
                }
            };

            match hop {
                Hop::Done(body) => return Ok(body),
                Hop::Redirect(next) => {
                    if redirects >= self.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            max: self.max_redirects,
                        });
                    }
                    redirects += 1;
                    if let Some(reason) = unfetchable_reason(&next) {
                        return Err(FetchError::InvalidRedirect {
                            location: next.to_string(),
                            reason: reason.to_string(),
                        });
                    }
                    debug!(from = %current, to = %next, hop = redirects, "Following redirect");
                    current = next;
                }
            }
        }
    }
}

/// Why `url` cannot be fetched; only http and https URLs with a host can
fn unfetchable_reason(url: &Url) -> Option<&'static str> {
    if !matches!(url.scheme(), "http" | "https") {
        Some("must start with http:// or https://")
    } else if url.host_str().map_or(true, str::is_empty) {
        Some("missing host")
    } else {
        None
    }
}

/// Duration in whole milliseconds, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Parse the token estimate header; non-numeric values are ignored
fn parse_tokens_header(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get(TOKENS_HEADER)?.to_str().ok()?.trim();
    match raw.parse() {
        Ok(tokens) => Some(tokens),
        Err(_) => {
            debug!(value = raw, "Ignoring non-numeric token count header");
            None
        }
    }
}

/// Read the full response body
async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => body.extend_from_slice(&bytes),
            Err(e) => {
                error!("Error reading body chunk: {}", e);
                return Err(FetchError::from_reqwest(e));
            }
        }
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_tokens(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TOKENS_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_tokens_header() {
        assert_eq!(parse_tokens_header(&headers_with_tokens("42")), Some(42));
        assert_eq!(parse_tokens_header(&headers_with_tokens(" 7 ")), Some(7));
        assert_eq!(parse_tokens_header(&headers_with_tokens("lots")), None);
        assert_eq!(parse_tokens_header(&headers_with_tokens("-3")), None);
        assert_eq!(parse_tokens_header(&HeaderMap::new()), None);
    }

    #[test]
    fn test_unfetchable_reason() {
        assert_eq!(unfetchable_reason(&Url::parse("https://example.com").unwrap()), None);
        assert_eq!(unfetchable_reason(&Url::parse("http://127.0.0.1:8080/a").unwrap()), None);
        assert_eq!(
            unfetchable_reason(&Url::parse("ftp://example.com/file").unwrap()),
            Some("must start with http:// or https://")
        );
        assert!(unfetchable_reason(&Url::parse("file:///etc/hosts").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_input_error() {
        let fetcher = HttpFetcher::new(&FetchOptions::default()).unwrap();
        let url = Url::parse("ftp://example.com/file").unwrap();
        let err = fetcher.fetch(&url, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_zero_timeout_rejected() {
        let fetcher = HttpFetcher::new(&FetchOptions::default()).unwrap();
        let url = Url::parse("https://example.com").unwrap();
        let result = fetcher.fetch(&url, Duration::ZERO).await;
        assert!(matches!(result, Err(FetchError::InvalidTimeout)));
    }

    #[test]
    fn test_http_fetcher_name() {
        let fetcher = HttpFetcher::new(&FetchOptions::default()).unwrap();
        assert_eq!(fetcher.name(), "http");
        assert_eq!(fetcher.max_redirects, crate::DEFAULT_MAX_REDIRECTS);
    }
}
