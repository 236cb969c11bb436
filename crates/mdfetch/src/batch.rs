//! Concurrent batch fetching
//!
//! Every URL is fetched through [`fetch_markdown_with`], concurrently on the
//! current task. Failures are recorded per entry and never abort the batch.

use crate::client::{fetch_markdown_with, FetchOptions};
use crate::fetchers::{Fetcher, HttpFetcher};
use crate::types::BatchEntry;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::debug;

/// Counts of successful and failed entries in a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Summarize a batch result
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let succeeded = entries.iter().filter(|e| e.is_ok()).count();
        Self {
            total: entries.len(),
            succeeded,
            failed: entries.len() - succeeded,
        }
    }
}

/// Fetch several URLs, returning one entry per URL in input order
///
/// Uses the built-in [`HttpFetcher`]. If the HTTP client cannot be built,
/// every entry carries that error.
pub async fn fetch_batch<S: AsRef<str>>(urls: &[S], options: &FetchOptions) -> Vec<BatchEntry> {
    match HttpFetcher::new(options) {
        Ok(fetcher) => fetch_batch_with(&fetcher, urls, options).await,
        Err(e) => {
            let message = e.to_string();
            urls.iter()
                .map(|url| BatchEntry::failure(url.as_ref(), message.clone()))
                .collect()
        }
    }
}

/// Fetch several URLs using the given fetcher
///
/// All fetches are in flight at once unless `options.max_concurrency` caps
/// them. The output always matches the input order.
pub async fn fetch_batch_with<S: AsRef<str>>(
    fetcher: &dyn Fetcher,
    urls: &[S],
    options: &FetchOptions,
) -> Vec<BatchEntry> {
    let tasks = urls.iter().map(|url| {
        let url = url.as_ref();
        async move {
            match fetch_markdown_with(fetcher, url, options).await {
                Ok(result) => BatchEntry::success(url, result),
                Err(e) => {
                    debug!(url, error = %e, "Batch entry failed");
                    BatchEntry::failure(url, e.to_string())
                }
            }
        }
    });

    match options.max_concurrency {
        Some(limit) => stream::iter(tasks).buffered(limit.max(1)).collect().await,
        None => join_all(tasks).await,
    }
}
