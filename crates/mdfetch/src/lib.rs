//! MdFetch - token-efficient web content fetching
//!
//! This crate fetches web pages as markdown by routing requests through a
//! conversion service (by default [markdown.new](https://markdown.new/)),
//! and falls back to fetching the page directly when the service fails.
//!
//! ## Entry points
//!
//! - [`fetch_markdown`] - fetch one URL, returning a [`FetchResult`] with metadata
//! - [`fetch_content`] - fetch one URL, returning only the content
//! - [`fetch_batch`] - fetch many URLs concurrently, one [`BatchEntry`] per URL
//!
//! ## Fetcher System
//!
//! Network access goes through the [`Fetcher`] trait. [`HttpFetcher`] is the
//! built-in implementation: a single GET with a per-hop timeout and manual
//! redirect following. Custom fetchers can be supplied via
//! [`fetch_markdown_with`].

pub mod batch;
pub mod client;
mod error;
pub mod fetchers;
mod types;

pub use batch::{fetch_batch, fetch_batch_with, BatchSummary};
pub use client::{
    conversion_url, fetch_content, fetch_markdown, fetch_markdown_with, normalize_url,
    FetchOptions,
};
pub use error::FetchError;
pub use fetchers::{FetchedBody, Fetcher, HttpFetcher};
pub use types::{BatchEntry, FetchMethod, FetchResult};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns MdFetch/1.0";

/// Default conversion service base URL
pub const DEFAULT_SERVICE_URL: &str = "https://markdown.new/";

/// Response header carrying the service's token estimate
pub const TOKENS_HEADER: &str = "x-markdown-tokens";

/// Default per-hop timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default maximum number of redirects followed per fetch
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# MdFetch Tool

Fetches a web page as markdown through a conversion service, falling back to
fetching the page directly when the service is unavailable.

## Capabilities
- Markdown conversion via https://markdown.new/ (configurable)
- Estimated token count from the `x-markdown-tokens` response header
- Direct fetch fallback (raw content, no token count)
- Per-hop timeout with redirect following
- Concurrent batch fetching with per-URL errors

## Commands
- `mdfetch fetch <URL>`: fetch one URL
- `mdfetch batch <URL>...`: fetch several URLs concurrently

## Options
- `--output md|json`: markdown with frontmatter (default) or JSON
- `--no-fallback`: fail instead of fetching the page directly
- `--timeout-ms N`: per-hop timeout (default: 10000)
- `--service-url URL`: conversion service base URL
- `--user-agent UA`: custom User-Agent
- `--concurrency N`: (batch) maximum in-flight fetches

## Output Fields
- `url`: The normalized URL (https:// is added when no scheme is given)
- `method`: "converted" (via service) or "direct" (fallback)
- `tokens`: Estimated token count, only for converted content
- `content`: The fetched content

## Examples

### Fetch a page as markdown
```
mdfetch fetch example.com
```

### Fetch several pages as JSON
```
mdfetch batch https://example.com https://www.rust-lang.org --output json
```

## Error Handling
- Empty or unparseable URLs are rejected before any request is made
- Non-2xx status, timeouts and connection failures on the service trigger the fallback
- When both the service and the direct fetch fail, the direct failure is reported
"#;
