//! Core types for MdFetch

use serde::{Deserialize, Serialize};

/// How the content of a [`FetchResult`] was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    /// Markdown returned by the conversion service
    Converted,
    /// Raw content fetched from the original URL after the service failed
    Direct,
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMethod::Converted => write!(f, "converted"),
            FetchMethod::Direct => write!(f, "direct"),
        }
    }
}

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// The normalized source URL
    pub url: String,

    /// How the content was obtained
    pub method: FetchMethod,

    /// Estimated token count reported by the conversion service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,

    /// The fetched content
    pub content: String,
}

/// Outcome of one URL in a batch
///
/// Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// The URL as given by the caller
    pub url: String,

    /// Fetch result on success
    pub result: Option<FetchResult>,

    /// Error message on failure
    pub error: Option<String>,
}

impl BatchEntry {
    pub(crate) fn success(url: impl Into<String>, result: FetchResult) -> Self {
        Self {
            url: url.into(),
            result: Some(result),
            error: None,
        }
    }

    pub(crate) fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    /// True if the fetch succeeded
    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}
