//! Error types for MdFetch

use thiserror::Error;

/// Errors that can occur during fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing or blank
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL could not be parsed or has an unsupported scheme
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Timeout must be a positive duration
    #[error("Invalid timeout: must be greater than zero")]
    InvalidTimeout,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// A single request hop did not complete in time
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Server answered with a non-2xx status
    ///
    /// `reason` is the canonical phrase for `status` ("Unknown" for codes
    /// without one), not the phrase sent by the server.
    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Redirect chain exceeded the configured limit
    #[error("Too many redirects: limit of {max} exceeded")]
    TooManyRedirects { max: usize },

    /// Server redirected to a location that cannot be followed
    #[error("Invalid redirect to '{location}': {reason}")]
    InvalidRedirect { location: String, reason: String },

    /// DNS, connection, TLS or body read failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Conversion service failed and fallback is disabled
    #[error("Conversion service failed: {0}")]
    ConversionFailed(#[source] Box<FetchError>),

    /// Conversion service and direct fetch both failed
    ///
    /// Only the direct failure is part of the message; the conversion
    /// failure is kept in `conversion`.
    #[error("Both conversion service and direct fetch failed: {direct}")]
    DualFetchFailed {
        #[source]
        direct: Box<FetchError>,
        conversion: Box<FetchError>,
    },
}

impl FetchError {
    /// Create an error from a reqwest error
    ///
    /// The message includes the source chain, since reqwest's top-level
    /// message rarely names the actual cause (DNS, refused, TLS).
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        FetchError::Transport(message)
    }

    /// True for errors caused by the caller's input rather than the network
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            FetchError::MissingUrl | FetchError::InvalidUrl { .. } | FetchError::InvalidTimeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::MissingUrl.to_string(),
            "Missing required parameter: url"
        );
        assert_eq!(
            FetchError::Timeout { timeout_ms: 10000 }.to_string(),
            "Request timeout after 10000ms"
        );
        assert_eq!(
            FetchError::HttpStatus {
                status: 500,
                reason: "Internal Server Error".to_string()
            }
            .to_string(),
            "HTTP 500: Internal Server Error"
        );
        assert_eq!(
            FetchError::TooManyRedirects { max: 10 }.to_string(),
            "Too many redirects: limit of 10 exceeded"
        );
    }

    #[test]
    fn test_dual_failure_message_references_direct_error() {
        let err = FetchError::DualFetchFailed {
            direct: Box::new(FetchError::HttpStatus {
                status: 404,
                reason: "Not Found".to_string(),
            }),
            conversion: Box::new(FetchError::Timeout { timeout_ms: 500 }),
        };

        let message = err.to_string();
        assert!(message.contains("HTTP 404: Not Found"));
        assert!(!message.contains("500ms"));
    }

    #[test]
    fn test_conversion_failed_wraps_source() {
        let err = FetchError::ConversionFailed(Box::new(FetchError::Transport(
            "connection refused".to_string(),
        )));
        assert_eq!(
            err.to_string(),
            "Conversion service failed: Request failed: connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_redirect_is_not_input_error() {
        let err = FetchError::InvalidRedirect {
            location: "ftp://files.example/x".to_string(),
            reason: "must start with http:// or https://".to_string(),
        };
        assert!(!err.is_invalid_input());
        assert_eq!(
            err.to_string(),
            "Invalid redirect to 'ftp://files.example/x': must start with http:// or https://"
        );
    }

    #[test]
    fn test_is_invalid_input() {
        assert!(FetchError::MissingUrl.is_invalid_input());
        assert!(FetchError::InvalidTimeout.is_invalid_input());
        assert!(FetchError::InvalidUrl {
            url: "https://".to_string(),
            reason: "empty host".to_string()
        }
        .is_invalid_input());
        assert!(!FetchError::Timeout { timeout_ms: 1 }.is_invalid_input());
        assert!(!FetchError::Transport("dns".to_string()).is_invalid_input());
    }
}
