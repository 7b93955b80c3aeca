//! Page fetch failures.
//!
//! Fetches degrade to "no page" for the caller; these errors only exist so
//! the reason can be logged.

use thiserror::Error;

/// Why a page could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The requested URL.
        url: String,
    },

    /// Connection, DNS, TLS, or body read failure.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The requested URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl FetchError {
    /// Classifies a reqwest error into a timeout or a network error.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}
