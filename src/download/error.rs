//! Error types for the download phase.
//!
//! Network-side failures skip the affected record. [`DownloadError::Io`] is
//! the only variant that aborts the phase.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while saving media.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Connection, DNS, TLS, or body read failure.
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The media URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The media URL.
        url: String,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The media URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Local file system failure.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The media URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network error, classifying timeouts separately.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
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

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns true when the error must stop the download phase.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
