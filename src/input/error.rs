//! Error types for input loading and target parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or parsing input links.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input file could not be read. Fatal for the run.
    #[error("failed to open input file {path}: {source}")]
    Io {
        /// Path of the input file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The line is not an http(s) URL.
    #[error("invalid link '{line}': {reason}")]
    InvalidUrl {
        /// Offending line (password prefix removed).
        line: String,
        /// Why the line was rejected.
        reason: String,
    },

    /// The link points at a host other than the configured site.
    #[error("link '{url}' is not hosted on {expected_host}")]
    ForeignHost {
        /// The rejected URL.
        url: String,
        /// Host the crawler is configured for.
        expected_host: String,
    },
}

impl InputError {
    /// Creates an IO error for the input file.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-URL error.
    pub fn invalid_url(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// Creates a foreign-host error.
    pub fn foreign_host(url: impl Into<String>, expected_host: impl Into<String>) -> Self {
        Self::ForeignHost {
            url: url.into(),
            expected_host: expected_host.into(),
        }
    }
}
