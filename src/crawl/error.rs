//! Per-link crawl failures.
//!
//! None of these abort a run: the link is reported and skipped.

use thiserror::Error;

use crate::session::SessionError;

/// Why a link produced no records.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The first fetch of the link failed.
    #[error("couldn't connect to {url}")]
    CouldNotConnect {
        /// The link.
        url: String,
    },

    /// No pagination template could be built from the link.
    #[error("{url} appears to be an invalid link")]
    InvalidLink {
        /// The link.
        url: String,
    },

    /// A guest-password album was given without a password.
    #[error("no password for {url}")]
    MissingPassword {
        /// The link.
        url: String,
    },

    /// Guest-password entry failed.
    #[error("authentication failed for {url}: {source}")]
    Authentication {
        /// The link.
        url: String,
        /// The session failure.
        #[source]
        source: SessionError,
    },

    /// The media page did not contain a usable media blob.
    #[error("failed to obtain image from {url}")]
    ImageUnavailable {
        /// The link.
        url: String,
    },

    /// The link is not an album, library or media page, or is not accessible.
    #[error("unsupported link {url}{}", reason.map(|r| format!(": {r}")).unwrap_or_default())]
    Unsupported {
        /// The link.
        url: String,
        /// Known site message found on the page, if any.
        reason: Option<&'static str>,
    },
}

impl CrawlError {
    /// Creates a connection failure.
    pub fn could_not_connect(url: impl Into<String>) -> Self {
        Self::CouldNotConnect { url: url.into() }
    }

    /// Creates an invalid link error.
    pub fn invalid_link(url: impl Into<String>) -> Self {
        Self::InvalidLink { url: url.into() }
    }

    /// Creates a missing password error.
    pub fn missing_password(url: impl Into<String>) -> Self {
        Self::MissingPassword { url: url.into() }
    }

    /// Creates an authentication failure.
    pub fn authentication(url: impl Into<String>, source: SessionError) -> Self {
        Self::Authentication {
            url: url.into(),
            source,
        }
    }

    /// Creates an unavailable image error.
    pub fn image_unavailable(url: impl Into<String>) -> Self {
        Self::ImageUnavailable { url: url.into() }
    }

    /// Creates an unsupported link error.
    pub fn unsupported(url: impl Into<String>, reason: Option<&'static str>) -> Self {
        Self::Unsupported {
            url: url.into(),
            reason,
        }
    }

    /// Returns true for password and login rejections.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::MissingPassword { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display_with_and_without_reason() {
        let with = CrawlError::unsupported("http://site/x", Some("Library is Private."));
        assert_eq!(
            with.to_string(),
            "unsupported link http://site/x: Library is Private."
        );
        let without = CrawlError::unsupported("http://site/x", None);
        assert_eq!(without.to_string(), "unsupported link http://site/x");
    }

    #[test]
    fn test_authentication_is_auth_failure() {
        let error = CrawlError::authentication(
            "http://site/a",
            SessionError::incorrect_password("http://site/a"),
        );
        assert!(error.is_auth_failure());
        assert!(error.to_string().contains("invalid password"));
        assert!(!CrawlError::could_not_connect("http://site/a").is_auth_failure());
    }
}
