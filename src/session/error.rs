//! Error types for session setup, login and guest-password entry.

use thiserror::Error;

/// Errors raised by the session manager.
///
/// Only [`SessionError::ClientBuild`] stops a run; everything else is
/// reported and the affected link skipped.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Builder failure description.
        reason: String,
    },

    /// Transport failure talking to the site.
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The site answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The guest-password form or one of its fields is missing.
    #[error("guest password form not found on {url}")]
    GuestFormMissing {
        /// The album URL.
        url: String,
    },

    /// The site rejected the guest password.
    #[error("invalid password for {url}")]
    IncorrectPassword {
        /// The album URL.
        url: String,
    },

    /// No auth token on the page, so nothing can be posted.
    #[error("no auth token found on {url}")]
    TokenMissing {
        /// The page that lacked the token.
        url: String,
    },

    /// The login POST did not yield the auth cookie.
    #[error("failed to login as {username}")]
    LoginFailed {
        /// The account name.
        username: String,
    },
}

impl SessionError {
    /// Creates a client construction error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a missing guest form error.
    pub fn guest_form_missing(url: impl Into<String>) -> Self {
        Self::GuestFormMissing { url: url.into() }
    }

    /// Creates an incorrect password error.
    pub fn incorrect_password(url: impl Into<String>) -> Self {
        Self::IncorrectPassword { url: url.into() }
    }

    /// Creates a missing token error.
    pub fn token_missing(url: impl Into<String>) -> Self {
        Self::TokenMissing { url: url.into() }
    }

    /// Creates a login failure error.
    pub fn login_failed(username: impl Into<String>) -> Self {
        Self::LoginFailed {
            username: username.into(),
        }
    }

    /// Returns true when the failure is an authentication rejection.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::IncorrectPassword { .. } | Self::LoginFailed { .. } | Self::GuestFormMissing { .. }
        )
    }
}
