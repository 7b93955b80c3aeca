//! Page fetching with end-of-album detection.
//!
//! The site answers requests for pages past the end of an album with a
//! redirect to the album's base URL. A fetch that asks for end detection
//! therefore checks whether the final URL still carries a `page` query key
//! and reports [`Page::EndMarker`] when it does not.

mod error;

pub use error::FetchError;

use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use crate::extract::SubAlbumRef;
use crate::session::{Session, SessionError};

/// Query key holding the page number.
pub const PAGE_KEY: &str = "page";

/// Query parameter the pagination template increments.
pub const PAGE_PARAM: &str = "page=";

/// Returns true when the query of `url` has the given key.
#[must_use]
pub fn has_query_key(url: &Url, key: &str) -> bool {
    url.query_pairs().any(|(name, _)| name == key)
}

/// Outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Page body.
    Content(String),
    /// The requested page index is beyond the last page.
    EndMarker,
}

impl Page {
    /// Page body, or `None` for the end marker.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Content(content) => Some(content),
            Self::EndMarker => None,
        }
    }
}

/// Source of page content, sub-album listings and guest access.
///
/// Implemented by [`Session`] for the live site; crawl tests substitute a
/// scripted source.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches a page. `None` on any transport or status failure.
    async fn fetch_page(&self, url: &str, detect_end: bool) -> Option<Page>;

    /// Auth token carried by a page this source served.
    fn page_token(&self, content: &str) -> Option<String>;

    /// Lists the direct sub-albums of an album. `None` on failure.
    async fn list_sub_albums(
        &self,
        owner: &str,
        album_path: Option<&str>,
        token: &str,
    ) -> Option<Vec<SubAlbumRef>>;

    /// Unlocks a guest-password album, returning the unlocked content.
    async fn enter_guest_password(
        &self,
        url: &Url,
        content: &str,
        password: &str,
    ) -> Result<String, SessionError>;
}

impl Session {
    /// Fetches a page, classifying failures.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure or non-success status.
    #[instrument(skip(self))]
    pub async fn try_fetch_page(&self, url: &str, detect_end: bool) -> Result<Page, FetchError> {
        let response = self
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }
        if detect_end && !has_query_key(response.url(), PAGE_KEY) {
            debug!(final_url = %response.url(), "redirected off the page sequence");
            return Ok(Page::EndMarker);
        }

        let content = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        Ok(Page::Content(content))
    }
}

#[async_trait]
impl PageSource for Session {
    async fn fetch_page(&self, url: &str, detect_end: bool) -> Option<Page> {
        match self.try_fetch_page(url, detect_end).await {
            Ok(page) => Some(page),
            Err(error) => {
                debug!(error = %error, "page fetch failed");
                None
            }
        }
    }

    fn page_token(&self, content: &str) -> Option<String> {
        Session::page_token(self, content)
    }

    async fn list_sub_albums(
        &self,
        owner: &str,
        album_path: Option<&str>,
        token: &str,
    ) -> Option<Vec<SubAlbumRef>> {
        Session::list_sub_albums(self, owner, album_path, token).await
    }

    async fn enter_guest_password(
        &self,
        url: &Url,
        content: &str,
        password: &str,
    ) -> Result<String, SessionError> {
        Session::enter_guest_password(self, url, content, password).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key_is_matched_by_name() {
        let url = Url::parse("http://site/user/a/library/x?sort=3&page=2").unwrap();
        assert!(has_query_key(&url, PAGE_KEY));
    }

    #[test]
    fn test_page_key_suffix_of_other_key_does_not_match() {
        let url = Url::parse("http://site/user/a/library/x?homepage=1").unwrap();
        assert!(!has_query_key(&url, PAGE_KEY));
        let url = Url::parse("http://site/page=1/library/x").unwrap();
        assert!(!has_query_key(&url, PAGE_KEY));
    }
}
