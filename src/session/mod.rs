//! Session state: cookie jar, account login and guest-password entry.
//!
//! A [`Session`] owns the HTTP client and its cookie jar for the whole run.
//! Other components borrow it; nothing holds session state globally.
//!
//! Account login is best effort. A failed login is logged and the run goes
//! on unauthenticated, since most albums are public.

mod client;
mod error;

pub use error::SessionError;

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};
use url::Url;
use url::form_urlencoded;

use crate::config::SiteConfig;
use crate::extract::markers::{self, GuestLoginForm};
use crate::extract::{SubAlbumRef, parse_sub_album_listing};

/// Name of the cookie the site sets after a successful account login.
pub const AUTH_COOKIE: &str = "pbauth";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Account credentials for the site.
#[derive(Clone)]
pub struct Credentials {
    /// Username or email.
    pub username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// HTTP client, cookie jar and authentication state for one run.
pub struct Session {
    client: Client,
    download_client: Client,
    jar: Arc<Jar>,
    site: SiteConfig,
    authenticated: bool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("site", &self.site.base_url.as_str())
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates an unauthenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(site: SiteConfig) -> Result<Self, SessionError> {
        let jar = Arc::new(Jar::default());
        let client = client::build_session_client(&site, Arc::clone(&jar))?;
        let download_client = client::build_download_client(&site, Arc::clone(&jar))?;
        Ok(Self {
            client,
            download_client,
            jar,
            site,
            authenticated: false,
        })
    }

    /// Creates a session and logs in when credentials are given.
    ///
    /// Login failures are logged and leave the session unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ClientBuild`] when the HTTP client cannot be built.
    pub async fn configure(
        site: SiteConfig,
        credentials: Option<&Credentials>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(site)?;
        if let Some(credentials) = credentials {
            match session.login_from_site_root(credentials).await {
                Ok(()) => info!(username = %credentials.username, "Logged in"),
                Err(error) => warn!(error = %error, "Login failed, continuing without an account"),
            }
        }
        Ok(session)
    }

    /// Site endpoints this session talks to.
    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// The client used for page, login and API requests.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The client for media downloads, sharing this session's cookies.
    #[must_use]
    pub fn download_client(&self) -> &Client {
        &self.download_client
    }

    /// Returns true after a successful account login.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn login_from_site_root(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        let root = self.site.base_url.clone();
        let content = self.get_ok_text(&root).await?;
        let token = self
            .page_token(&content)
            .ok_or_else(|| SessionError::token_missing(root.as_str()))?;
        self.login(credentials, &token).await
    }

    /// Posts account credentials with the page token.
    ///
    /// Success is judged only by the auth cookie appearing in the jar.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LoginFailed`] when no auth cookie was set.
    #[instrument(skip(self, credentials, token), fields(username = %credentials.username))]
    pub async fn login(&mut self, credentials: &Credentials, token: &str) -> Result<(), SessionError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("hash", token)
            .append_pair("returnUrl", "")
            .append_pair("username", &credentials.username)
            .append_pair("password", &credentials.password)
            .finish();

        if let Err(error) = self.post_form(&self.site.login_url, body).await {
            debug!(error = %error, "login request failed");
        }

        self.authenticated = self.has_auth_cookie();
        if self.authenticated {
            Ok(())
        } else {
            Err(SessionError::login_failed(&credentials.username))
        }
    }

    fn has_auth_cookie(&self) -> bool {
        let needle = format!("{AUTH_COOKIE}=");
        [&self.site.login_url, &self.site.base_url]
            .into_iter()
            .filter_map(|url| self.jar.cookies(url))
            .any(|header| header.to_str().is_ok_and(|value| value.contains(&needle)))
    }

    /// Auth token embedded in a page fetched through this session.
    ///
    /// Required by the login form, the guest form and the sub-album API.
    #[must_use]
    pub fn page_token(&self, content: &str) -> Option<String> {
        markers::extract_token(content)
    }

    /// Unlocks a guest-password protected album.
    ///
    /// Pages without the password-protection notice are returned unchanged.
    /// Otherwise the guest form is posted with `password` and the response
    /// content is returned.
    ///
    /// # Errors
    ///
    /// - [`SessionError::GuestFormMissing`] when the form fields are absent
    /// - [`SessionError::HttpStatus`] / [`SessionError::Network`] when the POST fails
    /// - [`SessionError::IncorrectPassword`] when the site rejects the password
    #[instrument(skip(self, content, password), fields(url = %url))]
    pub async fn enter_guest_password(
        &self,
        url: &Url,
        content: &str,
        password: &str,
    ) -> Result<String, SessionError> {
        if !markers::is_password_protected(content) {
            return Ok(content.to_string());
        }

        let form = markers::extract_guest_form(content)
            .ok_or_else(|| SessionError::guest_form_missing(url.as_str()))?;
        let post_url = url
            .join(&form.action)
            .map_err(|_| SessionError::guest_form_missing(url.as_str()))?;

        let body = guest_form_body(&form, self.page_token(content).as_deref(), password);
        let response = self.post_form(&post_url, body).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::http_status(post_url.as_str(), status.as_u16()));
        }
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::network(post_url.as_str(), e))?;

        if markers::is_incorrect_password(&text) {
            return Err(SessionError::incorrect_password(url.as_str()));
        }
        debug!("guest password accepted");
        Ok(text)
    }

    /// Lists the direct sub-albums of an album through the site API.
    ///
    /// `album_path` is `None` for the library root. Returns `None` on any
    /// transport, status, or parse failure.
    #[instrument(skip(self, token))]
    pub async fn list_sub_albums(
        &self,
        owner: &str,
        album_path: Option<&str>,
        token: &str,
    ) -> Option<Vec<SubAlbumRef>> {
        let api_url = self.site.sub_album_api_url(owner, album_path, token)?;
        let response = match self.client.get(api_url.clone()).send().await {
            Ok(response) => response,
            Err(error) => {
                debug!(error = %error, "sub-album request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "sub-album request rejected");
            return None;
        }
        let json: serde_json::Value = match response.json().await {
            Ok(json) => json,
            Err(error) => {
                debug!(error = %error, "sub-album response is not JSON");
                return None;
            }
        };
        parse_sub_album_listing(&json, owner)
    }

    async fn post_form(&self, url: &Url, body: String) -> Result<Response, SessionError> {
        self.client
            .post(url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| SessionError::network(url.as_str(), e))
    }

    async fn get_ok_text(&self, url: &Url) -> Result<String, SessionError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SessionError::network(url.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::http_status(url.as_str(), status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| SessionError::network(url.as_str(), e))
    }
}

// Built synchronously: the serializer must not live across an await.
fn guest_form_body(form: &GuestLoginForm, token: Option<&str>, password: &str) -> String {
    let mut body = form_urlencoded::Serializer::new(String::new());
    body.append_pair("albumPath", &form.album_path)
        .append_pair("albumType", &form.album_type)
        .append_pair("albumView", &form.album_view);
    if let Some(token) = token {
        body.append_pair("hash", token);
    }
    body.append_pair("visitorPassword", password);
    body.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn assert_send<T: Send>(_: &T) {}

    fn form() -> GuestLoginForm {
        GuestLoginForm {
            action: "/action/album/login".to_string(),
            album_path: "/albums/k402/daxda/private test".to_string(),
            album_type: "library".to_string(),
            album_view: "grid".to_string(),
        }
    }

    #[test]
    fn test_guest_form_body_field_order_and_encoding() {
        let body = guest_form_body(&form(), Some("tok"), "p&ss");
        assert_eq!(
            body,
            "albumPath=%2Falbums%2Fk402%2Fdaxda%2Fprivate+test&albumType=library&albumView=grid&hash=tok&visitorPassword=p%26ss"
        );
    }

    #[test]
    fn test_guest_form_body_without_token_omits_hash() {
        let body = guest_form_body(&form(), None, "secret");
        assert!(!body.contains("hash="), "{body}");
        assert!(body.ends_with("visitorPassword=secret"));
    }

    #[test]
    fn test_session_futures_are_send() {
        let session = Session::new(SiteConfig::for_base_url("http://127.0.0.1:9/").unwrap()).unwrap();
        let url = Url::parse("http://127.0.0.1:9/user/daxda/library/x").unwrap();
        let content = "<p>This album is Password-Protected.</p>";
        assert_send(&session.enter_guest_password(&url, content, "secret"));
        assert_send(&session.list_sub_albums("daxda", None, "tok"));
    }

    #[test]
    fn test_page_token_reads_token_input() {
        let session = Session::new(SiteConfig::for_base_url("http://127.0.0.1:9/").unwrap()).unwrap();
        let page = r#"<html><input type="hidden" id="token" value="abc123"></html>"#;
        assert_eq!(session.page_token(page).as_deref(), Some("abc123"));
        assert!(session.page_token("<html></html>").is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("daxda", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("daxda"));
        assert!(!debug.contains("hunter2"), "password leaked: {debug}");
    }
}
