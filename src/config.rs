//! Site endpoints, request timeout, and output directory resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Site root used when no override is given.
pub const DEFAULT_SITE_URL: &str = "http://photobucket.com/";

/// Account login endpoint of the live site.
pub const DEFAULT_LOGIN_URL: &str = "https://secure.photobucket.com/action/auth/login";

/// Page fetch timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Connect timeout for media downloads in seconds.
pub const DOWNLOAD_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Longest silence allowed between body chunks of a media download, in seconds.
pub const DOWNLOAD_READ_TIMEOUT_SECS: u64 = 300;

/// Directory created under the cwd when no output directory is given.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "photobucket";

/// Login path relative to the site root, used for non-default roots.
const LOGIN_PATH: &str = "action/auth/login";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The site URL could not be parsed.
    #[error("invalid site URL '{url}': {reason}")]
    InvalidSiteUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The output directory could not be created. Fatal for the run.
    #[error("failed to create output directory {path}: {source}")]
    CreateOutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Endpoints and timeouts for the crawled site.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site root; fetched to obtain the login token and base of the album API.
    pub base_url: Url,
    /// Endpoint receiving the account login form.
    pub login_url: Url,
    /// Total timeout applied to every page, login and API request.
    pub request_timeout: Duration,
    /// Connect timeout for media downloads.
    pub download_connect_timeout: Duration,
    /// Idle timeout between body reads of a media download.
    pub download_read_timeout: Duration,
}

impl SiteConfig {
    /// Configuration for the live site.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in URLs; the `Result` keeps the signature
    /// shared with [`SiteConfig::for_base_url`].
    pub fn live() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url(DEFAULT_SITE_URL)?,
            login_url: parse_url(DEFAULT_LOGIN_URL)?,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            download_connect_timeout: Duration::from_secs(DOWNLOAD_CONNECT_TIMEOUT_SECS),
            download_read_timeout: Duration::from_secs(DOWNLOAD_READ_TIMEOUT_SECS),
        })
    }

    /// Configuration rooted at an arbitrary base URL (mirrors, test servers).
    ///
    /// The login endpoint is placed under the same root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSiteUrl`] when `base_url` is not a URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let mut base = parse_url(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let login_url = base
            .join(LOGIN_PATH)
            .map_err(|e| ConfigError::InvalidSiteUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: base,
            login_url,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            download_connect_timeout: Duration::from_secs(DOWNLOAD_CONNECT_TIMEOUT_SECS),
            download_read_timeout: Duration::from_secs(DOWNLOAD_READ_TIMEOUT_SECS),
        })
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides the idle timeout between media body reads.
    #[must_use]
    pub fn with_download_read_timeout(mut self, timeout: Duration) -> Self {
        self.download_read_timeout = timeout;
        self
    }

    /// Host of the site root, used to filter input links.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.base_url.host_str()
    }

    /// Builds the sub-album listing API URL for an album owner.
    ///
    /// `album_path` is `None` for the owner's root album ("Library").
    #[must_use]
    pub fn sub_album_api_url(&self, owner: &str, album_path: Option<&str>, token: &str) -> Option<Url> {
        let mut path = format!("api/user/{}/album/", urlencoding::encode(owner));
        if let Some(album) = album_path.map(|a| a.trim_matches('/')).filter(|a| !a.is_empty()) {
            path.push_str(album);
            path.push('/');
        }
        path.push_str("get");

        let mut url = self.base_url.join(&path).ok()?;
        url.query_pairs_mut()
            .append_pair("subAlbums", "8")
            .append_pair("json", "1")
            .append_pair("hash", token);
        Some(url)
    }
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidSiteUrl {
        url: value.to_string(),
        reason: e.to_string(),
    })
}

/// Computes the output directory without touching the filesystem.
///
/// - `None` → `<cwd>/photobucket`
/// - `~` or `~/rest` → `<home>/rest`, or the cwd when no home is known
/// - anything else is used as given
#[must_use]
pub fn output_dir_path(requested: Option<&Path>, cwd: &Path, home: Option<&Path>) -> PathBuf {
    let Some(requested) = requested else {
        return cwd.join(DEFAULT_OUTPUT_SUBDIR);
    };

    let text = requested.to_string_lossy();
    if let Some(rest) = text.strip_prefix('~') {
        return match home {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => cwd.to_path_buf(),
        };
    }
    requested.to_path_buf()
}

/// Resolves the output directory and creates it if missing.
///
/// # Errors
///
/// Returns [`ConfigError::CreateOutputDir`] when the current directory is
/// unavailable or the directory cannot be created.
pub fn prepare_output_dir(requested: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::CreateOutputDir {
        path: PathBuf::from("."),
        source,
    })?;
    let home = dirs::home_dir();
    let dir = output_dir_path(requested, &cwd, home.as_deref());

    if dir.is_dir() {
        debug!(dir = %dir.display(), "output directory exists");
        return Ok(dir);
    }

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::CreateOutputDir {
        path: dir.clone(),
        source,
    })?;
    info!(dir = %dir.display(), "Created output directory");
    Ok(dir)
}
