//! Input links: loading, password extraction, and host filtering.
//!
//! Each input line is a link to a page on the site. A guest password may be
//! glued to the front of the link, ending in `@http://` (or `@https://`):
//!
//! ```text
//! hunter2@http://s12.photobucket.com/user/someone/library/Private
//! ```

mod error;

pub use error::InputError;

use std::fmt;
use std::path::Path;

use tracing::debug;
use url::Url;

/// Markers separating a password prefix from the link itself.
const PASSWORD_SENTINELS: [&str; 2] = ["@http://", "@https://"];

/// A link to crawl plus the guest password that came with it.
#[derive(Clone, PartialEq, Eq)]
pub struct Target {
    /// The link with any password prefix removed.
    pub url: Url,
    password: Option<String>,
}

impl Target {
    /// Parses one input line.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidUrl`] when the remaining link is not an
    /// http(s) URL with a host.
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let (password, link) = split_password(line.trim());
        let url = Url::parse(link).map_err(|e| InputError::invalid_url(link, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(InputError::invalid_url(
                link,
                format!("scheme '{}' is not supported", url.scheme()),
            ));
        }
        if url.host_str().is_none() {
            return Err(InputError::invalid_url(link, "missing host"));
        }
        Ok(Self {
            url,
            password: password.map(str::to_string),
        })
    }

    /// The guest password supplied with the link, if any.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

// Passwords never reach logs.
impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("url", &self.url.as_str())
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Splits `password@http://...` into its password and link parts.
///
/// The last sentinel wins so passwords may themselves contain `@`. An empty
/// prefix yields no password.
fn split_password(line: &str) -> (Option<&str>, &str) {
    let split_at = PASSWORD_SENTINELS
        .iter()
        .filter_map(|sentinel| line.rfind(sentinel))
        .max();

    match split_at {
        Some(0) => (None, &line[1..]),
        Some(pos) => (Some(&line[..pos]), &line[pos + 1..]),
        None => (None, line),
    }
}

/// Targets accepted from an input list plus the rejected lines.
#[derive(Debug, Default)]
pub struct TargetList {
    /// Accepted targets in input order.
    pub targets: Vec<Target>,
    /// Rejected lines with the reason they were skipped.
    pub skipped: Vec<InputError>,
}

impl TargetList {
    /// Returns true if no targets were accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of accepted targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

impl fmt::Display for TargetList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} links ({} skipped)",
            self.targets.len(),
            self.skipped.len()
        )
    }
}

/// Parses input lines into targets. Blank lines are ignored.
///
/// When `site_host` is given, links on other hosts are skipped. Subdomains of
/// the site host (`s12.photobucket.com`) are accepted.
#[must_use]
pub fn parse_targets<'a, I>(lines: I, site_host: Option<&str>) -> TargetList
where
    I: IntoIterator<Item = &'a str>,
{
    let mut list = TargetList::default();

    for line in lines.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
        let target = match Target::parse(line) {
            Ok(target) => target,
            Err(error) => {
                debug!(error = %error, "skipping input line");
                list.skipped.push(error);
                continue;
            }
        };

        if let Some(expected) = site_host
            && !host_belongs_to(target.url.host_str().unwrap_or_default(), expected)
        {
            list.skipped
                .push(InputError::foreign_host(target.url.as_str(), expected));
            continue;
        }

        list.targets.push(target);
    }

    list
}

/// Reads an input file with one link per line.
///
/// # Errors
///
/// Returns [`InputError::Io`] when the file cannot be read.
pub fn load_targets_file(path: &Path, site_host: Option<&str>) -> Result<TargetList, InputError> {
    let text = std::fs::read_to_string(path).map_err(|e| InputError::io(path, e))?;
    Ok(parse_targets(text.lines(), site_host))
}

fn canonical_host(host: &str) -> String {
    host.trim()
        .trim_start_matches("www.")
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn host_belongs_to(host: &str, site_host: &str) -> bool {
    let host = canonical_host(host);
    let site = canonical_host(site_host);
    host == site || host.ends_with(&format!(".{site}"))
}
