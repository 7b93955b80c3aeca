//! HTTP client construction for the session.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use super::SessionError;
use crate::config::SiteConfig;
use crate::user_agent;

/// Builds the cookie-carrying client used for page, login and API requests.
///
/// Every request is capped by the site's total request timeout.
///
/// # Errors
///
/// Returns [`SessionError::ClientBuild`] when the client cannot be built.
pub(crate) fn build_session_client(site: &SiteConfig, jar: Arc<Jar>) -> Result<Client, SessionError> {
    let timeout = site.request_timeout;
    build_with(jar, move |builder| builder.timeout(timeout))
}

/// Builds the client used to stream media files.
///
/// It shares the session's cookie jar. Connect and per-read timeouts
/// apply, with no cap on the whole transfer, so large videos can finish.
///
/// # Errors
///
/// Returns [`SessionError::ClientBuild`] when the client cannot be built.
pub(crate) fn build_download_client(site: &SiteConfig, jar: Arc<Jar>) -> Result<Client, SessionError> {
    let (connect, read) = (site.download_connect_timeout, site.download_read_timeout);
    build_with(jar, move |builder| builder.connect_timeout(connect).read_timeout(read))
}

fn build_with<F>(jar: Arc<Jar>, timeouts: F) -> Result<Client, SessionError>
where
    F: Fn(ClientBuilder) -> ClientBuilder + Copy,
{
    match try_build(Arc::clone(&jar), timeouts, false) {
        Ok(client) => Ok(client),
        Err(BuildFailure::Panic) => {
            // Some sandboxes panic while reading system proxy settings.
            warn!("system proxy lookup panicked; building client with env proxies only");
            match try_build(jar, timeouts, true) {
                Ok(client) => Ok(client),
                Err(BuildFailure::Panic) => Err(SessionError::client_build(
                    "client construction panicked during proxy lookup",
                )),
                Err(BuildFailure::Build(error)) => Err(SessionError::client_build(error.to_string())),
            }
        }
        Err(BuildFailure::Build(error)) => Err(SessionError::client_build(error.to_string())),
    }
}

enum BuildFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build<F>(jar: Arc<Jar>, timeouts: F, env_proxies_only: bool) -> Result<Client, BuildFailure>
where
    F: Fn(ClientBuilder) -> ClientBuilder,
{
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = timeouts(Client::builder())
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .cookie_provider(jar);
        if env_proxies_only {
            builder = with_env_proxies(builder.no_proxy());
        }
        builder.build().map_err(BuildFailure::Build)
    }))
    .map_err(|_| BuildFailure::Panic)?
}

fn with_env_proxies(mut builder: ClientBuilder) -> ClientBuilder {
    let lookup = |names: &[&str]| {
        names.iter().find_map(|name| {
            std::env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    };
    if let Some(proxy) = lookup(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = lookup(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}
