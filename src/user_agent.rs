//! Shared User-Agent string for page, API, and media requests.
//!
//! The site serves its embedded JSON only to browser-like clients, so every
//! request presents a desktop browser identity.

/// Browser User-Agent sent with every request.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:29.0) Gecko/20100101 Firefox/29.0";

/// User-Agent for the session client.
#[must_use]
pub(crate) fn default_user_agent() -> &'static str {
    BROWSER_USER_AGENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_looks_like_a_browser() {
        let ua = default_user_agent();
        assert!(ua.starts_with("Mozilla/5.0"), "unexpected UA: {ua}");
        assert!(ua.contains("Firefox/"), "unexpected UA: {ua}");
    }
}
