//! Content classification of input links.
//!
//! A link is classified from its URL shape and, once fetched, from markers in
//! its content. The decision is an ordered list of [`Rule`]s folded over the
//! evidence; later rules may override earlier results.

use std::fmt;

use url::Url;

use crate::extract::markers;

/// Handling strategy for a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCategory {
    /// Root of a user's library.
    Bucket,
    /// A named album, possibly with sub-albums.
    Album,
    /// An album gated by a guest password.
    GuestAlbum,
    /// A single media page.
    Image,
    /// Not recognized or not accessible.
    Unsupported,
}

impl ContentCategory {
    /// Returns true for categories crawled through album pagination.
    #[must_use]
    pub fn is_album_like(self) -> bool {
        matches!(self, Self::Bucket | Self::Album | Self::GuestAlbum)
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bucket => "bucket",
            Self::Album => "album",
            Self::GuestAlbum => "guest album",
            Self::Image => "image",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Inputs a rule may inspect.
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    /// URL path.
    pub path: &'a str,
    /// Fetched page content, when available.
    pub content: Option<&'a str>,
}

impl Evidence<'_> {
    fn content_has(&self, test: fn(&str) -> bool) -> bool {
        self.content.is_some_and(test)
    }
}

/// Which partial results a rule may act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applies {
    /// Only while no earlier rule matched.
    Unresolved,
    /// Regardless of the current result.
    Always,
    /// Only when the current result is this category.
    When(ContentCategory),
}

/// One predicate-to-category step of the classifier.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Short name, used in trace output.
    pub name: &'static str,
    /// Gate on the current partial result.
    pub applies: Applies,
    /// Predicate over the evidence.
    pub test: fn(&Evidence<'_>) -> bool,
    /// Category produced when the rule fires.
    pub yields: ContentCategory,
}

impl Rule {
    fn apply(&self, current: Option<ContentCategory>, evidence: &Evidence<'_>) -> Option<ContentCategory> {
        let gated_in = match self.applies {
            Applies::Unresolved => current.is_none(),
            Applies::Always => true,
            Applies::When(category) => current == Some(category),
        };
        if gated_in && (self.test)(evidence) {
            tracing::trace!(rule = self.name, category = %self.yields, "classification rule fired");
            Some(self.yields)
        } else {
            current
        }
    }
}

fn ends_with_library(e: &Evidence<'_>) -> bool {
    e.path.ends_with("/library") || e.path.ends_with("/library/")
}

fn inside_library(e: &Evidence<'_>) -> bool {
    e.path.contains("/library/") && !e.path.ends_with("/library/")
}

fn media_listing(e: &Evidence<'_>) -> bool {
    e.path.contains("/images/") || e.path.contains("/videos/")
}

fn media_page(e: &Evidence<'_>) -> bool {
    e.path.contains("/media/")
}

fn password_marker(e: &Evidence<'_>) -> bool {
    e.path.contains("@http://") || e.path.contains("@https://")
}

fn all_categories(e: &Evidence<'_>) -> bool {
    e.content_has(markers::has_all_categories)
}

fn guest_form(e: &Evidence<'_>) -> bool {
    e.content_has(markers::has_guest_login_form)
}

fn private_album(e: &Evidence<'_>) -> bool {
    e.content_has(markers::is_private_album)
}

/// Classification rules in evaluation order.
///
/// URL-shape rules come first; the content-marker rules run last because
/// they can only be seen once the page is fetched.
pub const RULES: [Rule; 8] = [
    Rule {
        name: "library-root",
        applies: Applies::Unresolved,
        test: ends_with_library,
        yields: ContentCategory::Bucket,
    },
    Rule {
        name: "library-album",
        applies: Applies::Unresolved,
        test: inside_library,
        yields: ContentCategory::Album,
    },
    Rule {
        name: "media-listing",
        applies: Applies::Unresolved,
        test: media_listing,
        yields: ContentCategory::Album,
    },
    Rule {
        name: "media-page",
        applies: Applies::Unresolved,
        test: media_page,
        yields: ContentCategory::Image,
    },
    Rule {
        name: "password-marker",
        applies: Applies::Unresolved,
        test: password_marker,
        yields: ContentCategory::GuestAlbum,
    },
    Rule {
        name: "all-categories",
        applies: Applies::Unresolved,
        test: all_categories,
        yields: ContentCategory::Album,
    },
    Rule {
        name: "guest-form",
        applies: Applies::Always,
        test: guest_form,
        yields: ContentCategory::GuestAlbum,
    },
    Rule {
        name: "private-album",
        applies: Applies::When(ContentCategory::Album),
        test: private_album,
        yields: ContentCategory::Unsupported,
    },
];

/// Classifies a link from its URL and optional fetched content.
#[must_use]
pub fn classify(url: &Url, content: Option<&str>) -> ContentCategory {
    let evidence = Evidence {
        path: url.path(),
        content,
    };
    RULES
        .iter()
        .fold(None, |current, rule| rule.apply(current, &evidence))
        .unwrap_or(ContentCategory::Unsupported)
}
