//! Text and DOM markers the site uses to signal page state.

use scraper::{ElementRef, Html, Selector};

/// Heading present on "search / all categories" listings.
pub const ALL_CATEGORIES_MARKER: &str = "<h2>All Categories</h2>";

/// Anchor present on search-style image listings.
const SEARCH_IMAGES_MARKER: &str = "<a id=\"images\"";

/// Message on albums hidden from the public.
pub const PRIVATE_ALBUM_MARKER: &str = "This album is Private.";

/// Message shown above the guest-password form.
pub const PASSWORD_PROTECTED_MARKER: &str = "This album is Password-Protected.";

/// Message in the guest-login response when the password was wrong.
pub const INCORRECT_PASSWORD_MARKER: &str = "Password is incorrect.";

/// Messages marking a page as unusable, reported when a link is unsupported.
pub const INVALID_PAGE_MESSAGES: [&str; 4] = [
    "This album is empty.",
    "Sorry, the requested page does not exist.",
    "Library is Private.",
    "This album is Private",
];

/// Hidden fields of the guest-password form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestLoginForm {
    /// Form `action`, possibly relative to the album URL.
    pub action: String,
    /// `albumPath` hidden input.
    pub album_path: String,
    /// `albumType` hidden input.
    pub album_type: String,
    /// `albumView` hidden input.
    pub album_view: String,
}

/// Returns true when the page lists "All Categories".
#[must_use]
pub fn has_all_categories(content: &str) -> bool {
    content.contains(ALL_CATEGORIES_MARKER)
}

/// Returns true when the page is a search-style listing.
#[must_use]
pub fn is_search_listing(content: &str) -> bool {
    has_all_categories(content) || content.contains(SEARCH_IMAGES_MARKER)
}

/// Returns true when the album is marked private.
#[must_use]
pub fn is_private_album(content: &str) -> bool {
    content.contains(PRIVATE_ALBUM_MARKER)
}

/// Returns true when the page carries the password-protection notice.
#[must_use]
pub fn is_password_protected(content: &str) -> bool {
    content.contains(PASSWORD_PROTECTED_MARKER)
}

/// Returns true when a guest-login response rejected the password.
#[must_use]
pub fn is_incorrect_password(content: &str) -> bool {
    content.contains(INCORRECT_PASSWORD_MARKER)
}

/// First known invalid-page message contained in the page.
#[must_use]
pub fn invalid_page_message(content: &str) -> Option<&'static str> {
    INVALID_PAGE_MESSAGES
        .iter()
        .copied()
        .find(|message| content.contains(message))
}

/// Returns true when the page contains the guest-password form element.
#[must_use]
pub fn has_guest_login_form(content: &str) -> bool {
    if !content.contains("guestLoginForm") {
        return false;
    }
    let doc = Html::parse_document(content);
    select_first(&doc, "form#guestLoginForm").is_some()
}

/// Auth token from the page's `id="token"` element.
#[must_use]
pub fn extract_token(content: &str) -> Option<String> {
    let doc = Html::parse_document(content);
    select_first(&doc, "#token")?
        .value()
        .attr("value")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Hidden fields and action of the guest-password form.
///
/// The first three inputs of the form are, in order, the album path, album
/// type and album view.
#[must_use]
pub fn extract_guest_form(content: &str) -> Option<GuestLoginForm> {
    let doc = Html::parse_document(content);
    let form = select_first(&doc, "#guestLoginForm")?;
    let action = form.value().attr("action")?.to_string();

    let input_selector = Selector::parse("input").ok()?;
    let mut values = form
        .select(&input_selector)
        .map(|input| input.value().attr("value").unwrap_or_default().to_string());

    Some(GuestLoginForm {
        action,
        album_path: values.next()?,
        album_type: values.next()?,
        album_view: values.next()?,
    })
}

pub(crate) fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector).next()
}
