//! HTML builders shaped like the site's album, media and guest pages.

/// One listing item: file name, full-size URL, media type.
pub type Item<'a> = (&'a str, &'a str, &'a str);

fn listing_objects(items: &[Item<'_>]) -> String {
    items
        .iter()
        .map(|(name, url, kind)| {
            format!(r#"{{"name":"{name}","fullsizeUrl":"{url}","mediaType":"{kind}"}}"#)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// An album listing page with the given items.
pub fn album_page(page: u64, items: &[Item<'_>]) -> String {
    album_page_with(page, items, "")
}

/// An album listing page with extra markup placed before the listing.
pub fn album_page_with(page: u64, items: &[Item<'_>], extra: &str) -> String {
    format!(
        "<html><body>{extra}<script>\nPb.Data.add({{\ncollectionId: 'libraryAlbums',\ncollectionData: {{\"pageNumber\":{page},\"items\":{{\"objects\":[{}]}}}},\n}});\n</script></body></html>",
        listing_objects(items)
    )
}

/// Album metadata and token markup, for pages that recursion descends from.
pub fn album_meta(owner: &str, location: &str, token: &str) -> String {
    let is_root = location.is_empty();
    format!(
        "<input type=\"hidden\" id=\"token\" value=\"{token}\">\n<script>\nvar albumJson = {{\"ownername\":\"{owner}\",\"isRootAlbum\":{is_root},\"location\":\"{location}\"}};\n</script>\n"
    )
}

/// A media page carrying one embedded media object.
pub fn media_page(name: &str, original_url: &str) -> String {
    format!(
        "<html><script>\nPb.Data.Shared.put(Pb.Data.Shared.MEDIA,{{\"name\":\"{name}\",\"originalUrl\":\"{original_url}\",\"mediaType\":\"image\"}});\n</script></html>"
    )
}

/// A password-protected album page with the guest-login form.
pub fn guest_page(token: &str, action: &str) -> String {
    format!(
        r#"<html><body>
<p>This album is Password-Protected.</p>
<input type="hidden" id="token" value="{token}">
<form id="guestLoginForm" action="{action}" method="post">
  <input type="hidden" name="albumPath" value="/albums/k402/daxda/private_test">
  <input type="hidden" name="albumType" value="library">
  <input type="hidden" name="albumView" value="grid">
  <input type="password" name="visitorPassword">
</form>
</body></html>"#
    )
}

/// The guest-login response for a rejected password.
pub const WRONG_PASSWORD_PAGE: &str =
    "<html><body><p class=\"error\">Password is incorrect.</p></body></html>";

/// A page with the account token, as served at the site root.
pub fn root_page(token: &str) -> String {
    format!("<html><body><input type=\"hidden\" id=\"token\" value=\"{token}\"></body></html>")
}
