//! Album metadata (`var albumJson = {...};`) and the sub-album listing API.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::compile_static_regex;

static ALBUM_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"var albumJson\s*=\s*(.*)"));

/// Media counts of an album.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlbumStats {
    /// Number of images.
    pub images: u64,
    /// Number of videos.
    pub videos: u64,
    /// Number of direct sub-albums.
    pub sub_albums: u64,
}

impl fmt::Display for AlbumStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Images: {}, Videos: {}, Sub-albums: {}",
            self.images, self.videos, self.sub_albums
        )
    }
}

/// Owner and location of the album a page belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryMeta {
    /// Username owning the library.
    pub owner_name: String,
    /// True for the library root ("Library"), which has no album path.
    pub is_root_album: bool,
    /// Album path within the library.
    pub location: Option<String>,
    /// Album counts, when the blob carries them.
    pub stats: Option<AlbumStats>,
}

impl LibraryMeta {
    /// Album path to query sub-albums for; `None` for the library root.
    #[must_use]
    pub fn album_path(&self) -> Option<&str> {
        if self.is_root_album {
            None
        } else {
            self.location.as_deref()
        }
    }
}

/// A child album reported by the sub-album listing API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAlbumRef {
    /// Album page URL as reported by the API.
    pub url: String,
    /// Owner of the parent album.
    pub owner: String,
    /// Album path, when reported.
    pub path: Option<String>,
}

/// Parses the `albumJson` assignment of an album page.
#[must_use]
pub fn parse_album_json(content: &str) -> Option<Value> {
    let raw = ALBUM_JSON_RE.captures(content)?.get(1)?.as_str().trim();
    let raw = raw.strip_suffix(';').unwrap_or(raw);
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(error = %error, "albumJson is not valid JSON");
            None
        }
    }
}

/// Owner, root flag and location from an album page.
///
/// Returns `None` when the blob is missing, malformed or has no owner.
#[must_use]
pub fn extract_library_meta(content: &str) -> Option<LibraryMeta> {
    let json = parse_album_json(content)?;
    let owner_name = json
        .get("ownername")
        .or_else(|| json.get("ownerName"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())?
        .to_string();

    Some(LibraryMeta {
        owner_name,
        is_root_album: json
            .get("isRootAlbum")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        location: json
            .get("location")
            .and_then(Value::as_str)
            .map(str::to_string),
        stats: album_stats(&json),
    })
}

/// Album counts from an `albumJson` blob.
///
/// Counts sit under `data.albumStats` in some pages and at the top level in
/// others.
#[must_use]
pub fn album_stats(json: &Value) -> Option<AlbumStats> {
    let stats = json
        .get("data")
        .and_then(|data| data.get("albumStats"))
        .or_else(|| json.get("albumStats"))?;

    let count = |key: &str| {
        stats
            .get(key)
            .and_then(|entry| entry.get("count"))
            .and_then(Value::as_u64)
    };

    Some(AlbumStats {
        images: count("images")?,
        videos: count("videos")?,
        sub_albums: count("subalbums")?,
    })
}

#[derive(Debug, Deserialize)]
struct SubAlbumResponse {
    data: SubAlbumData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubAlbumData {
    #[serde(default)]
    sub_album_count: u64,
    #[serde(default)]
    sub_albums: Vec<SubAlbumEntry>,
}

#[derive(Debug, Deserialize)]
struct SubAlbumEntry {
    url: Option<String>,
    #[serde(alias = "path")]
    location: Option<String>,
}

/// Reads the sub-album API response.
///
/// Returns `None` when the response lacks the `data` object; an album with
/// no children yields an empty list.
#[must_use]
pub fn parse_sub_album_listing(json: &Value, owner: &str) -> Option<Vec<SubAlbumRef>> {
    let response = match SubAlbumResponse::deserialize(json) {
        Ok(response) => response,
        Err(error) => {
            debug!(error = %error, "unexpected sub-album response shape");
            return None;
        }
    };
    if response.data.sub_album_count == 0 {
        return Some(Vec::new());
    }

    let albums = response
        .data
        .sub_albums
        .into_iter()
        .filter_map(|entry| {
            Some(SubAlbumRef {
                url: entry.url?,
                owner: owner.to_string(),
                path: entry.location,
            })
        })
        .collect();
    Some(albums)
}
