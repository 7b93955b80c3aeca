//! Media records recovered from album and media pages.
//!
//! A [`MediaRecord`] is built from one embedded JSON object and is immutable
//! afterwards. Records are keyed by their direct media URL; [`RecordSet`]
//! keeps the first occurrence of each key in insertion order.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

/// Size/variant token the site appends to original-resolution media URLs.
pub const ORIGINAL_SUFFIX: &str = "~original";

/// Kind of media behind a record, as reported by the site's `mediaType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video file.
    Video,
    /// Missing or unrecognized `mediaType`; never excluded by a kind filter.
    Unknown,
}

impl MediaKind {
    /// Maps the site's `mediaType` string (case-insensitive) to a kind.
    #[must_use]
    pub fn from_media_type(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("image") => Self::Image,
            Some("video") => Self::Video,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One downloadable media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    /// File name the site reports for the item (`name` field).
    pub filename: String,
    /// Display title, when present.
    pub title: Option<String>,
    /// Direct media URL with the `~original` token removed. Uniqueness key.
    pub direct_url: String,
    /// Image or video.
    pub kind: MediaKind,
    /// Like count.
    pub like_count: Option<u64>,
    /// Comment count.
    pub comment_count: Option<u64>,
    /// View count.
    pub view_count: Option<u64>,
    /// Owning username.
    pub username: Option<String>,
}

impl MediaRecord {
    /// Builds a record from one embedded JSON media object.
    ///
    /// Returns `None` when the object lacks a `name` or an `originalUrl`.
    #[must_use]
    pub fn from_json(object: &Value) -> Option<Self> {
        let filename = object.get("name")?.as_str()?.to_string();
        let original_url = object.get("originalUrl")?.as_str()?;

        Some(Self {
            filename,
            title: string_field(object, "title"),
            direct_url: normalize_media_url(original_url),
            kind: MediaKind::from_media_type(object.get("mediaType").and_then(Value::as_str)),
            like_count: count_field(object, "likeCount"),
            comment_count: count_field(object, "commentCount"),
            view_count: count_field(object, "viewCount"),
            username: string_field(object, "username"),
        })
    }
}

/// Strips the `~original` variant token from a media URL.
#[must_use]
pub fn normalize_media_url(url: &str) -> String {
    url.replace(ORIGINAL_SUFFIX, "")
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(std::string::ToString::to_string)
}

// Counts arrive as numbers on media pages and as strings in some listings.
fn count_field(object: &Value, key: &str) -> Option<u64> {
    match object.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Insertion-ordered set of records, deduplicated by direct media URL.
#[derive(Debug, Default, Clone)]
pub struct RecordSet {
    seen: HashSet<String>,
    records: Vec<MediaRecord>,
}

impl RecordSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record unless its direct URL is already present.
    ///
    /// Returns `true` when the record was new.
    pub fn insert(&mut self, record: MediaRecord) -> bool {
        if self.seen.insert(record.direct_url.clone()) {
            self.records.push(record);
            true
        } else {
            false
        }
    }

    /// Merges records, returning how many were new.
    pub fn merge<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = MediaRecord>,
    {
        let mut added = 0;
        for record in records {
            if self.insert(record) {
                added += 1;
            }
        }
        added
    }

    /// Number of distinct records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no records were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MediaRecord> {
        self.records.iter()
    }

    /// Consumes the set, returning records in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<MediaRecord> {
        self.records
    }
}

impl Extend<MediaRecord> for RecordSet {
    fn extend<T: IntoIterator<Item = MediaRecord>>(&mut self, iter: T) {
        self.merge(iter);
    }
}

impl FromIterator<MediaRecord> for RecordSet {
    fn from_iter<T: IntoIterator<Item = MediaRecord>>(iter: T) -> Self {
        let mut set = Self::new();
        set.merge(iter);
        set
    }
}
