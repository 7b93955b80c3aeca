//! Album page listings (`collectionData:` inside a collection script block).

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::compile_static_regex;
use super::library::{AlbumStats, album_stats, parse_album_json};
use super::markers::is_search_listing;
use crate::record::{MediaRecord, ORIGINAL_SUFFIX};

/// Collection id of regular album pages.
pub const LIBRARY_COLLECTION_ID: &str = "libraryAlbums";

/// Collection id of search / all-categories listings.
pub const SEARCH_COLLECTION_ID: &str = "search";

static COLLECTION_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"collectionData:\s*(.*)"));

/// One page of an album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumListing {
    /// Records on this page, in page order.
    pub records: Vec<MediaRecord>,
    /// Page number reported by the site.
    pub page_number: u64,
    /// Album counts, attached to the first page only.
    pub stats: Option<AlbumStats>,
}

impl AlbumListing {
    /// Returns true for page 1, where album stats are reported.
    #[must_use]
    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }
}

/// Collection id the page's listing is registered under.
#[must_use]
pub fn collection_id_for(content: &str) -> &'static str {
    if is_search_listing(content) {
        SEARCH_COLLECTION_ID
    } else {
        LIBRARY_COLLECTION_ID
    }
}

/// Extracts the listing on an album page.
///
/// `None` means end of album: no collection block, malformed JSON, or an
/// empty `items.objects` list.
#[must_use]
pub fn extract_collection(content: &str) -> Option<AlbumListing> {
    let collection_id = collection_id_for(content);
    let data = collection_data(content, collection_id)?;

    let objects = data
        .get("items")
        .and_then(|items| items.get("objects"))
        .and_then(Value::as_array)
        .filter(|objects| !objects.is_empty())?;

    let page_number = match data.get("pageNumber") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(0);

    let records = objects.iter().filter_map(listing_record).collect();

    let stats = if page_number == 1 {
        parse_album_json(content).as_ref().and_then(album_stats)
    } else {
        None
    };

    Some(AlbumListing {
        records,
        page_number,
        stats,
    })
}

// Listing items carry `fullsizeUrl`; the original-resolution variant is that
// URL with the `~original` token, which record construction strips again.
fn listing_record(item: &Value) -> Option<MediaRecord> {
    let fullsize = item.get("fullsizeUrl").and_then(Value::as_str)?;
    let mut object = item.clone();
    if let Some(map) = object.as_object_mut() {
        map.insert(
            "originalUrl".to_string(),
            Value::String(format!("{fullsize}{ORIGINAL_SUFFIX}")),
        );
    }
    MediaRecord::from_json(&object)
}

fn collection_data(content: &str, collection_id: &str) -> Option<Value> {
    if !content.contains("collectionData:") {
        return None;
    }

    let marker = format!("collectionId: '{collection_id}'");
    let doc = Html::parse_document(content);
    let selector = Selector::parse("script").ok()?;

    // The last matching block wins when a page repeats the collection.
    let mut raw = None;
    for script in doc.select(&selector) {
        let text: String = script.text().collect();
        if !text.contains(&marker) {
            continue;
        }
        if let Some(found) = COLLECTION_DATA_RE
            .captures(&text)
            .and_then(|caps| caps.get(1))
        {
            raw = Some(found.as_str().trim().to_string());
        }
    }

    let raw = raw?;
    let json = match raw.strip_suffix(',') {
        Some(stripped) if stripped.ends_with('}') => stripped,
        _ => raw.as_str(),
    };
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(error = %error, collection_id, "collectionData is not valid JSON");
            None
        }
    }
}
