//! Embedded-data extraction from fetched pages.
//!
//! The site renders its pages around JSON blobs embedded in script code. This
//! module recovers three shapes from that markup:
//!
//! - [`media`]: a single media item on a media page
//! - [`collection`]: one page of an album listing
//! - [`library`]: album metadata (`var albumJson = ...`) and the sub-album API
//!
//! Every extractor degrades to `None` on malformed or missing data. Crawl code
//! depends on the [`EmbeddedData`] trait so the parsing can be swapped out in
//! tests.

pub mod collection;
pub mod library;
pub mod markers;
pub mod media;

pub use collection::AlbumListing;
pub use library::{AlbumStats, LibraryMeta, SubAlbumRef, parse_sub_album_listing};

use regex::Regex;

use crate::record::MediaRecord;

/// Compiles a hardcoded regex, panicking with the pattern on failure.
///
/// Only used inside `LazyLock` initializers for literal patterns.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Narrow interface over the brittle page parsing.
pub trait EmbeddedData: Send + Sync {
    /// Single media item from a media page.
    fn extract_record(&self, content: &str) -> Option<MediaRecord>;

    /// One album page. `None` means the album has no more items.
    fn extract_collection(&self, content: &str) -> Option<AlbumListing>;

    /// Album owner, root flag and location.
    fn extract_library_meta(&self, content: &str) -> Option<LibraryMeta>;
}

/// Extractor for the live site's markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct SiteExtractor;

impl EmbeddedData for SiteExtractor {
    fn extract_record(&self, content: &str) -> Option<MediaRecord> {
        media::extract_record(content)
    }

    fn extract_collection(&self, content: &str) -> Option<AlbumListing> {
        collection::extract_collection(content)
    }

    fn extract_library_meta(&self, content: &str) -> Option<LibraryMeta> {
        library::extract_library_meta(content)
    }
}
