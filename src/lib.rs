//! Shovel Core Library
//!
//! Crawls Photobucket albums, libraries and media pages, recovers the direct
//! media URLs embedded in their markup, and downloads the originals.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`input`] - Input links and guest-password prefixes
//! - [`config`] - Site endpoints and output directory resolution
//! - [`session`] - HTTP client, cookie jar, login and guest-password entry
//! - [`fetch`] - Page fetching with end-of-album detection
//! - [`extract`] - Embedded JSON extraction from fetched pages
//! - [`classify`] - Link classification into content categories
//! - [`crawl`] - Pagination, recursive traversal and per-link handling
//! - [`download`] - Saving collected media with collision-safe names
//! - [`progress`] - Progress reporting hooks for frontends

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod config;
pub mod crawl;
pub mod download;
pub mod extract;
pub mod fetch;
pub mod input;
pub mod progress;
pub mod record;
pub mod session;
mod user_agent;

// Re-export commonly used types
pub use classify::{ContentCategory, classify};
pub use config::{ConfigError, SiteConfig};
pub use crawl::{CrawlError, CrawlOptions, CrawlReport, Crawler, TargetFailure};
pub use download::{DownloadError, DownloadManager, DownloadOptions, DownloadStats, MediaFilter};
pub use extract::{EmbeddedData, SiteExtractor};
pub use fetch::{Page, PageSource};
pub use input::{InputError, Target, TargetList};
pub use progress::{NoProgress, Progress};
pub use record::{MediaKind, MediaRecord, RecordSet};
pub use session::{Credentials, Session, SessionError};
