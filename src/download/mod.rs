//! Download phase: saving collected media to the output directory.
//!
//! For each record, in order:
//!
//! 1. the media filter may exclude it
//! 2. links-only mode appends the direct URL to the [`LinkLog`] and stops
//! 3. omit-existing mode skips names already present in the directory
//! 4. otherwise the body is streamed to a collision-free path
//!    (`photo.jpg`, `photo(1).jpg`, ...)
//!
//! Network failures skip the record. Local write failures stop the phase.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use shovel_core::download::{DownloadManager, DownloadOptions};
//!
//! # async fn example(records: Vec<shovel_core::MediaRecord>) -> Result<(), Box<dyn std::error::Error>> {
//! let manager = DownloadManager::new(reqwest::Client::new(), DownloadOptions::new("./photobucket"), None);
//! let stats = manager.download_all(&records, &AtomicBool::new(false)).await?;
//! println!("{}", stats.status_line());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod filename;
pub mod links;
mod manager;

pub use error::DownloadError;
pub use filename::{sanitize_filename, unique_path};
pub use links::LinkLog;
pub use manager::{DownloadManager, DownloadOptions, DownloadStats, MediaFilter};
