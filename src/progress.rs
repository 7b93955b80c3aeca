//! Progress reporting for the crawl and download phases.
//!
//! Frontends implement [`Progress`] to surface running counts; the library
//! only calls into it and never renders anything itself.

/// Receives running counts from long-running loops.
pub trait Progress: Send + Sync {
    /// Distinct media links collected so far for the current album.
    fn collected(&self, _count: usize) {}

    /// Download phase is starting with `total` records.
    fn begin_downloads(&self, _total: usize) {}

    /// One record was processed (downloaded, skipped, or failed).
    fn downloaded(&self, _done: usize, _total: usize) {}

    /// A direct URL was recorded in links-only mode.
    fn link(&self, _url: &str) {}

    /// Called once at the end of a phase, successful or not.
    fn finish(&self) {}
}

/// A no-op progress sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}
