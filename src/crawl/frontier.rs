//! Recursive sub-album traversal.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, instrument, warn};

use super::pagination::{iterate_album, page_template};
use crate::extract::EmbeddedData;
use crate::fetch::{Page, PageSource};
use crate::progress::Progress;
use crate::record::RecordSet;

/// Depth-first worklist of album URLs with a visited set.
///
/// A URL enters `pending` at most once per run; popped URLs are moved to
/// `visited` and never handed out again.
#[derive(Debug, Default)]
pub struct Frontier {
    pending: Vec<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier seeded with one URL.
    #[must_use]
    pub fn seeded(start: impl Into<String>) -> Self {
        let mut frontier = Self::default();
        frontier.push(start);
        frontier
    }

    /// Queues a URL unless it was queued or visited before.
    ///
    /// Returns `true` when the URL was added.
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.visited.contains(&url) || !self.queued.insert(url.clone()) {
            return false;
        }
        self.pending.push(url);
        true
    }

    /// Pops the most recently queued unvisited URL.
    pub fn pop(&mut self) -> Option<String> {
        while let Some(url) = self.pending.pop() {
            if !self.visited.contains(&url) {
                return Some(url);
            }
        }
        None
    }

    /// Records a URL as processed.
    pub fn mark_visited(&mut self, url: impl Into<String>) {
        self.visited.insert(url.into());
    }

    /// Returns true when the URL was already processed.
    #[must_use]
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of processed URLs.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Collects an album and all of its sub-albums.
///
/// Each album is paginated in full, then its sub-albums are discovered
/// through the sub-album API and queued. Album URLs are keyed by their page
/// template so a child discovered from two parents is crawled once.
/// Interruption stops the walk and returns what was collected.
#[instrument(skip(source, extractor, interrupted, progress))]
pub async fn crawl_recursive(
    source: &dyn PageSource,
    extractor: &dyn EmbeddedData,
    start_url: &str,
    interrupted: &AtomicBool,
    progress: &dyn Progress,
) -> RecordSet {
    let mut collected = RecordSet::new();
    let Some(start) = page_template(start_url) else {
        warn!(url = start_url, "cannot build a page template, skipping");
        return collected;
    };
    let mut frontier = Frontier::seeded(start);

    while let Some(url) = frontier.pop() {
        if interrupted.load(Ordering::SeqCst) {
            break;
        }

        let fetched = source.fetch_page(&url, false).await;
        if interrupted.load(Ordering::SeqCst) {
            break;
        }
        let Some(Page::Content(content)) = fetched else {
            warn!(url = %url, "couldn't fetch album, skipping");
            frontier.mark_visited(url);
            continue;
        };

        match iterate_album(source, extractor, &url, interrupted, progress).await {
            Ok(records) => {
                let added = collected.merge(records.into_vec());
                debug!(url = %url, added, total = collected.len(), "album collected");
            }
            Err(error) => warn!(error = %error, "skipping album"),
        }
        if interrupted.load(Ordering::SeqCst) {
            frontier.mark_visited(url);
            break;
        }

        queue_sub_albums(source, extractor, &content, &mut frontier).await;
        frontier.mark_visited(url);
    }

    info!(
        albums = frontier.visited_count(),
        records = collected.len(),
        "Recursive crawl finished"
    );
    collected
}

async fn queue_sub_albums(
    source: &dyn PageSource,
    extractor: &dyn EmbeddedData,
    content: &str,
    frontier: &mut Frontier,
) {
    let Some(meta) = extractor.extract_library_meta(content) else {
        debug!("no album metadata, not descending");
        return;
    };
    let Some(token) = source.page_token(content) else {
        debug!(owner = %meta.owner_name, "no token on album page, not descending");
        return;
    };
    let Some(children) = source
        .list_sub_albums(&meta.owner_name, meta.album_path(), &token)
        .await
    else {
        warn!(owner = %meta.owner_name, "sub-album listing failed");
        return;
    };

    for child in children {
        match page_template(&child.url) {
            Some(template) => {
                if frontier.push(template) {
                    debug!(url = %child.url, "queued sub-album");
                }
            }
            None => debug!(url = %child.url, "ignoring malformed sub-album URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontier_push_filters_duplicates() {
        let mut frontier = Frontier::seeded("a");
        assert!(frontier.push("b"));
        assert!(!frontier.push("a"));
        assert!(!frontier.push("b"));
        assert_eq!(frontier.pop().as_deref(), Some("b"));
    }

    #[test]
    fn test_frontier_never_returns_visited_url() {
        let mut frontier = Frontier::seeded("a");
        let first = frontier.pop();
        assert_eq!(first.as_deref(), Some("a"));
        frontier.mark_visited("a");
        assert!(!frontier.push("a"));
        assert!(frontier.pop().is_none());
        assert!(frontier.is_visited("a"));
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_frontier_is_depth_first() {
        let mut frontier = Frontier::seeded("root");
        frontier.pop();
        frontier.mark_visited("root");
        frontier.push("child-1");
        frontier.push("child-2");
        assert_eq!(frontier.pop().as_deref(), Some("child-2"));
        frontier.push("grandchild");
        assert_eq!(frontier.pop().as_deref(), Some("grandchild"));
        assert_eq!(frontier.pop().as_deref(), Some("child-1"));
    }
}
