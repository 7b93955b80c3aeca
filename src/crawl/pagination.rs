//! Album pagination.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, instrument};
use url::Url;

use super::CrawlError;
use crate::extract::EmbeddedData;
use crate::fetch::{PAGE_KEY, PAGE_PARAM, Page, PageSource, has_query_key};
use crate::progress::Progress;
use crate::record::RecordSet;

/// Sort order requested when a link carries no query.
const DEFAULT_SORT: &str = "sort=3";

/// Rewrites an album link so a page number can be appended to it.
///
/// - a link with a `page` key is cut back to its last `page=`
/// - a link with a `sort` key gets `&page=` appended
/// - any other link gets `sort=3&page=` added to its query
///
/// Returns `None` when the link is not an absolute URL.
#[must_use]
pub fn page_template(link: &str) -> Option<String> {
    let mut url = Url::parse(link.trim()).ok()?;
    if url.cannot_be_a_base() {
        return None;
    }
    url.set_fragment(None);
    let base = url.as_str();

    let template = match url.query() {
        Some(_) if has_query_key(&url, PAGE_KEY) => {
            let cut = last_page_param(base)?;
            format!("{}{PAGE_PARAM}", &base[..cut])
        }
        Some(_) if has_query_key(&url, "sort") => format!("{}{PAGE_PARAM}", with_separator(base)),
        Some(q) if !q.is_empty() => format!("{}{DEFAULT_SORT}&{PAGE_PARAM}", with_separator(base)),
        _ => format!("{}?{DEFAULT_SORT}&{PAGE_PARAM}", base.trim_end_matches('?')),
    };
    Some(template)
}

/// Byte offset of the last `page=` that starts a query pair.
fn last_page_param(base: &str) -> Option<usize> {
    base.rmatch_indices(PAGE_PARAM)
        .map(|(at, _)| at)
        .find(|&at| base[..at].ends_with(['?', '&']))
}

fn with_separator(base: &str) -> String {
    if base.ends_with('&') {
        base.to_string()
    } else {
        format!("{base}&")
    }
}

/// Collects every record of one album, page by page.
///
/// Fetches page 1, 2, ... with end detection until the fetch fails, the site
/// redirects off the sequence, or a page has no items. Interruption stops
/// the loop; a page whose fetch was in flight when the flag was raised is
/// discarded.
///
/// # Errors
///
/// Returns [`CrawlError::InvalidLink`] when no page template can be built.
#[instrument(skip(source, extractor, interrupted, progress))]
pub async fn iterate_album(
    source: &dyn PageSource,
    extractor: &dyn EmbeddedData,
    url: &str,
    interrupted: &AtomicBool,
    progress: &dyn Progress,
) -> Result<RecordSet, CrawlError> {
    let template = page_template(url).ok_or_else(|| CrawlError::invalid_link(url))?;
    let mut collected = RecordSet::new();

    for page in 1u64.. {
        if interrupted.load(Ordering::SeqCst) {
            debug!(page, "interrupted before fetch");
            break;
        }

        let page_url = format!("{template}{page}");
        let fetched = source.fetch_page(&page_url, true).await;
        if interrupted.load(Ordering::SeqCst) {
            debug!(page, "interrupted during fetch, discarding page");
            break;
        }

        let content = match fetched {
            Some(Page::Content(content)) => content,
            Some(Page::EndMarker) => {
                debug!(page, "end of album");
                break;
            }
            None => {
                debug!(page, "page fetch failed, stopping album");
                break;
            }
        };

        let Some(listing) = extractor.extract_collection(&content) else {
            debug!(page, "no items on page, end of album");
            break;
        };

        if listing.is_first_page()
            && let Some(stats) = listing.stats
        {
            info!(images = stats.images, videos = stats.videos, sub_albums = stats.sub_albums, "Album stats");
        }

        let added = collected.merge(listing.records);
        debug!(page, added, total = collected.len(), "collected page");
        progress.collected(collected.len());
    }

    Ok(collected)
}
