//! Link processing: classification, guest access, and record collection.
//!
//! [`Crawler::collect`] walks the input targets in order. Each target is
//! fetched once, classified, then handled by its category:
//!
//! | Category | Handling |
//! |---|---|
//! | Bucket / Album | paginated, or walked recursively with `-r` |
//! | GuestAlbum | guest password entered first, then as an album |
//! | Image | single media blob extracted |
//! | Unsupported | reported with the site's message, if any |
//!
//! Per-target failures are collected in the [`CrawlReport`]; they never
//! stop the run.

mod error;
pub mod frontier;
pub mod pagination;

pub use error::CrawlError;
pub use frontier::{Frontier, crawl_recursive};
pub use pagination::{iterate_album, page_template};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, instrument, warn};

use crate::classify::{ContentCategory, classify};
use crate::extract::{EmbeddedData, markers};
use crate::fetch::{Page, PageSource};
use crate::input::Target;
use crate::progress::{NoProgress, Progress};
use crate::record::{MediaRecord, RecordSet};

/// Crawl behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Descend into sub-albums.
    pub recursive: bool,
}

/// A target that produced no records, with the reason.
#[derive(Debug)]
pub struct TargetFailure {
    /// The target link.
    pub url: String,
    /// What went wrong.
    pub error: CrawlError,
}

/// Outcome of collecting all targets.
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// Distinct records across all targets, in discovery order.
    pub records: Vec<MediaRecord>,
    /// Targets that failed.
    pub failures: Vec<TargetFailure>,
    /// True when collection stopped because of an interrupt.
    pub interrupted: bool,
}

impl CrawlReport {
    /// Number of authentication failures among the targets.
    #[must_use]
    pub fn auth_failures(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| failure.error.is_auth_failure())
            .count()
    }
}

/// Drives classification and collection over a list of targets.
pub struct Crawler<'a> {
    source: &'a dyn PageSource,
    extractor: &'a dyn EmbeddedData,
    options: CrawlOptions,
    interrupted: Arc<AtomicBool>,
    progress: &'a dyn Progress,
}

impl<'a> Crawler<'a> {
    /// Creates a crawler over a page source and extractor.
    #[must_use]
    pub fn new(source: &'a dyn PageSource, extractor: &'a dyn EmbeddedData, options: CrawlOptions) -> Self {
        Self {
            source,
            extractor,
            options,
            interrupted: Arc::new(AtomicBool::new(false)),
            progress: &NoProgress,
        }
    }

    /// Uses a shared interrupt flag.
    #[must_use]
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Reports running counts to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Collects records from every target.
    ///
    /// Records are deduplicated by direct URL across all targets. An
    /// interrupt stops collection and keeps what was gathered.
    pub async fn collect(&self, targets: &[Target]) -> CrawlReport {
        let mut records = RecordSet::new();
        let mut report = CrawlReport::default();

        for target in targets {
            if self.is_interrupted() {
                break;
            }
            match self.collect_target(target).await {
                Ok(found) => {
                    let added = records.merge(found.into_vec());
                    info!(url = %target, added, total = records.len(), "Collected links");
                }
                Err(error) => {
                    warn!(error = %error, "Skipping link");
                    report.failures.push(TargetFailure {
                        url: target.url.to_string(),
                        error,
                    });
                }
            }
        }

        self.progress.finish();
        report.interrupted = self.is_interrupted();
        report.records = records.into_vec();
        report
    }

    #[instrument(skip(self, target), fields(url = %target))]
    async fn collect_target(&self, target: &Target) -> Result<RecordSet, CrawlError> {
        let url = target.url.as_str();
        let Some(Page::Content(content)) = self.source.fetch_page(url, false).await else {
            return Err(CrawlError::could_not_connect(url));
        };
        info!("Processing: {url}");

        let category = classify(&target.url, Some(&content));
        match category {
            ContentCategory::GuestAlbum => {
                let password = target
                    .password()
                    .ok_or_else(|| CrawlError::missing_password(url))?;
                self.source
                    .enter_guest_password(&target.url, &content, password)
                    .await
                    .map_err(|e| CrawlError::authentication(url, e))?;
                self.collect_album(url).await
            }
            ContentCategory::Bucket | ContentCategory::Album => self.collect_album(url).await,
            ContentCategory::Image => {
                let record = self
                    .extractor
                    .extract_record(&content)
                    .ok_or_else(|| CrawlError::image_unavailable(url))?;
                Ok(std::iter::once(record).collect())
            }
            ContentCategory::Unsupported => Err(CrawlError::unsupported(
                url,
                markers::invalid_page_message(&content),
            )),
        }
    }

    async fn collect_album(&self, url: &str) -> Result<RecordSet, CrawlError> {
        if self.options.recursive {
            Ok(crawl_recursive(
                self.source,
                self.extractor,
                url,
                &self.interrupted,
                self.progress,
            )
            .await)
        } else {
            iterate_album(self.source, self.extractor, url, &self.interrupted, self.progress).await
        }
    }
}
