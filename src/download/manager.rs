//! Per-record download policy and streaming.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::DownloadError;
use super::filename::{sanitize_filename, unique_path};
use super::links::LinkLog;
use crate::progress::{NoProgress, Progress};
use crate::record::{MediaKind, MediaRecord};

/// Which media kinds to save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaFilter {
    /// Everything.
    #[default]
    All,
    /// Skip videos.
    ImagesOnly,
    /// Skip images.
    VideosOnly,
}

impl MediaFilter {
    /// Returns true when records of `kind` pass the filter.
    ///
    /// Records of unknown kind always pass.
    #[must_use]
    pub fn allows(self, kind: MediaKind) -> bool {
        match self {
            Self::All => true,
            Self::ImagesOnly => kind != MediaKind::Video,
            Self::VideosOnly => kind != MediaKind::Image,
        }
    }
}

/// Download phase settings.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory media is written to. Must exist.
    pub output_dir: PathBuf,
    /// Media kind filter.
    pub filter: MediaFilter,
    /// Record direct URLs instead of downloading.
    pub links_only: bool,
    /// Skip records whose file name already exists instead of renaming.
    pub omit_existing: bool,
}

impl DownloadOptions {
    /// Saves everything into `output_dir`, renaming on collision.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            filter: MediaFilter::All,
            links_only: false,
            omit_existing: false,
        }
    }
}

/// What happened to each record of the download phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Records handed to the phase.
    pub total: usize,
    /// Files written.
    pub downloaded: usize,
    /// URLs written to the link file.
    pub linked: usize,
    /// Records excluded by the media filter.
    pub filtered: usize,
    /// Records skipped because the file already existed.
    pub skipped_existing: usize,
    /// Records whose download failed.
    pub failed: usize,
    /// True when the phase stopped on an interrupt.
    pub interrupted: bool,
}

impl DownloadStats {
    /// `Downloaded files: <downloaded>/<total>` status line.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("Downloaded files: {}/{}", self.downloaded, self.total)
    }
}

enum Outcome {
    Downloaded(PathBuf),
    Linked,
    Filtered,
    Existing,
}

/// Saves collected media according to [`DownloadOptions`].
pub struct DownloadManager<'a> {
    client: Client,
    options: DownloadOptions,
    links: Option<LinkLog>,
    progress: &'a dyn Progress,
}

impl<'a> DownloadManager<'a> {
    /// Creates a manager using `client` for media requests.
    ///
    /// `links` is where links-only mode writes; it is ignored otherwise.
    #[must_use]
    pub fn new(client: Client, options: DownloadOptions, links: Option<LinkLog>) -> Self {
        Self {
            client,
            options,
            links,
            progress: &NoProgress,
        }
    }

    /// Reports per-record progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Processes every record in order.
    ///
    /// Per-record network failures are logged and counted. The phase stops
    /// early, keeping what was saved, when `interrupted` is raised.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when a local write fails; the remaining
    /// records are not processed.
    pub async fn download_all(
        &self,
        records: &[MediaRecord],
        interrupted: &AtomicBool,
    ) -> Result<DownloadStats, DownloadError> {
        let mut stats = DownloadStats {
            total: records.len(),
            ..DownloadStats::default()
        };
        let report_status = !self.options.links_only;
        if report_status {
            info!("{}", stats.status_line());
        }
        self.progress.begin_downloads(stats.total);

        for (index, record) in records.iter().enumerate() {
            if interrupted.load(Ordering::SeqCst) {
                stats.interrupted = true;
                break;
            }

            match self.process(record).await {
                Ok(Outcome::Downloaded(path)) => {
                    stats.downloaded += 1;
                    debug!(path = %path.display(), "saved");
                }
                Ok(Outcome::Linked) => stats.linked += 1,
                Ok(Outcome::Filtered) => stats.filtered += 1,
                Ok(Outcome::Existing) => stats.skipped_existing += 1,
                Err(error) if error.is_fatal() => {
                    self.progress.finish();
                    return Err(error);
                }
                Err(error) => {
                    stats.failed += 1;
                    warn!(error = %error, "Failed to download");
                }
            }
            self.progress.downloaded(index + 1, stats.total);
        }

        self.progress.finish();
        if report_status {
            info!("{}", stats.status_line());
        }
        Ok(stats)
    }

    #[instrument(skip(self, record), fields(file = %record.filename))]
    async fn process(&self, record: &MediaRecord) -> Result<Outcome, DownloadError> {
        if !self.options.filter.allows(record.kind) {
            debug!(kind = %record.kind, "excluded by media filter");
            return Ok(Outcome::Filtered);
        }

        if self.options.links_only {
            self.progress.link(&record.direct_url);
            if let Some(links) = &self.links {
                links.append(&record.direct_url).await?;
            }
            return Ok(Outcome::Linked);
        }

        let dir = &self.options.output_dir;
        let name = sanitize_filename(&record.filename);
        if self.options.omit_existing && has_entry_named(dir, &name).await? {
            info!("Skipping download for already existing file: {name}");
            return Ok(Outcome::Existing);
        }

        // The request goes out before the file is created so failures leave nothing behind.
        let response = self.request(&record.direct_url).await?;
        let path = unique_path(dir, &name)
            .await
            .map_err(|e| DownloadError::io(dir, e))?;
        save_response(response, &record.direct_url, &path).await?;
        Ok(Outcome::Downloaded(path))
    }

    async fn request(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

// Exact, case-sensitive match against the directory listing.
async fn has_entry_named(dir: &Path, name: &str) -> Result<bool, DownloadError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| DownloadError::io(dir, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DownloadError::io(dir, e))?
    {
        if entry.file_name().to_str() == Some(name) {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn save_response(
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let file = File::create(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    let result = stream_to_file(file, response, url, path).await;
    if matches!(result, Err(ref error) if !error.is_fatal()) {
        debug!(path = %path.display(), "removing partial file");
        if let Err(error) = tokio::fs::remove_file(path).await {
            debug!(path = %path.display(), error = %error, "partial file not removed");
        }
    }
    result
}

async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DownloadError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    Ok(written)
}
