//! Link-only output: direct URLs appended to a timestamped text file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

use super::DownloadError;

/// `strftime` pattern of the link file name.
const LINKS_FILE_FORMAT: &str = "links-%Y-%m-%d_%H-%M-%S.txt";

/// Append-only list of direct media URLs for one run.
#[derive(Debug, Clone)]
pub struct LinkLog {
    path: PathBuf,
}

impl LinkLog {
    /// Link file in `dir`, named after the run start time.
    #[must_use]
    pub fn new(dir: &Path, started: DateTime<Local>) -> Self {
        Self {
            path: dir.join(Self::file_name(started)),
        }
    }

    /// File name for a run started at `started`.
    #[must_use]
    pub fn file_name(started: DateTime<Local>) -> String {
        started.format(LINKS_FILE_FORMAT).to_string()
    }

    /// Path of the link file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one URL as a line, creating the file on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the file cannot be opened or written.
    pub async fn append(&self, url: &str) -> Result<(), DownloadError> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| DownloadError::io(&self.path, e))?;
        file.write_all(format!("{url}\n").as_bytes())
            .await
            .map_err(|e| DownloadError::io(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| DownloadError::io(&self.path, e))
    }
}
