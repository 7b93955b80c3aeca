//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use shovel_core::download::MediaFilter;
use shovel_core::session::Credentials;

/// Download albums, libraries and single media from Photobucket.
///
/// Links may carry a guest password as a prefix:
/// `password@http://s12.photobucket.com/user/name/library/Album`
#[derive(Parser, Debug)]
#[command(name = "shovel")]
#[command(author, version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["urls", "file"])))]
#[command(group(ArgGroup::new("media").args(["images_only", "videos_only", "links_only"])))]
pub struct Args {
    /// One or more links to albums, libraries or media pages
    #[arg(short, long, num_args = 1..)]
    pub urls: Vec<String>,

    /// File with one link per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Descend into sub-albums
    #[arg(short, long)]
    pub recursive: bool,

    /// Directory to save media in (default: ./photobucket)
    #[arg(short, long)]
    pub output_directory: Option<PathBuf>,

    /// Skip files whose name already exists in the output directory
    #[arg(long)]
    pub omit_existing: bool,

    /// Download images only
    #[arg(long)]
    pub images_only: bool,

    /// Download videos only
    #[arg(long)]
    pub videos_only: bool,

    /// Only store direct links in links-<datetime>.txt
    #[arg(long)]
    pub links_only: bool,

    /// Account username or email
    #[arg(short = 'n', long, requires = "password")]
    pub username: Option<String>,

    /// Account password
    #[arg(short, long, requires = "username")]
    pub password: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Site root to crawl against
    #[arg(long, hide = true)]
    pub site_url: Option<String>,
}

impl Args {
    /// Media filter selected by the kind flags.
    #[must_use]
    pub fn media_filter(&self) -> MediaFilter {
        if self.images_only {
            MediaFilter::ImagesOnly
        } else if self.videos_only {
            MediaFilter::VideosOnly
        } else {
            MediaFilter::All
        }
    }

    /// Account credentials, when both parts were given.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            _ => None,
        }
    }

    /// Default log level: `-q` wins over `-v`.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
