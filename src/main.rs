//! CLI entry point for shovel.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use shovel_core::config::{SiteConfig, prepare_output_dir};
use shovel_core::crawl::{CrawlOptions, Crawler};
use shovel_core::download::{DownloadManager, DownloadOptions, LinkLog};
use shovel_core::extract::SiteExtractor;
use shovel_core::input::{TargetList, load_targets_file, parse_targets};
use shovel_core::session::Session;
use tracing::{debug, error, info, warn};

mod cli;
mod progress_ui;

use cli::Args;
use progress_ui::TerminalProgress;

/// Process outcome mapped to an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// Run finished, even if some links failed.
    Success,
    /// Setup or local write failure.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            error!("{err:#}");
            ProcessExit::Failure.into()
        }
    }
}

async fn run(args: Args) -> Result<ProcessExit> {
    let started = chrono::Local::now();

    let site = match args.site_url.as_deref() {
        Some(url) => SiteConfig::for_base_url(url)?,
        None => SiteConfig::live()?,
    };

    let output_dir = if args.links_only {
        None
    } else {
        Some(prepare_output_dir(args.output_directory.as_deref())?)
    };

    let targets = load_input(&args, &site)?;
    for skipped in &targets.skipped {
        warn!(reason = %skipped, "Skipped input line");
    }
    if targets.is_empty() {
        info!("No usable links in input");
        return Ok(ProcessExit::Success);
    }
    info!(links = %targets, "Parsed input");

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_signal = Arc::clone(&interrupted);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            interrupted_signal.store(true, Ordering::SeqCst);
        }
    });

    let credentials = args.credentials();
    let session = Session::configure(site, credentials.as_ref()).await?;
    debug!(authenticated = session.is_authenticated(), "Session ready");
    let progress = TerminalProgress::new(args.quiet);

    let extractor = SiteExtractor;
    let crawler = Crawler::new(
        &session,
        &extractor,
        CrawlOptions {
            recursive: args.recursive,
        },
    )
    .with_interrupt(Arc::clone(&interrupted))
    .with_progress(&progress);
    let report = crawler.collect(&targets.targets).await;

    info!(
        records = report.records.len(),
        failed_links = report.failures.len(),
        auth_failures = report.auth_failures(),
        "Collection finished"
    );
    if report.interrupted {
        info!("Interrupted; continuing with the links collected so far");
        interrupted.store(false, Ordering::SeqCst);
    }

    let cwd = std::env::current_dir().context("current directory is unavailable")?;
    let options = DownloadOptions {
        output_dir: output_dir.unwrap_or_else(|| cwd.clone()),
        filter: args.media_filter(),
        links_only: args.links_only,
        omit_existing: args.omit_existing,
    };
    let links = args.links_only.then(|| LinkLog::new(&cwd, started));

    let manager = DownloadManager::new(session.download_client().clone(), options, links)
        .with_progress(&progress);
    match manager.download_all(&report.records, &interrupted).await {
        Ok(stats) => {
            if stats.interrupted {
                info!("Interrupted; stopped downloading");
            }
            Ok(ProcessExit::Success)
        }
        Err(err) => {
            error!("Failed to save the downloaded file: {err}");
            Ok(ProcessExit::Failure)
        }
    }
}

fn load_input(args: &Args, site: &SiteConfig) -> Result<TargetList> {
    let host = site.host();
    match &args.file {
        Some(path) => load_targets_file(path, host)
            .with_context(|| format!("failed to open input file {}", path.display())),
        None => Ok(parse_targets(args.urls.iter().map(String::as_str), host)),
    }
}
