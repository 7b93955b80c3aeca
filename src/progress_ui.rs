//! Terminal progress display for the crawl and download phases.

use std::io::{self, IsTerminal};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use shovel_core::Progress;

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_draw(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Draws a spinner while collecting and a bar while downloading.
///
/// Links recorded in links-only mode are always printed to stdout.
pub(crate) struct TerminalProgress {
    draw: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub(crate) fn new(quiet: bool) -> Self {
        Self {
            draw: should_draw(io::stderr().is_terminal(), quiet, is_dumb_terminal()),
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, create: impl FnOnce() -> ProgressBar, update: impl FnOnce(&ProgressBar)) {
        if !self.draw {
            return;
        }
        if let Ok(mut slot) = self.bar.lock() {
            update(slot.get_or_insert_with(create));
        }
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner
}

fn download_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} Downloaded files: {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

impl Progress for TerminalProgress {
    fn collected(&self, count: usize) {
        self.with_bar(spinner, |bar| {
            bar.set_message(format!("Collected links: {count}"));
            bar.tick();
        });
    }

    fn begin_downloads(&self, total: usize) {
        if !self.draw {
            return;
        }
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(previous) = slot.take() {
                previous.finish_and_clear();
            }
            *slot = Some(download_bar(total));
        }
    }

    fn downloaded(&self, done: usize, total: usize) {
        self.with_bar(|| download_bar(total), |bar| bar.set_position(done as u64));
    }

    fn link(&self, url: &str) {
        let print = || println!("{url}");
        match self.bar.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(bar) => bar.suspend(print),
                None => print(),
            },
            Err(_) => print(),
        }
    }

    fn finish(&self) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(bar) = slot.take()
        {
            bar.finish_and_clear();
        }
    }
}
