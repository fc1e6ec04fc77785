//! Consumers of the two streams produced by the walk.
//!
//! [`ProgressReporter`] renders the progress stream as a percentage bar and
//! [`ResultCollector`] renders matching paths. Both block on their channel
//! until the walk drops the sending side.
use colored::Colorize;
use crossbeam_channel::Receiver;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use tracing::trace;

use crate::errors::{SearchError, SearchResult};
use crate::search::walker::WalkProgress;

const PROGRESS_TEMPLATE: &str = "{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files";
/// The completion line stands alone, without the bar
const FINISH_TEMPLATE: &str = "{msg}";

/// What the progress consumer saw before its stream closed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressReport {
    pub updates: usize,
    pub last: Option<WalkProgress>,
}

/// Renders walk progress on an indicatif bar
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// A reporter drawing on stderr
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// A reporter that renders nothing
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar }
    }

    /// Renders every update until the stream closes
    pub fn consume(&self, total: u64, updates: Receiver<WalkProgress>) -> ProgressReport {
        self.bar.set_length(total);
        self.bar.set_message(progress_message(0.0));

        let mut report = ProgressReport::default();
        for update in updates.iter() {
            trace!("Progress {}/{}", update.processed, update.total);
            self.bar.set_position(update.processed);
            self.bar.set_message(progress_message(update.percent()));
            report.updates += 1;
            report.last = Some(update);
        }
        report
    }

    /// Renders the completion line
    pub fn finish(&self, processed: u64) {
        self.bar.set_style(
            ProgressStyle::with_template(FINISH_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar.finish_with_message(completion_message(processed));
    }

    /// Leaves the bar where it stopped after a failed run
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn progress_message(percent: f64) -> String {
    format!("Progress: {:.2}%", percent)
}

pub fn completion_message(processed: u64) -> String {
    format!("Progress: 100% - {} files processed.", processed)
}

/// When matches are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectMode {
    /// As soon as each one arrives
    Live,
    /// All at once after the stream closes
    #[default]
    Deferred,
}

/// Consumes the result stream and writes one line per matching file
pub struct ResultCollector<W: Write> {
    out: W,
    mode: CollectMode,
    use_color: bool,
}

impl<W: Write> ResultCollector<W> {
    pub fn new(out: W, mode: CollectMode) -> Self {
        Self {
            out,
            mode,
            use_color: true,
        }
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Drains the stream in arrival order. Live mode writes each path on arrival.
    pub fn collect(&mut self, results: Receiver<PathBuf>) -> SearchResult<Vec<PathBuf>> {
        if self.mode == CollectMode::Live {
            self.write_header()?;
        }

        let mut found = Vec::new();
        for path in results.iter() {
            if self.mode == CollectMode::Live {
                self.write_match(&path)?;
            }
            found.push(path);
        }
        Ok(found)
    }

    /// Writes buffered matches (deferred mode) and the empty-result line
    pub fn finish(&mut self, found: &[PathBuf]) -> SearchResult<()> {
        if self.mode == CollectMode::Deferred {
            self.write_header()?;
            for path in found {
                self.write_match(path)?;
            }
        }
        if found.is_empty() {
            writeln!(self.out, "No matching file found").map_err(SearchError::Output)?;
        }
        self.out.flush().map_err(SearchError::Output)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_header(&mut self) -> SearchResult<()> {
        writeln!(self.out, "Search Results:").map_err(SearchError::Output)
    }

    fn write_match(&mut self, path: &std::path::Path) -> SearchResult<()> {
        let shown = path.display().to_string();
        let shown = if self.use_color {
            shown.blue().to_string()
        } else {
            shown
        };
        writeln!(self.out, "Found in file: {}", shown).map_err(SearchError::Output)?;
        self.out.flush().map_err(SearchError::Output)
    }
}
