use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::matcher::ContentMatcher;
use crate::errors::{SearchError, SearchResult};
use crate::filters::{classify, sorted_entries, EntryKind};
use crate::metrics::ScanMetrics;
use crate::spec::SearchSpec;

/// Progress after one more candidate finished scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkProgress {
    pub processed: u64,
    pub total: u64,
}

impl WalkProgress {
    /// processed / total, capped at 1.0 in case the tree grew after counting
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.processed as f64 / self.total as f64).min(1.0)
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }
}

/// Depth-first walk that scans every candidate and streams what it finds.
///
/// Recursion follows the same rules as [`super::counter::count_files`], so on
/// an unchanged tree the walk processes exactly `total` candidates.
pub struct TreeWalker<'a> {
    spec: &'a SearchSpec,
    matcher: ContentMatcher,
    total: u64,
    metrics: ScanMetrics,
}

impl<'a> TreeWalker<'a> {
    /// `total` is the candidate count taken before the walk; it is never revised.
    pub fn new(spec: &'a SearchSpec, total: u64) -> Self {
        Self::with_metrics(spec, total, ScanMetrics::new())
    }

    pub fn with_metrics(spec: &'a SearchSpec, total: u64, metrics: ScanMetrics) -> Self {
        Self {
            spec,
            matcher: spec.matcher().clone().with_metrics(metrics.clone()),
            total,
            metrics,
        }
    }

    /// Walks from the search root. Stops at the first error.
    pub fn walk(
        &self,
        results: &Sender<PathBuf>,
        progress: &Sender<WalkProgress>,
    ) -> SearchResult<()> {
        debug!(
            "Walking {} (max depth {}, {} candidates)",
            self.spec.root().display(),
            self.spec.max_depth(),
            self.total
        );
        self.walk_dir(self.spec.root(), 0, results, progress)
    }

    fn walk_dir(
        &self,
        dir: &Path,
        depth: usize,
        results: &Sender<PathBuf>,
        progress: &Sender<WalkProgress>,
    ) -> SearchResult<()> {
        if depth > self.spec.max_depth() {
            trace!("Pruning {} at depth {}", dir.display(), depth);
            return Ok(());
        }

        for entry in sorted_entries(dir)? {
            match classify(&entry, self.spec.extension())? {
                EntryKind::Directory(path) => {
                    self.walk_dir(&path, depth + 1, results, progress)?;
                }
                EntryKind::Candidate(path) => self.process_candidate(path, results, progress)?,
                EntryKind::Skipped => {}
            }
        }
        Ok(())
    }

    fn process_candidate(
        &self,
        path: PathBuf,
        results: &Sender<PathBuf>,
        progress: &Sender<WalkProgress>,
    ) -> SearchResult<()> {
        if self.matcher.is_match(&path)? {
            self.metrics.record_match();
            results.send(path).map_err(|_| SearchError::ChannelClosed)?;
        }

        let processed = self.metrics.processed().increment();
        progress
            .send(WalkProgress {
                processed,
                total: self.total,
            })
            .map_err(|_| SearchError::ChannelClosed)
    }
}
