use crossbeam_channel::{bounded, unbounded};
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::counter::count_files;
use super::walker::TreeWalker;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::metrics::ScanMetrics;
use crate::report::{CollectMode, ProgressReporter, ResultCollector};
use crate::spec::SearchSpec;

/// Outcome of a completed search run
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    /// Candidates counted before the walk
    pub total_files: u64,
    /// Candidates the walk scanned
    pub processed_files: u64,
    /// Progress events the reporter received
    pub progress_updates: usize,
    /// Matching files in the order the walk found them
    pub matches: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Runs one search: count, then walk while both consumers run alongside.
///
/// The walk, the progress consumer and the result consumer each get their own
/// thread. Results travel over a bounded channel, so a slow collector holds the
/// walk back; progress travels over an unbounded one. The walk drops both
/// senders when it returns, which is how the consumers learn the run is over.
/// On failure the first walk error is returned after both consumers drained.
pub fn run_search<W: Write + Send>(
    spec: &SearchSpec,
    reporter: &ProgressReporter,
    collector: &mut ResultCollector<W>,
) -> SearchResult<SearchSummary> {
    let started = Instant::now();
    info!(
        "Starting search for {} in {}",
        spec.rule(),
        spec.root().display()
    );

    let total = count_files(spec.root(), spec.extension(), spec.max_depth())?;
    let metrics = ScanMetrics::new();
    let walker = TreeWalker::with_metrics(spec, total, metrics.clone());
    let sink = &mut *collector;

    let (walk_outcome, report, collected) = thread::scope(|scope| -> SearchResult<_> {
        let (result_tx, result_rx) = bounded(spec.result_buffer());
        let (progress_tx, progress_rx) = unbounded();

        let progress_task = thread::Builder::new()
            .name("progress".to_string())
            .spawn_scoped(scope, move || reporter.consume(total, progress_rx))
            .map_err(|source| SearchError::Spawn {
                task: "progress",
                source,
            })?;
        let results_task = thread::Builder::new()
            .name("results".to_string())
            .spawn_scoped(scope, move || sink.collect(result_rx))
            .map_err(|source| SearchError::Spawn {
                task: "results",
                source,
            })?;
        let walk_task = thread::Builder::new()
            .name("walk".to_string())
            .spawn_scoped(scope, move || walker.walk(&result_tx, &progress_tx))
            .map_err(|source| SearchError::Spawn {
                task: "walk",
                source,
            })?;

        let walk_outcome = walk_task
            .join()
            .map_err(|_| SearchError::WorkerPanicked("walk"))?;
        let report = progress_task
            .join()
            .map_err(|_| SearchError::WorkerPanicked("progress"))?;
        let collected = results_task
            .join()
            .map_err(|_| SearchError::WorkerPanicked("results"))?;
        Ok((walk_outcome, report, collected))
    })?;

    let matches = match (walk_outcome, collected) {
        (Ok(()), Ok(matches)) => matches,
        // The collector stopped first; its error is the cause
        (Ok(()), Err(e)) | (Err(SearchError::ChannelClosed), Err(e)) => {
            reporter.abandon();
            return Err(e);
        }
        (Err(e), _) => {
            reporter.abandon();
            return Err(e);
        }
    };

    let processed = metrics.processed().snapshot();
    reporter.finish(processed);
    collector.finish(&matches)?;

    let elapsed = started.elapsed();
    debug!("Progress reporter received {} updates", report.updates);
    metrics.log_stats();
    info!(
        "Search complete in {}: {} of {} files matched",
        humantime::format_duration(elapsed),
        matches.len(),
        processed
    );

    Ok(SearchSummary {
        total_files: total,
        processed_files: processed,
        progress_updates: report.updates,
        matches,
        elapsed,
    })
}

/// Validates `config` and runs a search without rendering anything
pub fn search(config: &SearchConfig) -> SearchResult<SearchSummary> {
    let spec = SearchSpec::from_config(config)?;
    let mode = if config.live_results {
        CollectMode::Live
    } else {
        CollectMode::Deferred
    };
    let mut collector = ResultCollector::new(io::sink(), mode);
    run_search(&spec, &ProgressReporter::hidden(), &mut collector)
}
