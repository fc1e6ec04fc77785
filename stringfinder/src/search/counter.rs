use std::path::Path;
use tracing::{debug, trace};

use crate::errors::SearchResult;
use crate::filters::{classify, sorted_entries, EntryKind};

/// Counts the candidates the walk will scan.
///
/// `dir` is depth 0. A directory at depth `d` is listed only while
/// `d <= max_depth`, so a file directly inside it is counted and anything
/// further down is not. Any listing failure aborts the count.
pub fn count_files(dir: &Path, extension: &str, max_depth: usize) -> SearchResult<u64> {
    let total = count_in(dir, extension, max_depth, 0)?;
    debug!(
        "Counted {} candidate files under {} (max depth {})",
        total,
        dir.display(),
        max_depth
    );
    Ok(total)
}

fn count_in(dir: &Path, extension: &str, max_depth: usize, depth: usize) -> SearchResult<u64> {
    if depth > max_depth {
        trace!("Depth limit reached at {}", dir.display());
        return Ok(0);
    }

    let mut count = 0;
    for entry in sorted_entries(dir)? {
        match classify(&entry, extension)? {
            EntryKind::Directory(path) => {
                count += count_in(&path, extension, max_depth, depth + 1)?;
            }
            EntryKind::Candidate(_) => count += 1,
            EntryKind::Skipped => {}
        }
    }
    Ok(count)
}
