//! Directory listing and candidate filtering shared by the counter and the walker.
//!
//! Both passes must classify entries identically, otherwise the total computed up
//! front would not agree with the number of files the walk actually scans.
use std::ffi::OsStr;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::errors::{SearchError, SearchResult};

/// How a directory entry takes part in the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A real directory to descend into (symlinks are never followed)
    Directory(PathBuf),
    /// A file whose name carries the target extension
    Candidate(PathBuf),
    /// Anything else
    Skipped,
}

/// Checks if a file name ends with the configured extension suffix.
///
/// The comparison is a plain, case-sensitive suffix test on the name, so `.txt`
/// matches `notes.txt` but not `NOTES.TXT`, and an empty suffix matches everything.
pub fn has_extension(name: &OsStr, extension: &str) -> bool {
    name.to_string_lossy().ends_with(extension)
}

/// Lists a directory sorted by file name so traversal order is deterministic.
pub fn sorted_entries(dir: &Path) -> SearchResult<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| SearchError::from_io(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SearchError::from_io(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

/// Classifies a listed entry against the extension filter
pub fn classify(entry: &DirEntry, extension: &str) -> SearchResult<EntryKind> {
    let path = entry.path();
    let file_type = entry
        .file_type()
        .map_err(|e| SearchError::from_io(&path, e))?;

    if file_type.is_dir() {
        return Ok(EntryKind::Directory(path));
    }
    if has_extension(&entry.file_name(), extension) {
        trace!("Candidate: {}", path.display());
        return Ok(EntryKind::Candidate(path));
    }
    Ok(EntryKind::Skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(OsStr::new("notes.txt"), ".txt"));
        assert!(has_extension(OsStr::new("archive.tar.gz"), ".gz"));
        assert!(has_extension(OsStr::new("archive.tar.gz"), ".tar.gz"));
        assert!(!has_extension(OsStr::new("notes.txt.bak"), ".txt"));
        // Case-sensitive suffix
        assert!(!has_extension(OsStr::new("NOTES.TXT"), ".txt"));
        // Suffix, not extension: no dot required
        assert!(has_extension(OsStr::new("Makefile"), "file"));
        assert!(has_extension(OsStr::new("anything"), ""));
    }

    #[test]
    fn test_sorted_entries() {
        let dir = tempdir().unwrap();
        for name in ["c.txt", "a.txt", "b"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let names: Vec<_> = sorted_entries(dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b", "c.txt"]);
    }

    #[test]
    fn test_sorted_entries_missing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = sorted_entries(&missing).unwrap_err();
        assert!(matches!(err, SearchError::FileNotFound(p) if p == missing));
    }

    #[test]
    fn test_classify() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub.txt")).unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        fs::write(dir.path().join("b.md"), "x").unwrap();

        let kinds: Vec<_> = sorted_entries(dir.path())
            .unwrap()
            .iter()
            .map(|e| classify(e, ".txt").unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Candidate(dir.path().join("a.txt")),
                EntryKind::Skipped,
                // Directories are never candidates, whatever their name
                EntryKind::Directory(dir.path().join("sub.txt")),
            ]
        );
    }
}
