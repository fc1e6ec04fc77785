use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, trace};

use crate::errors::{SearchError, SearchResult};
use crate::metrics::ScanMetrics;

/// Read size of the chunked scan
pub const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;
/// Largest accepted chunk size
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;
const BUFFER_CAPACITY: usize = 65536;
const LINE_CAPACITY: usize = 256;

/// How file content is read while looking for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Fixed-size raw chunks, literal text only. A match that straddles two
    /// chunks is not seen.
    Chunked,
    /// One line at a time. A match never spans lines.
    Lines,
}

/// What counts as a match
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// Case-sensitive substring
    Literal(String),
    /// Compiled regular expression
    Pattern(Regex),
}

impl MatchRule {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            MatchRule::Literal(needle) => text.contains(needle.as_str()),
            MatchRule::Pattern(regex) => regex.is_match(text),
        }
    }

    /// Scan mode used when none is configured
    pub fn default_mode(&self) -> ScanMode {
        match self {
            MatchRule::Literal(_) => ScanMode::Chunked,
            MatchRule::Pattern(_) => ScanMode::Lines,
        }
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::Literal(needle) => write!(f, "text {:?}", needle),
            MatchRule::Pattern(regex) => write!(f, "pattern /{}/", regex.as_str()),
        }
    }
}

/// Decides whether a file's content matches a rule, stopping at the first hit.
///
/// Content is treated as raw bytes and decoded lossily, so invalid UTF-8 never
/// fails a scan.
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    rule: MatchRule,
    mode: ScanMode,
    chunk_size: usize,
    metrics: ScanMetrics,
}

impl ContentMatcher {
    /// Creates a matcher, rejecting rule/mode combinations that cannot work
    pub fn new(rule: MatchRule, mode: ScanMode) -> SearchResult<Self> {
        if mode == ScanMode::Chunked && matches!(rule, MatchRule::Pattern(_)) {
            return Err(SearchError::config_error(
                "the chunked scan only supports literal text; use the line scan for regex patterns",
            ));
        }
        Ok(Self {
            rule,
            mode,
            chunk_size: DEFAULT_CHUNK_SIZE,
            metrics: ScanMetrics::new(),
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> SearchResult<Self> {
        if chunk_size == 0 {
            return Err(SearchError::config_error("chunk size must be greater than zero"));
        }
        if chunk_size > MAX_CHUNK_SIZE {
            return Err(SearchError::config_error(format!(
                "chunk size {} exceeds the maximum of {} bytes",
                chunk_size, MAX_CHUNK_SIZE
            )));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    /// Reports bytes read into `metrics` instead of a private instance
    pub fn with_metrics(mut self, metrics: ScanMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn rule(&self) -> &MatchRule {
        &self.rule
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Scans the file at `path`
    pub fn is_match(&self, path: &Path) -> SearchResult<bool> {
        trace!("Scanning file: {}", path.display());

        // Candidates may be symlinks; one that resolves to a directory has no content.
        let metadata = fs::metadata(path).map_err(|e| SearchError::from_io(path, e))?;
        if metadata.is_dir() {
            debug!("Skipping link to directory: {}", path.display());
            return Ok(false);
        }

        let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;
        let found = match self.mode {
            ScanMode::Chunked => self.scan_chunks(file),
            ScanMode::Lines => self.scan_lines(BufReader::with_capacity(BUFFER_CAPACITY, file)),
        }
        .map_err(|e| SearchError::from_io(path, e))?;

        if found {
            trace!("Match in file: {}", path.display());
        }
        Ok(found)
    }

    /// Reads full chunks of `chunk_size` bytes and tests each one on its own.
    pub fn scan_chunks<R: Read>(&self, mut reader: R) -> io::Result<bool> {
        // Grows through read_to_end, so a short file never costs a full chunk
        let mut chunk = Vec::new();
        loop {
            chunk.clear();
            let read = reader
                .by_ref()
                .take(self.chunk_size as u64)
                .read_to_end(&mut chunk)?;
            if read == 0 {
                return Ok(false);
            }
            self.metrics.record_bytes(read as u64);
            if self.rule.matches(&String::from_utf8_lossy(&chunk)) {
                return Ok(true);
            }
        }
    }

    /// Tests one line at a time, without its line terminator.
    pub fn scan_lines<R: BufRead>(&self, mut reader: R) -> io::Result<bool> {
        let mut line = Vec::with_capacity(LINE_CAPACITY);
        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                return Ok(false);
            }
            self.metrics.record_bytes(read as u64);
            if self
                .rule
                .matches(&String::from_utf8_lossy(trim_line_ending(&line)))
            {
                return Ok(true);
            }
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn literal(text: &str, mode: ScanMode) -> ContentMatcher {
        ContentMatcher::new(MatchRule::Literal(text.to_string()), mode).unwrap()
    }

    fn pattern(re: &str) -> ContentMatcher {
        ContentMatcher::new(MatchRule::Pattern(Regex::new(re).unwrap()), ScanMode::Lines).unwrap()
    }

    #[test]
    fn test_literal_is_case_sensitive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("greeting.txt");
        fs::write(&path, "Hello World\n").unwrap();

        for mode in [ScanMode::Chunked, ScanMode::Lines] {
            assert!(literal("Hello", mode).is_match(&path).unwrap());
            assert!(!literal("hello", mode).is_match(&path).unwrap());
        }
    }

    #[test]
    fn test_pattern_matches_single_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lib.rs");
        fs::write(&path, "use std::io;\n\npub fn scan(input: &str) {}\n").unwrap();

        assert!(pattern(r"^pub fn \w+\(").is_match(&path).unwrap());
        assert!(!pattern(r"^fn main").is_match(&path).unwrap());
    }

    #[test]
    fn test_pattern_never_spans_lines() {
        let matcher = pattern(r"foo\nbar");
        assert!(!matcher.scan_lines(Cursor::new("foo\nbar\n")).unwrap());
        assert!(!pattern("foo.bar").scan_lines(Cursor::new("foo\nbar")).unwrap());
    }

    #[test]
    fn test_line_endings_are_stripped() {
        let matcher = pattern(r"end$");
        assert!(matcher.scan_lines(Cursor::new("the end\r\nmore\r\n")).unwrap());
        assert!(matcher.scan_lines(Cursor::new("no newline at the end")).unwrap());
    }

    #[test]
    fn test_chunk_boundary_miss() {
        // "hello" starts at byte 6 and crosses the 8-byte chunk boundary
        let content = "xxxxxxhello world";
        let chunked = literal("hello", ScanMode::Chunked)
            .with_chunk_size(8)
            .unwrap();
        assert!(!chunked.scan_chunks(Cursor::new(content)).unwrap());

        // The same text fully inside the second chunk is found
        assert!(chunked.scan_chunks(Cursor::new("xxxxxxxxhello")).unwrap());

        // The line scan has no such boundary
        let lines = literal("hello", ScanMode::Lines);
        assert!(lines.scan_lines(Cursor::new(content)).unwrap());
    }

    #[test]
    fn test_default_chunk_boundary_miss() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let mut content = vec![b'a'; DEFAULT_CHUNK_SIZE - 2];
        content.extend_from_slice(b"needle");
        fs::write(&path, &content).unwrap();

        assert!(!literal("needle", ScanMode::Chunked).is_match(&path).unwrap());
        assert!(literal("needle", ScanMode::Lines).is_match(&path).unwrap());
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let bytes: &[u8] = b"\xff\xfe binary prefix needle \xc3\n";
        assert!(literal("needle", ScanMode::Chunked)
            .scan_chunks(Cursor::new(bytes))
            .unwrap());
        assert!(literal("needle", ScanMode::Lines)
            .scan_lines(Cursor::new(bytes))
            .unwrap());
    }

    #[test]
    fn test_empty_file_never_matches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        assert!(!literal("", ScanMode::Chunked).is_match(&path).unwrap());
        assert!(!pattern(".*").is_match(&path).unwrap());
    }

    #[test]
    fn test_stops_at_first_match() {
        let metrics = ScanMetrics::new();
        let matcher = literal("first", ScanMode::Lines).with_metrics(metrics.clone());
        assert!(matcher
            .scan_lines(Cursor::new("first line\nsecond line\n"))
            .unwrap());
        assert_eq!(metrics.get_stats().bytes_read, "first line\n".len() as u64);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let err = literal("x", ScanMode::Chunked).is_match(&path).unwrap_err();
        assert!(matches!(err, SearchError::FileNotFound(p) if p == path));
    }

    #[test]
    fn test_invalid_combinations() {
        let rule = MatchRule::Pattern(Regex::new("a+").unwrap());
        let err = ContentMatcher::new(rule, ScanMode::Chunked).unwrap_err();
        assert!(matches!(err, SearchError::ConfigError(_)));

        let err = literal("x", ScanMode::Chunked).with_chunk_size(0).unwrap_err();
        assert!(matches!(err, SearchError::ConfigError(_)));

        let err = literal("x", ScanMode::Chunked)
            .with_chunk_size(MAX_CHUNK_SIZE + 1)
            .unwrap_err();
        assert!(matches!(err, SearchError::ConfigError(_)));
        assert!(literal("x", ScanMode::Chunked)
            .with_chunk_size(MAX_CHUNK_SIZE)
            .is_ok());
    }

    #[test]
    fn test_default_modes() {
        assert_eq!(
            MatchRule::Literal("x".to_string()).default_mode(),
            ScanMode::Chunked
        );
        assert_eq!(
            MatchRule::Pattern(Regex::new("x").unwrap()).default_mode(),
            ScanMode::Lines
        );
    }
}
