use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::search::matcher::{ContentMatcher, MatchRule};

/// Largest accepted capacity for the result channel
pub const MAX_RESULT_BUFFER: usize = 1 << 20;

/// Validated, immutable description of one search run.
///
/// All configuration errors surface from [`SearchSpec::from_config`], before
/// any directory is read.
#[derive(Debug, Clone)]
pub struct SearchSpec {
    root: PathBuf,
    extension: String,
    max_depth: usize,
    matcher: ContentMatcher,
    result_buffer: usize,
}

impl SearchSpec {
    pub fn from_config(config: &SearchConfig) -> SearchResult<Self> {
        let max_depth = normalize_depth(config.max_depth)?;
        if config.result_buffer > MAX_RESULT_BUFFER {
            return Err(SearchError::config_error(format!(
                "result buffer {} exceeds the maximum of {}",
                config.result_buffer, MAX_RESULT_BUFFER
            )));
        }

        let rule = if config.regex_pattern.is_empty() {
            if config.search_text.is_empty() {
                return Err(SearchError::config_error(
                    "nothing to search for: provide search text or a regex pattern",
                ));
            }
            MatchRule::Literal(config.search_text.clone())
        } else {
            debug!("Compiling regex pattern: {}", config.regex_pattern);
            MatchRule::Pattern(
                Regex::new(&config.regex_pattern)
                    .map_err(|e| SearchError::invalid_pattern(e.to_string()))?,
            )
        };

        let mode = config.scan_mode.unwrap_or_else(|| rule.default_mode());
        let matcher = ContentMatcher::new(rule, mode)?.with_chunk_size(config.chunk_size)?;

        Ok(Self {
            root: config.root_path.clone(),
            extension: config.file_extension.clone(),
            max_depth,
            matcher,
            result_buffer: config.result_buffer,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn matcher(&self) -> &ContentMatcher {
        &self.matcher
    }

    pub fn rule(&self) -> &MatchRule {
        self.matcher.rule()
    }

    pub fn result_buffer(&self) -> usize {
        self.result_buffer
    }
}

/// Rejects negative depths and treats 0 as 1
pub fn normalize_depth(depth: i64) -> SearchResult<usize> {
    match depth {
        d if d < 0 => Err(SearchError::config_error(format!(
            "search depth must not be negative (got {})",
            d
        ))),
        0 => Ok(1),
        d => usize::try_from(d)
            .map_err(|_| SearchError::config_error(format!("search depth {} is too large", d))),
    }
}
