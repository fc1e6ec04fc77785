/// Error types for stringfinder.
///
/// Errors fall into two families. Configuration errors (bad depth, bad regex, bad
/// config file) are detected before any directory is read. IO errors (unreadable
/// directory, unopenable file, failed read) abort the whole run at the first
/// occurrence. An empty result set is not an error.
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during a search run
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),
    #[error("Output error: {0}")]
    Output(#[source] io::Error),
    #[error("Input error: {0}")]
    Input(#[source] io::Error),
    #[error("Failed to start the {task} task: {source}")]
    Spawn {
        task: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("Channel closed unexpectedly")]
    ChannelClosed,
    #[error("The {0} task panicked")]
    WorkerPanicked(&'static str),
}

impl SearchError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Attaches `path` to a filesystem error, keeping the common kinds distinct.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::file_not_found(path),
            io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// True for errors raised before any filesystem work starts.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_) | Self::InvalidPattern(_) | Self::ConfigFile(_)
        )
    }
}
