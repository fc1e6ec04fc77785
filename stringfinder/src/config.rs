use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::search::matcher::{ScanMode, DEFAULT_CHUNK_SIZE};

/// Default capacity of the result channel between the walk and the collector
pub const DEFAULT_RESULT_BUFFER: usize = 100;

/// Raw configuration for a search run.
///
/// Values come from YAML files and the command line; nothing here is validated.
/// [`crate::spec::SearchSpec::from_config`] turns it into the immutable, checked
/// description the pipeline runs on.
///
/// # Configuration Locations
///
/// Loaded in increasing order of precedence:
/// 1. Global `$CONFIG_DIR/stringfinder/config.yaml`
/// 2. Local `.stringfinder.yaml` in the current directory
/// 3. A file passed with `--config`
///
/// Command-line values are applied last with [`SearchConfig::merge_with_cli`].
///
/// ```yaml
/// root_path: "src"
/// search_text: "TODO"
/// # Line-oriented regex; when set it replaces search_text
/// regex_pattern: ""
/// file_extension: ".rs"
/// max_depth: 3
/// # chunked | lines (default: chunked for text, lines for regex)
/// scan_mode: lines
/// live_results: false
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Root directory to start the walk from
    pub root_path: PathBuf,

    /// Literal text to look for
    pub search_text: String,

    /// Regular expression matched line by line. Empty means "use search_text".
    pub regex_pattern: String,

    /// File name suffix a candidate must end with (e.g. ".txt"). Empty matches every file.
    pub file_extension: String,

    /// Maximum number of directory levels below the root. 0 is treated as 1,
    /// negative values are rejected.
    pub max_depth: i64,

    /// Content scan strategy. None picks chunked for text and lines for regex.
    pub scan_mode: Option<ScanMode>,

    /// Read size for the chunked scan
    pub chunk_size: usize,

    /// Capacity of the bounded result channel
    pub result_buffer: usize,

    /// Print matches as they are discovered instead of after the walk
    pub live_results: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            search_text: String::new(),
            regex_pattern: String::new(),
            file_extension: String::new(),
            max_depth: 1,
            scan_mode: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            result_buffer: DEFAULT_RESULT_BUFFER,
            live_results: false,
            log_level: "warn".to_string(),
        }
    }
}

/// Values supplied on the command line. `None` leaves the file value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_path: Option<PathBuf>,
    pub search_text: Option<String>,
    pub regex_pattern: Option<String>,
    pub file_extension: Option<String>,
    pub max_depth: Option<i64>,
    pub scan_mode: Option<ScanMode>,
    pub live_results: bool,
    pub log_level: Option<String>,
}

impl SearchConfig {
    /// Loads configuration from the default locations plus an explicit file.
    ///
    /// The explicit file must exist; the default locations are optional.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("stringfinder/config.yaml")),
            Some(PathBuf::from(".stringfinder.yaml")),
        ];

        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges command-line values over configuration file values
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(root) = cli.root_path {
            self.root_path = root;
        }
        if let Some(text) = cli.search_text {
            self.search_text = text;
        }
        if let Some(pattern) = cli.regex_pattern {
            self.regex_pattern = pattern;
        }
        if let Some(ext) = cli.file_extension {
            self.file_extension = ext;
        }
        if let Some(depth) = cli.max_depth {
            self.max_depth = depth;
        }
        if cli.scan_mode.is_some() {
            self.scan_mode = cli.scan_mode;
        }
        if cli.live_results {
            self.live_results = true;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }
}
