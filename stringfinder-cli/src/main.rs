use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use stringfinder::{
    run_search, search::ScanMode, CollectMode, ConfigOverrides, ProgressReporter,
    ResultCollector, SearchConfig, SearchError, SearchSpec,
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, SearchError>;

/// Exit status for bad configuration or arguments
const EXIT_CONFIG: u8 = 2;
/// Exit status for failures during the search itself
const EXIT_FAILURE: u8 = 1;

/// Search a directory tree for files containing a piece of text
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to search in (default: current directory)
    directory: Option<PathBuf>,

    /// Text to search for
    text: Option<String>,

    /// File name suffix to search (e.g. .txt)
    extension: Option<String>,

    /// How many directory levels to descend (0 is treated as 1)
    #[arg(allow_negative_numbers = true)]
    depth: Option<i64>,

    /// Match lines against a regular expression instead of literal text
    #[arg(short = 'r', long)]
    regex: Option<String>,

    /// Scan literal text line by line instead of in raw chunks
    #[arg(long)]
    lines: bool,

    /// Print matches as they are found instead of after the search
    #[arg(long)]
    live: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Never prompt for missing arguments
    #[arg(long)]
    no_prompt: bool,

    /// Additional configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root_path: self.directory.clone(),
            search_text: self.text.clone(),
            regex_pattern: self.regex.clone(),
            file_extension: self.extension.clone(),
            max_depth: self.depth,
            scan_mode: self.lines.then_some(ScanMode::Lines),
            live_results: self.live,
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config =
        SearchConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli.overrides());
    init_logging(&config.log_level);

    if !cli.no_prompt {
        let stdin = io::stdin();
        prompt_for_missing(&cli, &mut config, &mut stdin.lock(), &mut io::stdout())?;
    }
    debug!("Effective configuration: {:?}", config);

    let spec = SearchSpec::from_config(&config)?;
    let reporter = if cli.quiet {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::new()
    };
    let mode = if config.live_results {
        CollectMode::Live
    } else {
        CollectMode::Deferred
    };
    let mut collector = ResultCollector::new(io::stdout(), mode).with_color(!cli.no_color);

    let summary = run_search(&spec, &reporter, &mut collector)?;
    debug!(
        "{} matches in {} files",
        summary.matches.len(),
        summary.processed_files
    );
    Ok(())
}

fn exit_status(err: &SearchError) -> u8 {
    if err.is_config() {
        EXIT_CONFIG
    } else {
        EXIT_FAILURE
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Asks for every input that neither the command line nor a config file set.
///
/// A blank answer keeps the default.
fn prompt_for_missing<R: BufRead, W: Write>(
    cli: &Cli,
    config: &mut SearchConfig,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let defaults = SearchConfig::default();

    if cli.directory.is_none() && config.root_path == defaults.root_path {
        let answer = ask(
            input,
            output,
            "Enter directory (leave empty for current directory): ",
        )?;
        if !answer.is_empty() {
            config.root_path = PathBuf::from(answer);
        }
    }

    if cli.text.is_none() && config.search_text.is_empty() && config.regex_pattern.is_empty() {
        config.search_text = ask(input, output, "Enter string to search: ")?;
    }

    if cli.extension.is_none() && config.file_extension == defaults.file_extension {
        config.file_extension = ask(input, output, "Enter file extension to search (.txt): ")?;
    }

    if cli.depth.is_none() && config.max_depth == defaults.max_depth {
        let answer = ask(input, output, "Enter search depth (default is 1): ")?;
        if !answer.is_empty() {
            config.max_depth = answer.parse().map_err(|_| {
                SearchError::config_error(format!("invalid search depth: {}", answer))
            })?;
        }
    }

    Ok(())
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question).map_err(SearchError::Output)?;
    output.flush().map_err(SearchError::Output)?;

    let mut answer = String::new();
    input.read_line(&mut answer).map_err(SearchError::Input)?;
    Ok(answer.trim().to_string())
}
