//! The tree-walk-and-scan pipeline.
//!
//! [`counter`] establishes the candidate total, [`walker`] scans candidates and
//! streams progress and matches, [`matcher`] decides whether a single file
//! matches, and [`pipeline`] runs the walk and both stream consumers
//! concurrently.
pub mod counter;
pub mod matcher;
pub mod pipeline;
pub mod walker;

pub use counter::count_files;
pub use matcher::{ContentMatcher, MatchRule, ScanMode};
pub use pipeline::{run_search, search, SearchSummary};
pub use walker::{TreeWalker, WalkProgress};
