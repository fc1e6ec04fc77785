pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod report;
pub mod search;
pub mod spec;

pub use config::{ConfigOverrides, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use report::{CollectMode, ProgressReporter, ResultCollector};
pub use search::{run_search, search, SearchSummary};
pub use spec::SearchSpec;
