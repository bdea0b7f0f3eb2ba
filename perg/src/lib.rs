pub mod config;
pub mod errors;
pub mod filters;
pub mod results;
pub mod search;
pub mod walker;

pub use config::SearchConfig;
pub use errors::{SearchError, SearchResult};
pub use results::{OutputBuffer, SearchSummary, UnitSummary};
pub use search::{search, search_with_sink, OutputSink};
