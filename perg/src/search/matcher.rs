use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::trace;

use crate::errors::{SearchError, SearchResult};

/// Compiled patterns are shared process-wide so repeated engine runs with
/// the same pattern skip recompilation.
static PATTERN_CACHE: Lazy<DashMap<String, Arc<Regex>>> = Lazy::new(DashMap::new);

/// Evaluates single lines against a compiled pattern.
///
/// The emit decision is `matches XOR invert`; matching itself is pure and
/// side-effect free, so one matcher can be shared by every worker.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    regex: Arc<Regex>,
    invert: bool,
}

impl LineMatcher {
    /// Compiles (or fetches from cache) the pattern for this run
    pub fn new(pattern: &str, invert: bool) -> SearchResult<Self> {
        if pattern.is_empty() {
            return Err(SearchError::invalid_pattern("empty pattern"));
        }

        let regex = if let Some(entry) = PATTERN_CACHE.get(pattern) {
            trace!("Pattern cache hit: {}", pattern);
            entry.clone()
        } else {
            let compiled = Arc::new(
                Regex::new(pattern).map_err(|e| SearchError::invalid_pattern(e.to_string()))?,
            );
            PATTERN_CACHE.insert(pattern.to_string(), compiled.clone());
            compiled
        };

        Ok(Self { regex, invert })
    }

    /// Raw pattern test, ignoring inversion. Context capture uses this to
    /// decide whether a captured line resets the remaining-lines counter.
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Whether this line should appear in the output
    pub fn should_emit(&self, line: &str) -> bool {
        self.is_match(line) != self.invert
    }

    /// Inversion and trailing context are mutually exclusive; workers skip
    /// context capture entirely for inverted searches.
    pub fn is_inverted(&self) -> bool {
        self.invert
    }
}
