//! Result types shared between the search workers and the output sink.
//!
//! An `OutputBuffer` is owned exclusively by the worker that fills it; it
//! changes hands exactly once, when the worker publishes it through the
//! sink. Summaries are merged by the engine after all units complete.

/// Formatted text accumulated by one worker for one work unit.
///
/// Lines are stored newline-terminated in read order, so the whole buffer
/// can be written to the sink as a single uninterrupted block.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line, adding the trailing newline
    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Per-unit counters produced alongside an `OutputBuffer`
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitSummary {
    /// Lines emitted because they satisfied the match/invert decision
    pub matched_lines: usize,
    /// Additional lines emitted by trailing-context capture
    pub context_lines: usize,
}

/// Aggregate statistics for a whole search run
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchSummary {
    /// Work units processed to completion
    pub units_completed: usize,
    /// Work units skipped because their file could not be opened
    pub units_skipped: usize,
    /// Total matched lines across all units
    pub matched_lines: usize,
    /// Total trailing-context lines across all units
    pub context_lines: usize,
}

impl SearchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_unit(&mut self, unit: UnitSummary) {
        self.units_completed += 1;
        self.matched_lines += unit.matched_lines;
        self.context_lines += unit.context_lines;
    }

    pub fn record_skipped(&mut self) {
        self.units_skipped += 1;
    }

    /// True when at least one line was selected for output
    pub fn has_matches(&self) -> bool {
        self.matched_lines > 0
    }
}
