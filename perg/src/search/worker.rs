use tracing::trace;

use super::context::ContextExtractor;
use super::cursor::LineCursor;
use super::matcher::LineMatcher;
use super::partition::WorkUnit;
use crate::errors::{SearchError, SearchResult};
use crate::results::{OutputBuffer, UnitSummary};

/// Buffer and counters handed back to the engine for one completed unit.
///
/// `truncated` is set when a read failure cut the unit short after
/// processing had begun; whatever the buffer already holds is still valid
/// output and the engine publishes it before reporting the error.
#[derive(Debug)]
pub struct UnitOutput {
    pub buffer: OutputBuffer,
    pub summary: UnitSummary,
    pub truncated: Option<SearchError>,
}

/// Processes one work unit at a time: streams lines through the matcher,
/// runs context capture on emits, and accumulates a private output buffer.
///
/// The worker owns nothing shared; the matcher is borrowed immutably and
/// the cursor and buffer live only for the duration of one unit.
#[derive(Debug, Clone)]
pub struct SearchWorker<'a> {
    matcher: &'a LineMatcher,
    extractor: ContextExtractor,
    verbose: bool,
}

impl<'a> SearchWorker<'a> {
    pub fn new(matcher: &'a LineMatcher, context_lines: usize, verbose: bool) -> Self {
        Self {
            matcher,
            extractor: ContextExtractor::new(context_lines),
            verbose,
        }
    }

    /// Consumes one unit, returning its formatted output.
    ///
    /// Opening the unit's file can fail; the caller decides whether that
    /// skips the unit or aborts the run.
    pub fn process(&self, unit: &WorkUnit) -> SearchResult<UnitOutput> {
        trace!("Processing unit: {:?}", unit);
        let mut cursor = match unit {
            WorkUnit::File(path) => LineCursor::open(path)?,
            WorkUnit::Block { path, start, end } => LineCursor::open_range(path, *start, *end)?,
        };

        let display = unit.path().display().to_string();
        let mut buffer = OutputBuffer::new();
        let mut summary = UnitSummary::default();

        // Context capture is documented as incompatible with inversion:
        // selecting non-matching lines would reset the window on every
        // captured line that fails to match, swallowing the rest of the
        // unit. Inverted searches emit bare lines only.
        let capture_context = self.extractor.is_enabled() && !self.matcher.is_inverted();

        let mut truncated = None;
        loop {
            let line = match cursor.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                // Already-accumulated output stays valid when a read
                // fails partway through the unit; stop here and let the
                // engine publish what we have.
                Err(e) => {
                    truncated = Some(e);
                    break;
                }
            };
            if !self.matcher.should_emit(&line) {
                continue;
            }

            if self.verbose {
                buffer.push_line(&format!("{}: {}", display, line));
            } else {
                buffer.push_line(&line);
            }
            summary.matched_lines += 1;

            if capture_context {
                match self.extractor.capture(&mut cursor, self.matcher, &mut buffer) {
                    Ok(captured) => summary.context_lines += captured,
                    Err(e) => {
                        truncated = Some(e);
                        buffer.push_line("--");
                        break;
                    }
                }
                // Group separator, conventional grep context style
                buffer.push_line("--");
            }
        }

        Ok(UnitOutput {
            buffer,
            summary,
            truncated,
        })
    }
}
