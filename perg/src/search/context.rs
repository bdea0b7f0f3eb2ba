use super::cursor::LineCursor;
use super::matcher::LineMatcher;
use crate::errors::SearchResult;
use crate::results::OutputBuffer;

/// Captures the trailing-context block after a matched line.
///
/// Up to `limit` lines following the match are consumed from the worker's
/// cursor and appended to the output. A captured line that itself matches
/// the pattern resets the remaining count to `limit`, so context windows
/// chain across consecutive matches instead of terminating early. Capture
/// stops at the cursor's boundary: end-of-file for whole-file units, the
/// assigned range end for block units.
#[derive(Debug, Clone, Copy)]
pub struct ContextExtractor {
    limit: usize,
}

impl ContextExtractor {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Consumes and appends context lines, returning how many were captured
    pub fn capture(
        &self,
        cursor: &mut LineCursor,
        matcher: &LineMatcher,
        buffer: &mut OutputBuffer,
    ) -> SearchResult<usize> {
        let mut remaining = self.limit;
        let mut captured = 0;

        while remaining > 0 {
            let Some(line) = cursor.next_line()? else {
                break;
            };
            buffer.push_line(&line);
            captured += 1;
            remaining -= 1;

            if matcher.is_match(&line) {
                remaining = self.limit;
            }
        }
        Ok(captured)
    }
}
