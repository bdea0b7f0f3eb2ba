use std::io::Write;
use std::sync::Mutex;
use tracing::warn;

use crate::errors::{SearchError, SearchResult};
use crate::results::OutputBuffer;

/// Serializes workers' output buffers to the shared sinks.
///
/// `publish` writes a whole buffer under one lock acquisition, so output
/// from two workers can never interleave mid-buffer. No cross-worker
/// ordering is guaranteed: buffers land in completion order. Diagnostics
/// for failed units go to the separate error sink.
pub struct OutputSink {
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl OutputSink {
    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Sink wired to the process stdout/stderr
    pub fn stdio() -> Self {
        Self::new(Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }

    /// Writes `buffer` to the output sink as one uninterrupted unit.
    /// Empty buffers are dropped without taking the lock.
    pub fn publish(&self, buffer: &OutputBuffer) -> SearchResult<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        out.write_all(buffer.as_str().as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Emits the one-line diagnostic for a unit that could not be opened
    /// or was cut short mid-read. The run continues with the remaining
    /// units.
    pub fn report_error(&self, error: &SearchError) -> SearchResult<()> {
        warn!("Unit failed: {}", error);
        let mut err = self.err.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(err, "perg: {}", error)?;
        Ok(())
    }
}
