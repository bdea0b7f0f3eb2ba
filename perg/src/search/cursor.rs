use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::errors::{SearchError, SearchResult};

const BUFFER_CAPACITY: usize = 65536;

/// Forward-only line reader over one file, owned by exactly one worker.
///
/// A cursor opened with a range refuses to read at or past `end`, returning
/// `Ok(None)` instead: running off the end of a block's assigned range is an
/// expected condition, not an I/O failure. Real read failures carry the
/// file's path for the diagnostic line. The file handle is released when
/// the cursor drops, on every exit path.
#[derive(Debug)]
pub struct LineCursor {
    reader: BufReader<File>,
    path: PathBuf,
    next_index: usize,
    end: Option<usize>,
}

impl LineCursor {
    /// Opens a cursor over the whole file
    pub fn open(path: &Path) -> SearchResult<Self> {
        let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;
        Ok(Self {
            reader: BufReader::with_capacity(BUFFER_CAPACITY, file),
            path: path.to_path_buf(),
            next_index: 0,
            end: None,
        })
    }

    /// Opens an independent cursor over `[start, end)`, discarding the lines
    /// before `start`.
    pub fn open_range(path: &Path, start: usize, end: usize) -> SearchResult<Self> {
        let mut cursor = Self::open(path)?;
        cursor.end = Some(end);

        trace!("Fast-forwarding {} lines in {}", start, path.display());
        let mut discard = String::new();
        while cursor.next_index < start {
            discard.clear();
            if cursor.read_line_inner(&mut discard)? == 0 {
                break;
            }
            cursor.next_index += 1;
        }
        Ok(cursor)
    }

    fn read_line_inner(&mut self, buf: &mut String) -> SearchResult<usize> {
        self.reader
            .read_line(buf)
            .map_err(|e| SearchError::from_io(self.path.as_path(), e))
    }

    /// 0-based index of the line the next read will return
    pub fn line_index(&self) -> usize {
        self.next_index
    }

    /// Reads the next line within the cursor's range.
    ///
    /// Returns `Ok(None)` at end-of-file or at the range boundary. The
    /// returned line has its trailing newline stripped.
    pub fn next_line(&mut self) -> SearchResult<Option<String>> {
        if let Some(end) = self.end {
            if self.next_index >= end {
                return Ok(None);
            }
        }

        let mut line = String::new();
        if self.read_line_inner(&mut line)? == 0 {
            return Ok(None);
        }
        self.next_index += 1;

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_lines(dir: &tempfile::TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_reads_lines_in_order() {
        let dir = tempdir().unwrap();
        let path = write_lines(&dir, "a.txt", &["one", "two", "three"]);

        let mut cursor = LineCursor::open(&path).unwrap();
        assert_eq!(cursor.line_index(), 0);
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("one"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("two"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("three"));
        assert_eq!(cursor.next_line().unwrap(), None);
        assert_eq!(cursor.line_index(), 3);
    }

    #[test]
    fn test_range_cursor_skips_and_stops() {
        let dir = tempdir().unwrap();
        let path = write_lines(&dir, "a.txt", &["l0", "l1", "l2", "l3", "l4"]);

        let mut cursor = LineCursor::open_range(&path, 1, 3).unwrap();
        assert_eq!(cursor.line_index(), 1);
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("l1"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("l2"));
        // Boundary reached: no more lines in range, even though the file
        // continues
        assert_eq!(cursor.next_line().unwrap(), None);
        assert_eq!(cursor.next_line().unwrap(), None);
    }

    #[test]
    fn test_zero_length_range_reads_nothing() {
        let dir = tempdir().unwrap();
        let path = write_lines(&dir, "a.txt", &["l0", "l1"]);

        let mut cursor = LineCursor::open_range(&path, 2, 2).unwrap();
        assert_eq!(cursor.next_line().unwrap(), None);
    }

    #[test]
    fn test_missing_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "one\ntwo").unwrap();

        let mut cursor = LineCursor::open(&path).unwrap();
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("one"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("two"));
        assert_eq!(cursor.next_line().unwrap(), None);
    }

    #[test]
    fn test_crlf_line_endings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "one\r\ntwo\r\n").unwrap();

        let mut cursor = LineCursor::open(&path).unwrap();
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("one"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = LineCursor::open(Path::new("does/not/exist.txt")).unwrap_err();
        assert!(matches!(err, SearchError::FileNotFound(_)));
    }

    #[test]
    fn test_read_failure_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("binary.dat");
        std::fs::write(&path, b"ok line\n\xFF\xFE\xFD\n").unwrap();

        let mut cursor = LineCursor::open(&path).unwrap();
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("ok line"));

        let err = cursor.next_line().unwrap_err();
        assert!(matches!(err, SearchError::ReadError { .. }));
        assert!(err.to_string().contains("binary.dat"));
    }
}
