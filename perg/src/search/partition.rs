use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::errors::{SearchError, SearchResult};

/// An independently processable slice of input, consumed by exactly one
/// worker and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    /// One whole file (file-wise strategy)
    File(PathBuf),
    /// A half-open range of 0-indexed lines within one file (block-wise
    /// strategy)
    Block {
        path: PathBuf,
        start: usize,
        end: usize,
    },
}

impl WorkUnit {
    pub fn path(&self) -> &Path {
        match self {
            WorkUnit::File(path) => path,
            WorkUnit::Block { path, .. } => path,
        }
    }
}

/// Turns each file into one whole-file unit. The engine feeds these into a
/// shared queue that idle workers pop from, so load balances dynamically
/// when file sizes vary.
pub fn partition_files(files: Vec<PathBuf>) -> Vec<WorkUnit> {
    files.into_iter().map(WorkUnit::File).collect()
}

/// Statically splits one file into `workers` contiguous line blocks of
/// `ceil(total / workers)` lines each.
///
/// The returned ranges are non-overlapping and together cover
/// `[0, total)`. When the line count does not divide evenly, the last
/// block is shorter and trailing zero-length blocks are dropped. Imbalance
/// across blocks is not rebalanced.
pub fn partition_blocks(path: &Path, workers: usize) -> SearchResult<Vec<WorkUnit>> {
    debug_assert!(workers > 0);
    let total = count_lines(path)?;
    debug!(
        "Partitioning {} ({} lines) into {} blocks",
        path.display(),
        total,
        workers
    );

    if total == 0 {
        return Ok(Vec::new());
    }

    let block_size = total.div_ceil(workers);
    let units = (0..workers)
        .map(|k| (k * block_size, total.min((k + 1) * block_size)))
        .filter(|(start, end)| start < end)
        .map(|(start, end)| WorkUnit::Block {
            path: path.to_path_buf(),
            start,
            end,
        })
        .collect();
    Ok(units)
}

/// First pass of the block-wise strategy: counts the lines the cursor will
/// later yield. A trailing fragment without a final newline counts as a
/// line, matching `LineCursor` semantics.
pub fn count_lines(path: &Path) -> SearchResult<usize> {
    let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;

    // A memory map lets the count run over the raw bytes without line
    // allocation; empty files and virtual filesystems fall back to
    // buffered reads.
    match unsafe { Mmap::map(&file) } {
        Ok(mmap) => Ok(count_lines_in_bytes(&mmap)),
        Err(e) => {
            trace!("mmap failed for {} ({}), falling back", path.display(), e);
            count_lines_buffered(path, file)
        }
    }
}

fn count_lines_in_bytes(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        None => 0,
        Some(b'\n') => newlines,
        Some(_) => newlines + 1,
    }
}

fn count_lines_buffered(path: &Path, file: File) -> SearchResult<usize> {
    let mut reader = BufReader::new(file);
    let mut count = 0;
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| SearchError::from_io(path, e))?;
        if read == 0 {
            return Ok(count);
        }
        count += 1;
    }
}
