use crossbeam_channel::unbounded;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::matcher::LineMatcher;
use super::partition::{partition_blocks, partition_files, WorkUnit};
use super::sink::OutputSink;
use super::worker::SearchWorker;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::results::SearchSummary;
use crate::walker::collect_files;

/// Runs a search against the process stdout/stderr
pub fn search(config: &SearchConfig) -> SearchResult<SearchSummary> {
    let sink = OutputSink::stdio();
    search_with_sink(config, &sink)
}

/// Runs a full search: enumerate, partition, process concurrently, publish.
///
/// The strategy is selected by configuration. File-wise mode feeds whole
/// files through a shared queue that idle workers pop from; block-wise mode
/// takes files one at a time and statically splits each into contiguous
/// line ranges, one per worker. Per-unit open failures are reported and
/// skipped; the run itself fails only before any worker starts.
pub fn search_with_sink(config: &SearchConfig, sink: &OutputSink) -> SearchResult<SearchSummary> {
    config.validate()?;
    info!("Starting search with pattern: {}", config.pattern);

    let matcher = LineMatcher::new(&config.pattern, config.invert)?;
    if config.invert && config.context_lines > 0 {
        warn!("Trailing context is ignored for inverted searches");
    }

    let files = collect_files(config)?;
    debug!("Enumerated {} files", files.len());

    let threads = config.thread_count.get();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| SearchError::ThreadPool(e.to_string()))?;

    let worker = SearchWorker::new(&matcher, config.context_lines, config.verbose);
    let summary = Mutex::new(SearchSummary::new());

    if config.file_wise {
        run_file_wise(&pool, threads, files, &worker, sink, &summary);
    } else {
        run_block_wise(&pool, threads, files, &worker, sink, &summary);
    }

    let summary = summary
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    info!(
        "Search complete: {} matched lines, {} units done, {} skipped",
        summary.matched_lines, summary.units_completed, summary.units_skipped
    );
    Ok(summary)
}

/// File-wise strategy: whole files on a shared queue, popped dynamically
/// by whichever worker is idle. The channel is the only shared mutable
/// structure; receiving a unit removes it for every other worker.
fn run_file_wise(
    pool: &rayon::ThreadPool,
    threads: usize,
    files: Vec<std::path::PathBuf>,
    worker: &SearchWorker<'_>,
    sink: &OutputSink,
    summary: &Mutex<SearchSummary>,
) {
    let (tx, rx) = unbounded::<WorkUnit>();
    for unit in partition_files(files) {
        // Receivers outlive this loop, so send cannot fail
        let _ = tx.send(unit);
    }
    drop(tx);

    pool.scope(|scope| {
        for _ in 0..threads {
            let rx = rx.clone();
            scope.spawn(move |_| {
                while let Ok(unit) = rx.recv() {
                    run_unit(worker, &unit, sink, summary);
                }
            });
        }
    });
}

/// Block-wise strategy: files processed one after another, each statically
/// partitioned into disjoint line ranges. A file whose counting pass fails
/// is skipped like any other unreadable unit.
fn run_block_wise(
    pool: &rayon::ThreadPool,
    threads: usize,
    files: Vec<std::path::PathBuf>,
    worker: &SearchWorker<'_>,
    sink: &OutputSink,
    summary: &Mutex<SearchSummary>,
) {
    for file in files {
        let units = match partition_blocks(&file, threads) {
            Ok(units) => units,
            Err(e) => {
                record_skip(sink, summary, &e);
                continue;
            }
        };

        pool.scope(|scope| {
            for unit in &units {
                scope.spawn(move |_| {
                    run_unit(worker, unit, sink, summary);
                });
            }
        });
    }
}

fn run_unit(
    worker: &SearchWorker<'_>,
    unit: &WorkUnit,
    sink: &OutputSink,
    summary: &Mutex<SearchSummary>,
) {
    match worker.process(unit) {
        Ok(output) => {
            // Accumulated matches are published even when a read error
            // truncated the unit partway through.
            if let Err(e) = sink.publish(&output.buffer) {
                warn!("Failed to publish buffer for {:?}: {}", unit, e);
            }
            if let Some(error) = &output.truncated {
                if let Err(e) = sink.report_error(error) {
                    warn!("Failed to write diagnostic: {}", e);
                }
            }
            summary
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .record_unit(output.summary);
        }
        Err(e) => record_skip(sink, summary, &e),
    }
}

fn record_skip(sink: &OutputSink, summary: &Mutex<SearchSummary>, error: &SearchError) {
    if let Err(e) = sink.report_error(error) {
        warn!("Failed to write diagnostic: {}", e);
    }
    summary
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .record_skipped();
}
