//! The concurrent search engine.
//!
//! Work flows through this module tree in one direction: the engine
//! partitions the enumerated files into work units, a pool of workers
//! drives the matcher and context extractor over each unit through an
//! owned line cursor, and finished output buffers are serialized through
//! the shared sink. Two strategies exist for dividing the work: whole
//! files popped off a shared queue, or contiguous line blocks statically
//! assigned within one file.

pub mod context;
pub mod cursor;
pub mod engine;
pub mod matcher;
pub mod partition;
pub mod sink;
pub mod worker;

pub use context::ContextExtractor;
pub use cursor::LineCursor;
pub use engine::{search, search_with_sink};
pub use matcher::LineMatcher;
pub use partition::{partition_blocks, partition_files, WorkUnit};
pub use sink::OutputSink;
pub use worker::SearchWorker;
