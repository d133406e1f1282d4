//! Sift regroups scattered, concurrently produced records about review text into one
//! aggregated record per key and sentiment.
//!
//! The code is organized in modules that depend as little as possible on each other.
//!
//! **Data**: The [`tuple`] module defines [`Tuple`], an ordered schema of [`Field`]s bound to
//! optional scalars or lists, and the [`sentiment`] module the closed vocabulary of
//! sentiment labels.
//!
//! **Processing**: The [`processor`] module defines the [`Processor`] trait, its sequential
//! composition [`ProcessorChain`], and the stages of a review pipeline: line and word
//! splitting, sentiment tagging, tag identification and aspect filtering.
//!
//! **Aggregation**: The [`collector`] module defines the [`OutputCollector`] boundary and its
//! thread-safe [`SharedCollector`] handle. The [`shuffle`] module groups tuples by key, and
//! the [`aggregate`] module sums them per key and sentiment in one atomic flush. The
//! [`cloud`] module turns aggregated tuples into tag clouds.
//!
//! **Execution**: The [`execute`](mod@execute) module starts worker threads from a
//! [`Config`], and the [`pipeline`] module runs a chain on them, funnelling every worker's
//! output into one aggregator.
//!
//! # Examples
//!
//! ```rust
//! use sift::{AggregatingCollector, MemOutputCollector, MemSortMergeShuffler, OutputCollector};
//! use sift::{Datum, Field, Tuple};
//!
//! let tag = |source: &str, weight: i64| {
//!     Tuple::new(&[Field::Key, Field::Sources, Field::Values, Field::Sentiment])
//!         .with(Field::Key, "phone:battery")
//!         .with(Field::Sources, vec![Datum::from(source)])
//!         .with(Field::Values, vec![Datum::Int(weight)])
//!         .with(Field::Sentiment, "positive")
//! };
//!
//! let mut aggregator = AggregatingCollector::new(MemOutputCollector::new(), MemSortMergeShuffler);
//! aggregator.flush(vec![tag("r1", 1), tag("r2", 2), tag("r1", 3)]).unwrap();
//!
//! let results = aggregator.emitted_tuples();
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].list(Field::Values).unwrap(), &[Datum::Int(6)]);
//! assert_eq!(results[0].list(Field::Sources).unwrap().len(), 2);
//! ```

#![forbid(missing_docs)]

pub use aggregate::{AggregatingCollector, FlushSummary};
pub use cloud::{Tag, TagCloud};
pub use collector::{MemOutputCollector, OutputCollector, SharedCollector};
pub use config::Config;
pub use error::{Result, SiftError};
#[cfg(feature = "getopts")]
pub use execute::execute_from_args;
pub use execute::{execute, execute_directly, WorkerGuards};
pub use pipeline::{Pipeline, WorkerSummary};
pub use processor::{Processor, ProcessorChain};
pub use sentiment::Sentiment;
pub use shuffle::{MemSortMergeShuffler, Shuffler};
pub use tuple::{Datum, Field, Tuple, Value};
pub use worker::Worker;

/// Re-export of the `sift_logging` crate.
pub mod logging_core {
    pub use sift_logging::*;
}

pub mod aggregate;
pub mod cloud;
pub mod collector;
pub mod config;
pub mod error;
pub mod execute;
pub mod logging;
pub mod pipeline;
pub mod processor;
pub mod sentiment;
pub mod shuffle;
pub mod tuple;
pub mod worker;
