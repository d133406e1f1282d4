//! Events logged by sift workers.
//!
//! Workers look up the `"sift"` stream in their registry. Nothing is registered by
//! default, in which case the events are never constructed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregate::FlushSummary;

/// Identifies the worker that logged an event.
pub type WorkerIdentifier = usize;
/// Logger type for worker-local logging.
pub type Logger<Event> = sift_logging::Logger<Event, WorkerIdentifier>;
/// Logger for sift pipeline events.
pub type SiftLogger = Logger<SiftEvent>;

/// The name of the stream sift events are logged to.
pub const SIFT_STREAM: &str = "sift";

/// Records the starting and stopping of an activity.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq, Ord, PartialOrd)]
pub enum StartStop {
    /// Activity starts.
    Start,
    /// Activity stops.
    Stop,
}

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
/// One stage of a chain invocation.
pub struct StageEvent {
    /// The name of the processor.
    pub name: String,
    /// Tuples the stage emitted.
    pub emitted: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
/// A completed chain invocation.
pub struct ChainEvent {
    /// Worker-local sequence number of the input.
    pub input: usize,
    /// Tuples the whole chain emitted.
    pub emitted: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
/// A flush of a worker's batch into the shared aggregator.
pub struct FlushEvent {
    /// `Start` before the lock is taken, `Stop` once the flush returned.
    pub start_stop: StartStop,
    /// What the flush did, once it succeeded.
    pub summary: Option<FlushSummary>,
}

impl FlushEvent {
    /// Creates a new flush start event.
    pub fn start() -> Self { FlushEvent { start_stop: StartStop::Start, summary: None } }
    /// Creates a new flush stop event, with the summary of a successful flush.
    pub fn stop(summary: Option<FlushSummary>) -> Self { FlushEvent { start_stop: StartStop::Stop, summary } }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
/// A worker entering or leaving its input loop.
pub struct WorkerEvent {
    /// `Start` when the loop begins, `Stop` when it ends.
    pub start_stop: StartStop,
    /// Inputs processed so far.
    pub inputs: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// An event in a sift worker.
pub enum SiftEvent {
    /// Chain stage completion.
    Stage(StageEvent),
    /// Chain invocation completion.
    Chain(ChainEvent),
    /// Batch flush.
    Flush(FlushEvent),
    /// Worker loop start or stop.
    Worker(WorkerEvent),
    /// Unstructured event.
    Text(String),
}

impl From<StageEvent> for SiftEvent {
    fn from(v: StageEvent) -> SiftEvent { SiftEvent::Stage(v) }
}

impl From<ChainEvent> for SiftEvent {
    fn from(v: ChainEvent) -> SiftEvent { SiftEvent::Chain(v) }
}

impl From<FlushEvent> for SiftEvent {
    fn from(v: FlushEvent) -> SiftEvent { SiftEvent::Flush(v) }
}

impl From<WorkerEvent> for SiftEvent {
    fn from(v: WorkerEvent) -> SiftEvent { SiftEvent::Worker(v) }
}

impl From<String> for SiftEvent {
    fn from(v: String) -> SiftEvent { SiftEvent::Text(v) }
}

/// Writes each batch of events to standard error, one line per event.
pub fn print_batch(_time: &Duration, data: &mut Vec<(Duration, WorkerIdentifier, SiftEvent)>) {
    for (time, worker, event) in data.drain(..) {
        eprintln!("{:?}\tworker {}\t{:?}", time, worker, event);
    }
}
