//! The root of each single-threaded worker.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use std::time::Instant;

use crate::logging::{SiftLogger, WorkerIdentifier, SIFT_STREAM};

/// A worker thread's view of an execution.
///
/// Workers know their position among their peers and own a registry of named loggers.
/// They are created by [`execute`](crate::execute::execute) on their own thread, and never
/// leave it.
pub struct Worker {
    index: usize,
    peers: usize,
    timer: Instant,
    logging: Rc<RefCell<sift_logging::Registry<WorkerIdentifier>>>,
}

impl Worker {
    /// Allocates a new worker with index `index` among `peers` workers.
    pub fn new(index: usize, peers: usize) -> Worker {
        let now = Instant::now();
        Worker {
            index,
            peers,
            timer: now,
            logging: Rc::new(RefCell::new(sift_logging::Registry::new(now, index))),
        }
    }

    /// Index of the worker among its peers.
    pub fn index(&self) -> usize { self.index }
    /// Number of peer workers.
    pub fn peers(&self) -> usize { self.peers }
    /// The instant the worker was created, from which its log records are timed.
    pub fn timer(&self) -> Instant { self.timer }

    /// Provides access to named logging streams.
    pub fn log_register(&self) -> RefMut<'_, sift_logging::Registry<WorkerIdentifier>> {
        self.logging.borrow_mut()
    }

    /// Provides access to the sift logging stream, if one was registered.
    pub fn logging(&self) -> Option<SiftLogger> { self.log_register().get(SIFT_STREAM) }
}

impl Clone for Worker {
    fn clone(&self) -> Self {
        Worker {
            index: self.index,
            peers: self.peers,
            timer: self.timer,
            logging: Rc::clone(&self.logging),
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("index", &self.index)
            .field("peers", &self.peers)
            .finish_non_exhaustive()
    }
}
