//! Starts a sift execution from configuration information and per-worker logic.

use std::thread;

use crate::config::Config;
use crate::error::{Result, SiftError};
use crate::logging::{print_batch, SiftEvent, SIFT_STREAM};
use crate::worker::Worker;

/// If set, workers log sift events to standard error.
pub const WORKER_LOG_VARIABLE: &str = "SIFT_WORKER_LOG";

/// Handles to the threads of an execution.
///
/// Dropping the guards waits for every worker to finish.
pub struct WorkerGuards<T: Send + 'static> {
    guards: Vec<thread::JoinHandle<T>>,
}

impl<T: Send + 'static> WorkerGuards<T> {
    /// The number of workers.
    pub fn len(&self) -> usize { self.guards.len() }

    /// True if there are no workers.
    pub fn is_empty(&self) -> bool { self.guards.is_empty() }

    /// Waits on the worker threads and returns the results they produce.
    ///
    /// A worker that panicked yields the panic message.
    pub fn join(mut self) -> Vec<std::result::Result<T, String>> {
        self.guards
            .drain(..)
            .map(|guard| guard.join().map_err(|e| panic_message(e.as_ref())))
            .collect()
    }
}

impl<T: Send + 'static> Drop for WorkerGuards<T> {
    fn drop(&mut self) {
        for guard in self.guards.drain(..) {
            // results of guards never joined are discarded
            let _ = guard.join();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        format!("{:?}", payload)
    }
}

fn install_default_logging(worker: &Worker) {
    if std::env::var_os(WORKER_LOG_VARIABLE).is_some() {
        worker.log_register().insert::<SiftEvent, _>(SIFT_STREAM, print_batch);
    }
}

/// Executes a single worker on the current thread.
///
/// Returns whatever the worker returns from its closure.
pub fn execute_directly<T, F>(func: F) -> T
where
    F: FnOnce(&mut Worker) -> T,
{
    let mut worker = Worker::new(0, 1);
    install_default_logging(&worker);
    func(&mut worker)
}

/// Executes `func` on each of `config.workers` new threads.
///
/// Each thread constructs its own [`Worker`] and calls `func` with it. The returned guards
/// can be joined to collect the workers' results.
///
/// # Examples
///
/// ```rust
/// use sift::{execute, Config};
///
/// let guards = execute(Config::process(3), |worker| worker.index()).unwrap();
/// let mut indices = guards.join().into_iter().map(Result::unwrap).collect::<Vec<_>>();
/// indices.sort();
/// assert_eq!(indices, vec![0, 1, 2]);
/// ```
pub fn execute<T, F>(config: Config, func: F) -> Result<WorkerGuards<T>>
where
    T: Send + 'static,
    F: Fn(&mut Worker) -> T + Send + Sync + 'static,
{
    config.validate()?;
    let logic = std::sync::Arc::new(func);
    let peers = config.workers;
    spawn_workers(peers, |index| {
        let logic = std::sync::Arc::clone(&logic);
        thread::Builder::new()
            .name(format!("sift:work-{}", index))
            .spawn(move || {
                let mut worker = Worker::new(index, peers);
                install_default_logging(&worker);
                (*logic)(&mut worker)
            })
    })
}

/// Spawns `peers` threads through `spawn`.
///
/// If a spawn fails, the threads already started are joined before the error is returned.
fn spawn_workers<T, S>(peers: usize, mut spawn: S) -> Result<WorkerGuards<T>>
where
    T: Send + 'static,
    S: FnMut(usize) -> std::io::Result<thread::JoinHandle<T>>,
{
    let mut guards = WorkerGuards { guards: Vec::with_capacity(peers) };
    for index in 0..peers {
        let guard = spawn(index).map_err(|e| SiftError::Worker(e.to_string()))?;
        guards.guards.push(guard);
    }
    Ok(guards)
}

/// Executes `func` with a configuration read from command line arguments.
///
/// The arguments are those of [`Config::from_args`].
#[cfg(feature = "getopts")]
pub fn execute_from_args<I, T, F>(iter: I, func: F) -> Result<WorkerGuards<T>>
where
    I: Iterator<Item = String>,
    T: Send + 'static,
    F: Fn(&mut Worker) -> T + Send + Sync + 'static,
{
    execute(Config::from_args(iter)?, func)
}
