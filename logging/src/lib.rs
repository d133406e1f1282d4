//! Worker-local logging infrastructure for sift pipelines.
//!
//! Each worker owns a [`Registry`] of named [`Logger`]s. A logger buffers typed events,
//! stamping each with the time elapsed since the registry was created and the identity of
//! the worker that produced it, and hands full buffers to a user-supplied action.
//!
//! Loggers are deliberately not `Send`: every worker thread logs into its own buffers and
//! never contends with other workers for a lock.

#![forbid(missing_docs)]

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// The upper limit, in bytes, of a logger's buffer before it is handed to the action.
pub const BUFFER_SIZE_BYTES: usize = 1 << 13;

/// The number of `T` records that fit in [`BUFFER_SIZE_BYTES`], and at least one.
pub const fn buffer_capacity<T>() -> usize {
    let size = std::mem::size_of::<T>();
    if size == 0 {
        BUFFER_SIZE_BYTES
    } else if size <= BUFFER_SIZE_BYTES {
        BUFFER_SIZE_BYTES / size
    } else {
        1
    }
}

/// A map from names to typed loggers.
///
/// The registry is owned by a worker, and is the place other components go to find the
/// logger for a named stream. Looking up a stream that was never registered is not an
/// error; the caller simply has nothing to log into.
pub struct Registry<E> {
    /// Identity stamped on every record logged through loggers built by this registry.
    id: E,
    /// Type-erased loggers, alongside a handle that can flush them.
    map: HashMap<String, (Box<dyn Any>, Box<dyn Flush>)>,
    /// The instant all timestamps are measured from.
    time: Instant,
}

impl<E: Clone + 'static> Registry<E> {
    /// Allocates an empty registry whose loggers measure time from `time`.
    pub fn new(time: Instant, id: E) -> Self {
        Registry {
            id,
            map: HashMap::new(),
            time,
        }
    }

    /// Binds a log name to an action on buffered records.
    ///
    /// The action receives the current elapsed time and a buffer of `(time, id, event)`
    /// records; it may drain the buffer, and any records left behind are discarded.
    ///
    /// Returns the logger previously bound to `name`, if any.
    pub fn insert<T: 'static, F: FnMut(&Duration, &mut Vec<(Duration, E, T)>) + 'static>(
        &mut self,
        name: &str,
        action: F,
    ) -> Option<Box<dyn Any>> {
        let logger = Logger::<T, E>::new(self.time, Duration::default(), self.id.clone(), action);
        self.insert_logger(name, logger)
    }

    /// Binds a log name to a logger.
    pub fn insert_logger<T: 'static>(&mut self, name: &str, logger: Logger<T, E>) -> Option<Box<dyn Any>> {
        self.map
            .insert(name.to_owned(), (Box::new(logger.clone()), Box::new(logger)))
            .map(|(any, _)| any)
    }

    /// Removes a bound logger, flushing it once the last handle is dropped.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Any>> {
        self.map.remove(name).map(|(any, _)| any)
    }

    /// Retrieves a shared logger, if one has been inserted under `name` with event type `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<Logger<T, E>> {
        self.map
            .get(name)
            .and_then(|(any, _)| any.downcast_ref::<Logger<T, E>>())
            .cloned()
    }

    /// Flushes all registered loggers.
    pub fn flush(&mut self) {
        for (_, flush) in self.map.values() {
            flush.flush();
        }
    }
}

impl<E> Debug for Registry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("streams", &self.map.keys().collect::<Vec<_>>())
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

/// A buffering logger of `T` events, stamped with identity `E`.
pub struct Logger<T, E> {
    id: E,
    inner: Rc<RefCell<LoggerInner<T, E, dyn FnMut(&Duration, &mut Vec<(Duration, E, T)>)>>>,
}

impl<T, E: Clone> Clone for Logger<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, E: Debug> Debug for Logger<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Logger");
        debug.field("id", &self.id);
        if let Ok(inner) = self.inner.try_borrow() {
            debug.field("buffered", &inner.buffer.len());
        }
        debug.finish_non_exhaustive()
    }
}

struct LoggerInner<T, E, A: ?Sized + FnMut(&Duration, &mut Vec<(Duration, E, T)>)> {
    /// common instant used for all loggers.
    time: Instant,
    /// offset to allow re-calibration.
    offset: Duration,
    /// records not yet handed to the action.
    buffer: Vec<(Duration, E, T)>,
    action: A,
}

impl<T, E: Clone + 'static> Logger<T, E> {
    /// Allocates a new shareable logger bound to a write destination.
    pub fn new<F>(time: Instant, offset: Duration, id: E, action: F) -> Self
    where
        F: FnMut(&Duration, &mut Vec<(Duration, E, T)>) + 'static,
    {
        let inner = LoggerInner {
            time,
            offset,
            action,
            buffer: Vec::with_capacity(buffer_capacity::<(Duration, E, T)>()),
        };
        let inner = Rc::new(RefCell::new(inner));
        Logger { id, inner }
    }

    /// Logs an event.
    ///
    /// The event is stamped with the elapsed time and the logger's identity. Records are
    /// buffered, and only reach the action once the buffer fills or the logger is flushed.
    pub fn log<S: Into<T>>(&self, event: S) {
        self.log_many(Some(event));
    }

    /// Logs several events under one borrow of the buffer.
    pub fn log_many<I>(&self, events: I)
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        self.inner.borrow_mut().log_many(&self.id, events)
    }

    /// Hands any buffered records to the action.
    pub fn flush(&self) {
        <Self as Flush>::flush(self);
    }
}

impl<T, E: Clone, A: ?Sized + FnMut(&Duration, &mut Vec<(Duration, E, T)>)> LoggerInner<T, E, A> {
    fn log_many<I>(&mut self, id: &E, events: I)
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let elapsed = self.time.elapsed() + self.offset;
        for event in events {
            self.buffer.push((elapsed, id.clone(), event.into()));
            if self.buffer.len() == self.buffer.capacity() {
                (self.action)(&elapsed, &mut self.buffer);
                // The action may have swapped in a buffer of another size.
                self.buffer.clear();
                let capacity = buffer_capacity::<(Duration, E, T)>();
                if self.buffer.capacity() < capacity {
                    self.buffer.reserve(capacity - self.buffer.len());
                }
            }
        }
    }

    fn flush(&mut self) {
        let elapsed = self.time.elapsed() + self.offset;
        if !self.buffer.is_empty() {
            (self.action)(&elapsed, &mut self.buffer);
            self.buffer.clear();
        }
    }
}

impl<T, E, A: ?Sized + FnMut(&Duration, &mut Vec<(Duration, E, T)>)> Drop for LoggerInner<T, E, A> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            let elapsed = self.time.elapsed() + self.offset;
            (self.action)(&elapsed, &mut self.buffer);
            self.buffer.clear();
        }
    }
}

/// Types that can be flushed.
pub trait Flush {
    /// Flushes buffered data.
    fn flush(&self);
}

impl<T, E: Clone> Flush for Logger<T, E> {
    fn flush(&self) {
        self.inner.borrow_mut().flush()
    }
}

#[cfg(test)]
mod test {

    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use super::{buffer_capacity, Logger, Registry};

    #[test]
    fn flushes_when_buffer_fills() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let logger = Logger::<u64, usize>::new(Instant::now(), Duration::default(), 3, move |_time, data| {
            sink.borrow_mut().extend(data.drain(..).map(|(_, id, event)| (id, event)));
        });

        let capacity = buffer_capacity::<(Duration, usize, u64)>() as u64;
        logger.log_many(0..capacity - 1);
        assert!(seen.borrow().is_empty());

        logger.log(capacity - 1);
        assert_eq!(seen.borrow().len() as u64, capacity);
        assert!(seen.borrow().iter().all(|(id, _)| *id == 3));
    }

    #[test]
    fn flushes_on_drop_of_last_handle() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let logger = Logger::<&'static str, usize>::new(Instant::now(), Duration::default(), 0, move |_time, data| {
            sink.borrow_mut().extend(data.drain(..).map(|(_, _, event)| event));
        });
        let other = logger.clone();
        logger.log("first");
        other.log("second");
        drop(logger);
        assert!(seen.borrow().is_empty());
        drop(other);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn registry_binds_typed_streams() {
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let mut registry = Registry::new(Instant::now(), 7usize);
        assert!(registry.insert::<String, _>("words", move |_time, data| {
            *sink.borrow_mut() += data.len();
        }).is_none());

        assert!(registry.get::<u64>("words").is_none());
        assert!(registry.get::<String>("missing").is_none());

        let logger = registry.get::<String>("words").expect("logger registered");
        logger.log("display".to_owned());
        logger.log("battery".to_owned());
        registry.flush();
        assert_eq!(*seen.borrow(), 2);

        assert!(registry.remove("words").is_some());
        assert!(registry.get::<String>("words").is_none());
    }
}
