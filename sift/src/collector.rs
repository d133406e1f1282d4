//! Accumulation boundaries between stages.
//!
//! An [`OutputCollector`] receives the tuples a stage emits. Collectors are driven through
//! `&mut self`, so a collector reachable from several threads must sit behind a
//! [`SharedCollector`], whose lock is the single synchronization point of the boundary.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, SiftError};
use crate::tuple::Tuple;

/// Receives tuples emitted by a stage.
pub trait OutputCollector {
    /// Appends `tuple` to the collected output.
    fn emit(&mut self, tuple: Tuple) -> Result<()>;
    /// The live list of collected tuples.
    ///
    /// Mutations through the returned reference are visible to every later reader.
    fn emitted_tuples(&mut self) -> &mut Vec<Tuple>;
    /// Replaces the collected tuples with `tuples`.
    fn set_tuples(&mut self, tuples: Vec<Tuple>) -> Result<()>;
}

impl<C: ?Sized + OutputCollector> OutputCollector for Box<C> {
    #[inline]
    fn emit(&mut self, tuple: Tuple) -> Result<()> { (**self).emit(tuple) }
    #[inline]
    fn emitted_tuples(&mut self) -> &mut Vec<Tuple> { (**self).emitted_tuples() }
    #[inline]
    fn set_tuples(&mut self, tuples: Vec<Tuple>) -> Result<()> { (**self).set_tuples(tuples) }
}

impl<C: ?Sized + OutputCollector> OutputCollector for &mut C {
    #[inline]
    fn emit(&mut self, tuple: Tuple) -> Result<()> { (**self).emit(tuple) }
    #[inline]
    fn emitted_tuples(&mut self) -> &mut Vec<Tuple> { (**self).emitted_tuples() }
    #[inline]
    fn set_tuples(&mut self, tuples: Vec<Tuple>) -> Result<()> { (**self).set_tuples(tuples) }
}

/// An in-memory collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemOutputCollector {
    tuples: Vec<Tuple>,
}

impl MemOutputCollector {
    /// Allocates an empty collector.
    pub fn new() -> Self { Self::default() }

    /// The number of collected tuples.
    pub fn len(&self) -> usize { self.tuples.len() }

    /// True if nothing has been collected.
    pub fn is_empty(&self) -> bool { self.tuples.is_empty() }

    /// Read-only view of the collected tuples.
    pub fn tuples(&self) -> &[Tuple] { &self.tuples }

    /// Takes the collected tuples, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Tuple> { std::mem::take(&mut self.tuples) }

    /// Consumes the collector, returning its tuples.
    pub fn into_tuples(self) -> Vec<Tuple> { self.tuples }
}

impl From<Vec<Tuple>> for MemOutputCollector {
    fn from(tuples: Vec<Tuple>) -> Self { MemOutputCollector { tuples } }
}

impl OutputCollector for MemOutputCollector {
    fn emit(&mut self, tuple: Tuple) -> Result<()> {
        self.tuples.push(tuple);
        Ok(())
    }
    fn emitted_tuples(&mut self) -> &mut Vec<Tuple> { &mut self.tuples }
    fn set_tuples(&mut self, tuples: Vec<Tuple>) -> Result<()> {
        self.tuples = tuples;
        Ok(())
    }
}

/// A collector shared by concurrent producers.
///
/// Cloning the handle shares the collector. Every operation holds the lock for its whole
/// duration, so a read-then-clear or a full aggregating flush is never interleaved with
/// another producer's mutation.
pub struct SharedCollector<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Clone for SharedCollector<C> {
    fn clone(&self) -> Self {
        SharedCollector { inner: Arc::clone(&self.inner) }
    }
}

impl<C> fmt::Debug for SharedCollector<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCollector")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}

impl<C: OutputCollector> SharedCollector<C> {
    /// Wraps `collector` for sharing.
    pub fn new(collector: C) -> Self {
        SharedCollector { inner: Arc::new(Mutex::new(collector)) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, C>> {
        self.inner.lock().map_err(|_| SiftError::Poisoned)
    }

    /// Emits `tuple` under the lock.
    pub fn emit(&self, tuple: Tuple) -> Result<()> {
        self.lock()?.emit(tuple)
    }

    /// Installs `tuples` under the lock.
    pub fn set_tuples(&self, tuples: Vec<Tuple>) -> Result<()> {
        self.lock()?.set_tuples(tuples)
    }

    /// Drains the collected tuples under one acquisition of the lock.
    pub fn take_emitted(&self) -> Result<Vec<Tuple>> {
        Ok(std::mem::take(self.lock()?.emitted_tuples()))
    }

    /// A copy of the collected tuples.
    pub fn snapshot(&self) -> Result<Vec<Tuple>> {
        Ok(self.lock()?.emitted_tuples().clone())
    }

    /// Runs `logic` with exclusive access to the collector.
    pub fn with<R, F: FnOnce(&mut C) -> R>(&self, logic: F) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(logic(&mut guard))
    }

    /// Recovers the collector if this is the last handle, or returns the handle otherwise.
    ///
    /// A poisoned collector is reported as [`SiftError::Poisoned`], as by every other accessor.
    pub fn try_unwrap(self) -> Result<std::result::Result<C, Self>> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().map(Ok).map_err(|_| SiftError::Poisoned),
            Err(inner) => Ok(Err(SharedCollector { inner })),
        }
    }
}

#[cfg(test)]
mod test {

    use std::thread;

    use super::{MemOutputCollector, OutputCollector, SharedCollector};
    use crate::error::SiftError;
    use crate::tuple::{Field, Tuple};

    fn keyed(key: &str) -> Tuple {
        Tuple::new(&[Field::Key]).with(Field::Key, key)
    }

    #[test]
    fn emitted_tuples_is_the_live_list() {
        let mut collector = MemOutputCollector::new();
        collector.emit(keyed("a:1")).unwrap();
        collector.emitted_tuples().push(keyed("a:2"));
        assert_eq!(collector.len(), 2);
        collector.set_tuples(vec![keyed("b:1")]).unwrap();
        assert_eq!(collector.tuples(), &[keyed("b:1")]);
    }

    #[test]
    fn boxed_collectors_forward() {
        let mut boxed: Box<dyn OutputCollector> = Box::new(MemOutputCollector::new());
        boxed.emit(keyed("a:1")).unwrap();
        assert_eq!(boxed.emitted_tuples().len(), 1);
    }

    #[test]
    fn concurrent_emits_are_not_lost() {
        let shared = SharedCollector::new(MemOutputCollector::new());
        let handles = (0..4)
            .map(|thread| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for index in 0..250 {
                        shared.emit(keyed(&format!("t{thread}:{index}"))).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.take_emitted().unwrap().len(), 1000);
        assert!(shared.snapshot().unwrap().is_empty());
        let other = shared.clone();
        let shared = shared.try_unwrap().unwrap().unwrap_err();
        drop(other);
        assert_eq!(shared.try_unwrap().unwrap().unwrap().len(), 0);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let shared = SharedCollector::new(MemOutputCollector::new());
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            poisoner.with(|_| panic!("holder panics")).ok();
        })
        .join();
        assert!(matches!(shared.emit(keyed("a:1")), Err(SiftError::Poisoned)));
        assert!(matches!(shared.try_unwrap(), Err(SiftError::Poisoned)));
    }
}
