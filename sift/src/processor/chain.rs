//! Sequential composition of processors.

use std::fmt;

use crate::collector::{MemOutputCollector, OutputCollector};
use crate::error::Result;
use crate::processor::Processor;
use crate::tuple::Tuple;

/// An ordered list of processors applied one after the other.
///
/// Every tuple a stage emits is fed to the next stage, so a stage may fan a tuple out into
/// many or drop it altogether. The working set of an invocation lives on the caller's
/// stack, and one chain can serve any number of threads at once.
#[derive(Default)]
pub struct ProcessorChain {
    processors: Vec<Box<dyn Processor>>,
}

impl ProcessorChain {
    /// Allocates an empty chain, which returns its input unchanged.
    pub fn new() -> Self { Self::default() }

    /// Appends `processor` as the last stage.
    pub fn push<P: Processor + 'static>(&mut self, processor: P) {
        self.processors.push(Box::new(processor));
    }

    /// Appends `processor` as the last stage, returning the chain.
    pub fn then<P: Processor + 'static>(mut self, processor: P) -> Self {
        self.push(processor);
        self
    }

    /// The number of stages.
    pub fn len(&self) -> usize { self.processors.len() }

    /// True if the chain has no stages.
    pub fn is_empty(&self) -> bool { self.processors.is_empty() }

    /// The names of the stages, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.processors.iter().map(|processor| processor.name())
    }

    /// Runs every stage over `tuple`, returning what the last stage emitted.
    ///
    /// The first stage to fail aborts the invocation.
    pub fn run(&self, tuple: &Tuple) -> Result<Vec<Tuple>> {
        self.run_with(tuple, |_, _| ())
    }

    /// Like [`ProcessorChain::run`], reporting the name of each stage and the size of its
    /// output to `observe`.
    pub fn run_with<F: FnMut(&str, usize)>(&self, tuple: &Tuple, mut observe: F) -> Result<Vec<Tuple>> {
        let mut working = vec![tuple.clone()];
        for processor in self.processors.iter() {
            let mut output = MemOutputCollector::new();
            for tuple in working.iter() {
                processor.process(tuple, &mut output)?;
            }
            observe(processor.name(), output.len());
            working = output.into_tuples();
        }
        Ok(working)
    }
}

impl Processor for ProcessorChain {
    fn process(&self, tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()> {
        for tuple in self.run(tuple)? {
            output.emit(tuple)?;
        }
        Ok(())
    }
    fn name(&self) -> &str { "chain" }
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
