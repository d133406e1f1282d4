//! Single-tuple transforms and the stages built from them.
//!
//! A [`Processor`] reads one tuple and emits any number of tuples into a collector. The
//! processors here are the stages of a review pipeline: lines are split into sentences,
//! sentences into words, words are tagged with a sentiment, filtered down to known aspects,
//! and finally turned into weighted tags.

pub mod aspect;
pub mod chain;
pub mod line_splitter;
pub mod sentiment;
pub mod stop_words;
pub mod tag_identifier;
pub mod word_splitter;

pub use aspect::AspectFilter;
pub use chain::ProcessorChain;
pub use line_splitter::LineSplitter;
pub use sentiment::{Classification, Classifier, SentimentTagger};
pub use stop_words::StopWords;
pub use tag_identifier::TagIdentifier;
pub use word_splitter::WordSplitter;

use crate::collector::OutputCollector;
use crate::error::Result;
use crate::tuple::Tuple;

/// Transforms one tuple into zero or more tuples.
///
/// Processors are shared by every worker of a pipeline, and must not keep per-tuple state.
/// Closures taking a tuple and a collector are processors.
pub trait Processor: Send + Sync {
    /// Reads `tuple` and emits its transforms into `output`.
    fn process(&self, tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()>;
    /// A name identifying the processor in logs.
    fn name(&self) -> &str { std::any::type_name::<Self>() }
}

impl<F> Processor for F
where
    F: Fn(&Tuple, &mut dyn OutputCollector) -> Result<()> + Send + Sync,
{
    fn process(&self, tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()> {
        (self)(tuple, output)
    }
    fn name(&self) -> &str { "closure" }
}
