//! Multi-worker processing of review text into aggregated tags.
//!
//! A [`Pipeline`] runs a processor chain over each input on one of several workers. Workers
//! accumulate what the chain emits in a local batch, and flush full batches into one shared
//! aggregating collector.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregatingCollector, FlushSummary};
use crate::cloud::TagCloud;
use crate::collector::{MemOutputCollector, OutputCollector, SharedCollector};
use crate::config::Config;
use crate::error::{Result, SiftError};
use crate::execute::execute;
use crate::logging::{ChainEvent, FlushEvent, StageEvent, StartStop, WorkerEvent};
use crate::processor::{
    AspectFilter, Classifier, LineSplitter, ProcessorChain, SentimentTagger, StopWords, TagIdentifier, WordSplitter,
};
use crate::shuffle::Shuffler;
use crate::tuple::{compose_key, Datum, Field, Tuple, UNDEFINED_KEY};
use crate::worker::Worker;

/// A review of `subject` found at `source`, ready to enter a pipeline.
pub fn review(subject: &str, source: &str, text: &str) -> Tuple {
    Tuple::new(&[Field::Key, Field::Sources, Field::Values])
        .with(Field::Key, compose_key(subject, UNDEFINED_KEY))
        .with(Field::Sources, vec![Datum::from(source)])
        .with(Field::Values, vec![Datum::from(text)])
}

/// The chain turning reviews into weighted, sentiment-tagged tags.
///
/// Reviews are split into lines and phrases, tagged with the sentiment of their line, and
/// weighted. With `aspects`, only tags naming a known aspect are kept.
pub fn review_chain<C: Classifier + 'static>(
    config: &Config,
    stop_words: StopWords,
    classifier: C,
    aspects: Option<AspectFilter>,
) -> ProcessorChain {
    let mut chain = ProcessorChain::new()
        .then(LineSplitter::new(config.min_line_length))
        .then(WordSplitter::new(config.n_gram, stop_words))
        .then(SentimentTagger::new(classifier).confidence(config.confidence))
        .then(TagIdentifier::new());
    if let Some(aspects) = aspects {
        chain.push(aspects);
    }
    chain
}

/// What one or more workers did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Inputs run through the chain.
    pub inputs: usize,
    /// Tuples the chain emitted.
    pub emitted: usize,
    /// Batches flushed into the aggregator.
    pub flushes: usize,
}

impl std::ops::AddAssign for WorkerSummary {
    fn add_assign(&mut self, other: Self) {
        self.inputs += other.inputs;
        self.emitted += other.emitted;
        self.flushes += other.flushes;
    }
}

/// A processor chain feeding a shared aggregator.
pub struct Pipeline<D, S> {
    chain: Arc<ProcessorChain>,
    aggregator: SharedCollector<AggregatingCollector<D, S>>,
    batch_size: usize,
    max_tags: usize,
}

impl<D, S> Clone for Pipeline<D, S> {
    fn clone(&self) -> Self {
        Pipeline {
            chain: Arc::clone(&self.chain),
            aggregator: self.aggregator.clone(),
            batch_size: self.batch_size,
            max_tags: self.max_tags,
        }
    }
}

impl<D, S> std::fmt::Debug for Pipeline<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("chain", &self.chain)
            .field("batch_size", &self.batch_size)
            .field("max_tags", &self.max_tags)
            .finish_non_exhaustive()
    }
}

impl<D, S> Pipeline<D, S>
where
    D: OutputCollector + Send + 'static,
    S: Shuffler + 'static,
{
    /// Runs `chain`, flushing batches of `config.batch_size` tuples into `aggregator`.
    ///
    /// Tag clouds keep `config.max_tags` tags.
    pub fn new(chain: ProcessorChain, aggregator: AggregatingCollector<D, S>, config: &Config) -> Self {
        Pipeline {
            chain: Arc::new(chain),
            aggregator: SharedCollector::new(aggregator),
            batch_size: config.batch_size.max(1),
            max_tags: config.max_tags,
        }
    }

    /// The chain run over each input.
    pub fn chain(&self) -> &ProcessorChain { &self.chain }

    /// The aggregator shared by all workers.
    pub fn aggregator(&self) -> &SharedCollector<AggregatingCollector<D, S>> { &self.aggregator }

    /// The number of tuples a worker accumulates before flushing.
    pub fn batch_size(&self) -> usize { self.batch_size }

    /// The number of tags kept per cloud.
    pub fn max_tags(&self) -> usize { self.max_tags }

    /// Flushes `batch` into the aggregator, holding its lock throughout.
    pub fn flush(&self, batch: Vec<Tuple>) -> Result<FlushSummary> {
        self.aggregator.with(|aggregator| aggregator.flush(batch))?
    }

    /// A copy of the aggregated tuples.
    pub fn results(&self) -> Result<Vec<Tuple>> { self.aggregator.snapshot() }

    /// The tag clouds of the aggregated tuples, each truncated to the configured number of
    /// tags.
    pub fn tag_clouds(&self) -> Result<Vec<TagCloud>> {
        let mut clouds = TagCloud::from_tuples(&self.results()?)?;
        for cloud in clouds.iter_mut() {
            cloud.truncate(self.max_tags);
        }
        Ok(clouds)
    }

    /// Runs the chain over every input received from `inputs`, until the channel closes.
    ///
    /// Emitted tuples are flushed once `batch_size` of them accumulated, and once more
    /// when the inputs are exhausted. The first error aborts the worker; batches flushed
    /// before it stay in the aggregator.
    pub fn process_worker(&self, worker: &mut Worker, inputs: &Receiver<Tuple>) -> Result<WorkerSummary> {
        let logger = worker.logging();
        let mut summary = WorkerSummary::default();
        let mut batch = MemOutputCollector::new();

        if let Some(logger) = &logger {
            logger.log(WorkerEvent { start_stop: StartStop::Start, inputs: 0 });
        }

        for input in inputs.iter() {
            let emitted = self.chain.run_with(&input, |name, emitted| {
                if let Some(logger) = &logger {
                    logger.log(StageEvent { name: name.to_owned(), emitted });
                }
            })?;
            if let Some(logger) = &logger {
                logger.log(ChainEvent { input: summary.inputs, emitted: emitted.len() });
            }
            summary.inputs += 1;
            summary.emitted += emitted.len();
            batch.emitted_tuples().extend(emitted);

            if batch.len() >= self.batch_size {
                self.flush_logged(batch.take(), logger.as_ref())?;
                summary.flushes += 1;
            }
        }

        if !batch.is_empty() {
            self.flush_logged(batch.take(), logger.as_ref())?;
            summary.flushes += 1;
        }

        if let Some(logger) = &logger {
            logger.log(WorkerEvent { start_stop: StartStop::Stop, inputs: summary.inputs });
            logger.flush();
        }
        Ok(summary)
    }

    fn flush_logged(&self, batch: Vec<Tuple>, logger: Option<&crate::logging::SiftLogger>) -> Result<FlushSummary> {
        if let Some(logger) = logger {
            logger.log(FlushEvent::start());
        }
        let result = self.flush(batch);
        if let Some(logger) = logger {
            logger.log(FlushEvent::stop(result.as_ref().ok().copied()));
        }
        result
    }

    /// Runs the pipeline over `inputs` on `config.workers` worker threads.
    ///
    /// Returns the totals of all workers, or the first error any worker met.
    pub fn run<I: IntoIterator<Item = Tuple>>(&self, config: &Config, inputs: I) -> Result<WorkerSummary> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        for input in inputs {
            sender.send(input).map_err(|e| SiftError::Worker(e.to_string()))?;
        }
        drop(sender);

        let pipeline = self.clone();
        let guards = execute(config.clone(), move |worker| pipeline.process_worker(worker, &receiver))?;

        let mut total = WorkerSummary::default();
        let mut first_error = None;
        for result in guards.join() {
            match result.map_err(SiftError::Worker).and_then(|result| result) {
                Ok(summary) => total += summary,
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(total),
        }
    }
}

#[cfg(test)]
mod test {

    use super::{review, review_chain, Pipeline};
    use crate::aggregate::{sum, AggregatingCollector};
    use crate::collector::{MemOutputCollector, OutputCollector};
    use crate::config::Config;
    use crate::error::{Result, SiftError};
    use crate::execute::execute_directly;
    use crate::processor::{Classification, ProcessorChain, StopWords};
    use crate::shuffle::MemSortMergeShuffler;
    use crate::tuple::{Datum, Field, Tuple};

    fn weigh(tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()> {
        let mut weighted = tuple.clone();
        weighted.set(Field::Values, vec![Datum::Int(1)])?;
        output.emit(weighted)
    }

    fn pipeline(chain: ProcessorChain, config: &Config) -> Pipeline<MemOutputCollector, MemSortMergeShuffler> {
        Pipeline::new(chain, AggregatingCollector::new(MemOutputCollector::new(), MemSortMergeShuffler), config)
    }

    fn neutral(_text: &str) -> Result<Vec<Classification>> { Ok(Vec::new()) }

    #[test]
    fn batches_flush_at_capacity_and_at_end() {
        let pipeline = pipeline(ProcessorChain::new().then(weigh), &Config::thread().batch_size(2));
        let (sender, receiver) = crossbeam_channel::unbounded();
        for source in ["r1", "r2", "r3"] {
            sender.send(review("phone", source, "text")).unwrap();
        }
        drop(sender);

        let summary = execute_directly(|worker| pipeline.process_worker(worker, &receiver)).unwrap();
        assert_eq!(summary.inputs, 3);
        assert_eq!(summary.flushes, 2);

        let results = pipeline.results().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(sum(&results[0]).unwrap(), 3);
        assert_eq!(results[0].list(Field::Sources).unwrap().len(), 3);
    }

    #[test]
    fn reviews_become_tag_clouds() {
        let config = Config::process(2).batch_size(4).max_tags(2);
        let chain = review_chain(&config, StopWords::new(), neutral, None);
        let pipeline = pipeline(chain, &config);
        pipeline
            .run(&config, vec![
                review("phone", "r1", "The battery is weak. The screen is bright"),
                review("phone", "r2", "Battery lasts"),
            ])
            .unwrap();

        let clouds = pipeline.tag_clouds().unwrap();
        assert_eq!(clouds.len(), 1);
        assert_eq!(clouds[0].subject, "phone");
        assert_eq!(clouds[0].tags.len(), 2);
        assert_eq!(clouds[0].tags[0].text, "battery");
        assert_eq!(clouds[0].tags[0].weight, 2);
    }

    #[test]
    fn processor_errors_abort_the_run() {
        let fail = |_: &Tuple, _: &mut dyn OutputCollector| -> Result<()> { Err(SiftError::MalformedKey("x".to_owned())) };
        let pipeline = pipeline(ProcessorChain::new().then(fail), &Config::thread().batch_size(1));
        let result = pipeline.run(&Config::process(2), vec![review("phone", "r1", "text")]);
        assert!(matches!(result, Err(SiftError::MalformedKey(_))));
        assert!(pipeline.results().unwrap().is_empty());
    }
}
