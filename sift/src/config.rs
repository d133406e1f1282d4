//! Configuration of sift executions.

use serde::{Deserialize, Serialize};

use crate::cloud::DEFAULT_MAX_TAGS;
use crate::error::{Result, SiftError};
use crate::processor::line_splitter::DEFAULT_MIN_LINE_LENGTH;
use crate::processor::sentiment::DEFAULT_CONFIDENCE;
use crate::processor::word_splitter::DEFAULT_N_GRAM;

/// The default number of tuples a worker accumulates before flushing.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Configures the workers of an execution and the stages they run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of worker threads.
    pub workers: usize,
    /// Tuples a worker accumulates before flushing them into the shared aggregator.
    pub batch_size: usize,
    /// Longest phrase, in words, extracted from a line.
    pub n_gram: usize,
    /// Lines of at most this many characters are dropped.
    pub min_line_length: usize,
    /// Tags kept per cloud.
    pub max_tags: usize,
    /// Probability a sentiment must exceed to be assigned.
    pub confidence: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            n_gram: DEFAULT_N_GRAM,
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
            max_tags: DEFAULT_MAX_TAGS,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl Config {
    /// Constructs a `Config` that uses one worker thread and the defaults for all other
    /// parameters.
    pub fn thread() -> Config { Config::default() }

    /// Constructs a `Config` that uses `n` worker threads and the defaults for all other
    /// parameters.
    pub fn process(n: usize) -> Config {
        Config { workers: n, ..Config::default() }
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the number of tags kept per cloud.
    pub fn max_tags(mut self, max_tags: usize) -> Self {
        self.max_tags = max_tags;
        self
    }

    /// Checks that the configuration can drive an execution.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SiftError::Config("at least one worker is required".to_owned()));
        }
        if self.batch_size == 0 {
            return Err(SiftError::Config("batch size must be positive".to_owned()));
        }
        if self.n_gram == 0 {
            return Err(SiftError::Config("n-gram length must be positive".to_owned()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(SiftError::Config(format!("confidence {} is not a probability", self.confidence)));
        }
        Ok(())
    }

    /// Installs options into a [`getopts::Options`] struct that correspond to the parameters
    /// in the configuration.
    #[cfg(feature = "getopts")]
    pub fn install_options(opts: &mut getopts::Options) {
        opts.optopt("w", "workers", "number of worker threads", "NUM");
        opts.optopt("b", "batch-size", "tuples accumulated before each flush", "NUM");
        opts.optopt("g", "n-gram", "longest phrase extracted, in words", "NUM");
        opts.optopt("l", "min-line-length", "lines of at most this length are dropped", "NUM");
        opts.optopt("t", "max-tags", "tags kept per cloud", "NUM");
        opts.optopt("c", "confidence", "probability a sentiment must exceed", "PROB");
    }

    /// Instantiates a configuration based upon the parsed options in `matches`.
    #[cfg(feature = "getopts")]
    pub fn from_matches(matches: &getopts::Matches) -> Result<Config> {
        let defaults = Config::default();
        let config = Config {
            workers: matches.opt_get_default("w", defaults.workers).map_err(|e| SiftError::Config(e.to_string()))?,
            batch_size: matches.opt_get_default("b", defaults.batch_size).map_err(|e| SiftError::Config(e.to_string()))?,
            n_gram: matches.opt_get_default("g", defaults.n_gram).map_err(|e| SiftError::Config(e.to_string()))?,
            min_line_length: matches
                .opt_get_default("l", defaults.min_line_length)
                .map_err(|e| SiftError::Config(e.to_string()))?,
            max_tags: matches.opt_get_default("t", defaults.max_tags).map_err(|e| SiftError::Config(e.to_string()))?,
            confidence: matches.opt_get_default("c", defaults.confidence).map_err(|e| SiftError::Config(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Constructs a new configuration by parsing the supplied text arguments.
    ///
    /// Most commonly, callers supply `std::env::args()` as the iterator.
    #[cfg(feature = "getopts")]
    pub fn from_args<I: Iterator<Item = String>>(args: I) -> Result<Config> {
        let mut opts = getopts::Options::new();
        Config::install_options(&mut opts);
        let matches = opts.parse(args).map_err(|e| SiftError::Config(e.to_string()))?;
        Config::from_matches(&matches)
    }
}

#[cfg(test)]
mod test {

    use super::Config;
    use crate::error::SiftError;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
        assert_eq!(Config::process(4).workers, 4);
        assert!(matches!(Config::process(0).validate(), Err(SiftError::Config(_))));
        assert!(matches!(Config::thread().batch_size(0).validate(), Err(SiftError::Config(_))));
    }

    #[cfg(feature = "getopts")]
    #[test]
    fn parses_arguments() {
        let args = ["sift", "-w", "3", "--batch-size", "10", "-g", "2", "-c", "0.7"];
        let config = Config::from_args(args.iter().map(|arg| arg.to_string())).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.n_gram, 2);
        assert_eq!(config.confidence, 0.7);
        assert_eq!(config.max_tags, Config::default().max_tags);

        let bad = Config::from_args(["sift", "-w", "many"].iter().map(|arg| arg.to_string()));
        assert!(matches!(bad, Err(SiftError::Config(_))));
        let zero = Config::from_args(["sift", "-b", "0"].iter().map(|arg| arg.to_string()));
        assert!(matches!(zero, Err(SiftError::Config(_))));
        let unknown = Config::from_args(["sift", "--frobnicate"].iter().map(|arg| arg.to_string()));
        assert!(matches!(unknown, Err(SiftError::Config(_))));
    }
}
