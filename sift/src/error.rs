//! The error type shared by every stage of a sift pipeline.

use crate::tuple::Field;

/// Errors raised while building, transforming, shuffling or aggregating tuples.
///
/// None of these are retried by sift itself. They abort the tuple, chain invocation, or
/// flush in which they occur and propagate to whoever drives the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SiftError {
    /// A field was read that the tuple's schema does not declare.
    #[error("field not found: {0}")]
    FieldNotFound(Field),
    /// A slot holds a value of another kind than the one requested.
    #[error("field {field} holds {found}, expected {expected}")]
    TypeMismatch {
        /// The field that was read.
        field: Field,
        /// The kind of value the caller asked for.
        expected: &'static str,
        /// The kind of value found in the slot.
        found: &'static str,
    },
    /// A sentiment label outside the closed vocabulary.
    #[error("Tuple with wrong sentiment: {0:?}")]
    UnknownSentiment(String),
    /// Summing the values of a key exceeded the range of `i64`.
    #[error("sum of values for key {key:?} overflows")]
    Overflow {
        /// The key whose values were summed.
        key: String,
    },
    /// An operation the receiving type refuses to perform.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// A key without the subject/discriminator separator.
    #[error("malformed key {0:?}: missing separator")]
    MalformedKey(String),
    /// A processor or one of its services failed.
    #[error("processor {name} failed: {reason}")]
    Processor {
        /// Name of the failing processor.
        name: String,
        /// Description of the failure.
        reason: String,
    },
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
    /// Reading supporting files (stop words) failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A thread panicked while holding a collector lock.
    #[error("collector lock poisoned")]
    Poisoned,
    /// A worker thread failed outside of sift's own error handling.
    #[error("worker failed: {0}")]
    Worker(String),
}

/// Result alias used throughout sift.
pub type Result<T> = std::result::Result<T, SiftError>;
