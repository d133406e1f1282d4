//! Sentiment-partitioned aggregation.
//!
//! The [`AggregatingCollector`] condenses batches of weighted tuples into one tuple per key
//! and sentiment, holding a running total across batches in its delegate collector.

use serde::{Deserialize, Serialize};

use crate::collector::OutputCollector;
use crate::error::{Result, SiftError};
use crate::sentiment::Sentiment;
use crate::shuffle::Shuffler;
use crate::tuple::{Datum, Field, Tuple};

/// Counts describing one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlushSummary {
    /// Tuples handed to the flush.
    pub received: usize,
    /// Tuples aggregated, including those already held by the delegate.
    pub accumulated: usize,
    /// Accumulated tuples per partition, in [`Sentiment::ALL`] order.
    ///
    /// All zero when the flush ran unpartitioned.
    pub partitions: [usize; 3],
    /// Aggregated tuples installed in the delegate.
    pub produced: usize,
}

/// A collector that shuffles and sums what it is given, per sentiment.
///
/// Each flush appends the new tuples to those the delegate already holds, partitions them
/// by sentiment (positive, negative, then neutral), shuffles each partition on its own,
/// and replaces every merged tuple's values with their integer sum. The result replaces the
/// delegate's contents only once every step has succeeded.
///
/// When no accumulated tuple declares a sentiment, the whole set is shuffled as one
/// partition and results carry no sentiment.
///
/// Individual tuples cannot be emitted into an aggregating collector; use
/// [`AggregatingCollector::flush`] or [`OutputCollector::set_tuples`].
#[derive(Debug)]
pub struct AggregatingCollector<D, S> {
    delegate: D,
    shuffler: S,
}

impl<D: OutputCollector, S: Shuffler> AggregatingCollector<D, S> {
    /// Aggregates into `delegate`, grouping with `shuffler`.
    pub fn new(delegate: D, shuffler: S) -> Self {
        AggregatingCollector { delegate, shuffler }
    }

    /// The collector aggregated results are installed in.
    pub fn delegate(&self) -> &D { &self.delegate }

    /// Mutable access to the delegate.
    pub fn delegate_mut(&mut self) -> &mut D { &mut self.delegate }

    /// Consumes the aggregator, returning its delegate.
    pub fn into_delegate(self) -> D { self.delegate }

    /// Aggregates `tuples` together with the delegate's current contents.
    pub fn flush(&mut self, tuples: Vec<Tuple>) -> Result<FlushSummary> {
        let mut summary = FlushSummary {
            received: tuples.len(),
            ..FlushSummary::default()
        };

        let mut accumulated = self.delegate.emitted_tuples().clone();
        accumulated.extend(tuples);
        summary.accumulated = accumulated.len();

        let aggregated = if accumulated.iter().any(|tuple| tuple.contains(Field::Sentiment)) {
            let mut partitions: [Vec<Tuple>; 3] = Default::default();
            for tuple in accumulated {
                let sentiment = Sentiment::of(&tuple)?;
                partitions[sentiment.index()].push(tuple);
            }
            let mut aggregated = Vec::new();
            for (sentiment, partition) in Sentiment::ALL.into_iter().zip(partitions) {
                summary.partitions[sentiment.index()] = partition.len();
                for merged in self.shuffler.shuffle(partition)? {
                    aggregated.push(condense(&merged, Some(sentiment))?);
                }
            }
            aggregated
        } else {
            self.shuffler
                .shuffle(accumulated)?
                .iter()
                .map(|merged| condense(merged, None))
                .collect::<Result<Vec<_>>>()?
        };

        summary.produced = aggregated.len();
        self.delegate.set_tuples(aggregated)?;
        Ok(summary)
    }
}

impl<D: OutputCollector, S: Shuffler> OutputCollector for AggregatingCollector<D, S> {
    fn emit(&mut self, _tuple: Tuple) -> Result<()> {
        Err(SiftError::Unsupported("emit on an aggregating collector"))
    }
    fn emitted_tuples(&mut self) -> &mut Vec<Tuple> { self.delegate.emitted_tuples() }
    fn set_tuples(&mut self, tuples: Vec<Tuple>) -> Result<()> {
        self.flush(tuples).map(|_| ())
    }
}

/// Builds the aggregated form of a merged tuple.
fn condense(merged: &Tuple, sentiment: Option<Sentiment>) -> Result<Tuple> {
    let total = sum(merged)?;
    let mut condensed = Tuple::new(&[Field::Key, Field::Sources, Field::Values])
        .with(Field::Key, merged.get_str(Field::Key)?)
        .with(Field::Sources, merged.list(Field::Sources)?.to_vec())
        .with(Field::Values, vec![Datum::Int(total)]);
    if let Some(sentiment) = sentiment {
        condensed = condensed.with(Field::Sentiment, sentiment);
    }
    Ok(condensed)
}

/// Sums the values of `tuple`, reading integers or text holding an integer.
pub fn sum(tuple: &Tuple) -> Result<i64> {
    tuple.list(Field::Values)?.iter().try_fold(0i64, |total, value| {
        let weight = match value {
            Datum::Int(int) => *int,
            Datum::Text(text) => text.trim().parse::<i64>().map_err(|_| SiftError::TypeMismatch {
                field: Field::Values,
                expected: "integer",
                found: "text",
            })?,
        };
        total.checked_add(weight).ok_or_else(|| SiftError::Overflow {
            key: tuple.get_str(Field::Key).unwrap_or_default().to_owned(),
        })
    })
}
