//! The closed vocabulary of sentiment labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};
use crate::tuple::{Datum, Field, Tuple, Value};

/// A sentiment partition.
///
/// The vocabulary is closed: every label a tuple carries must parse into one of these, and
/// anything else is a [`SiftError::UnknownSentiment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    /// Favourable mentions.
    Positive,
    /// Unfavourable mentions.
    Negative,
    /// Everything the classifier was not confident about.
    Neutral,
}

impl Sentiment {
    /// All labels, in partition order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// The label as it appears in tuples.
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Position of the partition in [`Sentiment::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Sentiment::Positive => 0,
            Sentiment::Negative => 1,
            Sentiment::Neutral => 2,
        }
    }

    /// Reads the sentiment of `tuple`.
    ///
    /// The label may be bound as text, or as a list whose first element is the label.
    pub fn of(tuple: &Tuple) -> Result<Sentiment> {
        match tuple.get(Field::Sentiment)? {
            Some(Value::Datum(Datum::Text(label))) => label.parse(),
            Some(Value::List(labels)) => match labels.first() {
                Some(Datum::Text(label)) => label.parse(),
                Some(other) => Err(SiftError::UnknownSentiment(other.to_string())),
                None => Err(SiftError::UnknownSentiment(String::new())),
            },
            Some(Value::Datum(other)) => Err(SiftError::UnknownSentiment(other.to_string())),
            None => Err(SiftError::UnknownSentiment("null".to_owned())),
        }
    }
}

impl FromStr for Sentiment {
    type Err = SiftError;

    fn from_str(label: &str) -> Result<Self> {
        Sentiment::ALL
            .into_iter()
            .find(|sentiment| sentiment.label() == label)
            .ok_or_else(|| SiftError::UnknownSentiment(label.to_owned()))
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Sentiment> for Value {
    fn from(sentiment: Sentiment) -> Self {
        Value::from(sentiment.label())
    }
}
