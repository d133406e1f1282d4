//! Sentiment tagging through an external classifier.

use serde::{Deserialize, Serialize};

use crate::collector::OutputCollector;
use crate::error::Result;
use crate::processor::Processor;
use crate::sentiment::Sentiment;
use crate::tuple::{Datum, Field, Tuple};

/// Probabilities below or at this value do not decide a sentiment.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// One classifier's opinion about a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The label the classifier chose.
    pub label: String,
    /// Probability of the text being positive.
    pub positive: f64,
    /// Probability of the text being negative.
    pub negative: f64,
}

impl Classification {
    /// A classification with `label` and the given probabilities.
    pub fn new(label: &str, positive: f64, negative: f64) -> Self {
        Classification { label: label.to_owned(), positive, negative }
    }
}

/// A sentiment classification service.
pub trait Classifier: Send + Sync {
    /// Classifies `text`, returning one classification per underlying classifier.
    fn classify(&self, text: &str) -> Result<Vec<Classification>>;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Result<Vec<Classification>> + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<Vec<Classification>> { (self)(text) }
}

/// Binds a sentiment to each value of a tuple.
///
/// The values of the tuple are classified together, as one sentence. The sentence is
/// positive or negative if a classification with that label is more probable than the
/// confidence threshold; otherwise it is neutral. One tuple is emitted per non-empty value,
/// holding that value and the sentence's sentiment.
#[derive(Debug, Clone)]
pub struct SentimentTagger<C> {
    classifier: C,
    confidence: f64,
}

impl<C: Classifier> SentimentTagger<C> {
    /// A tagger asking `classifier`, with the default confidence threshold.
    pub fn new(classifier: C) -> Self {
        SentimentTagger { classifier, confidence: DEFAULT_CONFIDENCE }
    }

    /// Sets the confidence threshold.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// The sentiment of `sentence`.
    pub fn sentiment(&self, sentence: &str) -> Result<Sentiment> {
        for classification in self.classifier.classify(sentence)? {
            match classification.label.parse::<Sentiment>() {
                Ok(Sentiment::Positive) if classification.positive > self.confidence => {
                    return Ok(Sentiment::Positive)
                }
                Ok(Sentiment::Negative) if classification.negative > self.confidence => {
                    return Ok(Sentiment::Negative)
                }
                _ => {}
            }
        }
        Ok(Sentiment::Neutral)
    }
}

impl<C: Classifier> Processor for SentimentTagger<C> {
    fn process(&self, tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()> {
        let values = tuple.list(Field::Values)?;
        let texts = values
            .iter()
            .map(|value| value.to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>();
        if texts.is_empty() {
            return Ok(());
        }
        let sentiment = self.sentiment(&texts.join(" "))?;
        for text in texts {
            let tagged = tuple
                .clone()
                .with(Field::Sentiment, sentiment)
                .with(Field::Values, vec![Datum::Text(text)]);
            output.emit(tagged)?;
        }
        Ok(())
    }
    fn name(&self) -> &str { "sentiment-tagger" }
}

#[cfg(test)]
mod test {

    use super::{Classification, SentimentTagger};
    use crate::collector::MemOutputCollector;
    use crate::error::{Result, SiftError};
    use crate::processor::Processor;
    use crate::sentiment::Sentiment;
    use crate::tuple::{Datum, Field, Tuple};

    fn keywords(text: &str) -> Result<Vec<Classification>> {
        if text.contains("great") {
            Ok(vec![Classification::new("positive", 0.9, 0.1)])
        } else if text.contains("awful") {
            Ok(vec![Classification::new("positive", 0.2, 0.8), Classification::new("negative", 0.2, 0.8)])
        } else if text.contains("meh") {
            Ok(vec![Classification::new("positive", 0.55, 0.45)])
        } else {
            Ok(Vec::new())
        }
    }

    #[test]
    fn labels_need_confidence() {
        let tagger = SentimentTagger::new(keywords);
        assert_eq!(tagger.sentiment("great").unwrap(), Sentiment::Positive);
        assert_eq!(tagger.sentiment("awful").unwrap(), Sentiment::Negative);
        assert_eq!(tagger.sentiment("meh").unwrap(), Sentiment::Positive);
        assert_eq!(tagger.sentiment("plain").unwrap(), Sentiment::Neutral);

        let strict = SentimentTagger::new(keywords).confidence(0.6);
        assert_eq!(strict.sentiment("meh").unwrap(), Sentiment::Neutral);
    }

    #[test]
    fn emits_one_tuple_per_value() {
        let words = Tuple::new(&[Field::Key, Field::Sources, Field::Values])
            .with(Field::Key, "phone:review")
            .with(Field::Values, vec![Datum::from("great"), Datum::from(""), Datum::from("camera")]);
        let mut output = MemOutputCollector::new();
        SentimentTagger::new(keywords).process(&words, &mut output).unwrap();
        assert_eq!(output.len(), 2);
        for tuple in output.tuples() {
            assert_eq!(Sentiment::of(tuple).unwrap(), Sentiment::Positive);
            assert_eq!(tuple.list(Field::Values).unwrap().len(), 1);
        }
    }

    #[test]
    fn classifier_failures_propagate() {
        let failing = |_: &str| -> Result<Vec<Classification>> {
            Err(SiftError::Processor { name: "classifier".to_owned(), reason: "offline".to_owned() })
        };
        let words = Tuple::new(&[Field::Values]).with(Field::Values, vec![Datum::from("great")]);
        let mut output = MemOutputCollector::new();
        let result = SentimentTagger::new(failing).process(&words, &mut output);
        assert!(matches!(result, Err(SiftError::Processor { .. })));
        assert!(output.is_empty());
    }
}
