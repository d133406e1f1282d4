//! Turning words into weighted tags.

use std::collections::HashMap;

use crate::collector::OutputCollector;
use crate::error::{Result, SiftError};
use crate::processor::stop_words::StopWords;
use crate::processor::Processor;
use crate::tuple::{compose_key, Datum, Field, Tuple, KEY_SEPARATOR};

/// Weight of tags whose word count has no configured weight.
pub const DEFAULT_WEIGHT: i64 = 1;

/// Emits one weighted tag tuple per value.
///
/// Each value becomes the discriminator of a key whose subject is the tuple's `Tag`, or
/// the subject of its key when it has no tag. The tag's weight depends on how many words
/// the value holds. Sources, sentiment and group are carried over.
#[derive(Debug, Clone)]
pub struct TagIdentifier {
    word_weights: HashMap<usize, i64>,
    default_weight: i64,
}

impl Default for TagIdentifier {
    fn default() -> Self {
        TagIdentifier { word_weights: HashMap::new(), default_weight: DEFAULT_WEIGHT }
    }
}

impl TagIdentifier {
    /// A tag identifier weighting every tag with the default weight.
    pub fn new() -> Self { Self::default() }

    /// Weights tags of `words` words with `weight`.
    pub fn weight(mut self, words: usize, weight: i64) -> Self {
        self.word_weights.insert(words, weight);
        self
    }

    /// The weight of the tag `text`.
    pub fn weight_of(&self, text: &str) -> i64 {
        let words = StopWords::word_count(text);
        self.word_weights.get(&words).copied().unwrap_or(self.default_weight)
    }

    fn subject<'a>(&self, tuple: &'a Tuple) -> Result<&'a str> {
        if let Ok(Some(_)) = tuple.get(Field::Tag) {
            return tuple.get_str(Field::Tag);
        }
        let key = tuple.get_str(Field::Key)?;
        Ok(key.split_once(KEY_SEPARATOR).map_or(key, |(subject, _)| subject))
    }
}

impl Processor for TagIdentifier {
    fn process(&self, tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()> {
        let subject = self.subject(tuple)?;
        for value in tuple.list(Field::Values)? {
            let text = value.as_text().ok_or(SiftError::TypeMismatch {
                field: Field::Values,
                expected: "text",
                found: "integer",
            })?;
            let mut tag = Tuple::new(&[Field::Key, Field::Sources, Field::Values])
                .with(Field::Key, compose_key(subject, text))
                .with(Field::Values, vec![Datum::Int(self.weight_of(text))]);
            if tuple.contains(Field::Sources) {
                tag.set(Field::Sources, tuple.list(Field::Sources)?.to_vec())?;
            }
            for field in [Field::Sentiment, Field::Group] {
                if let Some(value) = tuple.get(field).ok().flatten() {
                    tag = tag.with(field, value.clone());
                }
            }
            output.emit(tag)?;
        }
        Ok(())
    }
    fn name(&self) -> &str { "tag-identifier" }
}

#[cfg(test)]
mod test {

    use super::TagIdentifier;
    use crate::collector::MemOutputCollector;
    use crate::processor::Processor;
    use crate::tuple::{Datum, Field, Tuple};

    #[test]
    fn weights_by_word_count() {
        let identifier = TagIdentifier::new().weight(2, 3);
        assert_eq!(identifier.weight_of("battery"), 1);
        assert_eq!(identifier.weight_of("battery life"), 3);
        assert_eq!(identifier.weight_of("very long battery life"), 1);
    }

    #[test]
    fn tags_prefer_the_tag_field() {
        let words = Tuple::new(&[Field::Key, Field::Sources, Field::Values, Field::Sentiment, Field::Tag])
            .with(Field::Key, "phone:review")
            .with(Field::Sources, vec![Datum::from("r1_1")])
            .with(Field::Values, vec![Datum::from("battery life"), Datum::from("camera")])
            .with(Field::Sentiment, "negative")
            .with(Field::Tag, "pixel");
        let mut output = MemOutputCollector::new();
        TagIdentifier::new().weight(2, 2).process(&words, &mut output).unwrap();

        let tags = output.tuples();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].get_str(Field::Key).unwrap(), "pixel:battery life");
        assert_eq!(tags[0].list(Field::Values).unwrap(), &[Datum::Int(2)]);
        assert_eq!(tags[1].get_str(Field::Key).unwrap(), "pixel:camera");
        assert_eq!(tags[1].get_str(Field::Sentiment).unwrap(), "negative");
        assert_eq!(tags[1].list(Field::Sources).unwrap(), &[Datum::from("r1_1")]);
        assert!(!tags[1].contains(Field::Tag));
    }

    #[test]
    fn untagged_tuples_use_the_key_subject() {
        let words = Tuple::new(&[Field::Key, Field::Values])
            .with(Field::Key, "phone:review")
            .with(Field::Values, vec![Datum::from("screen")]);
        let mut output = MemOutputCollector::new();
        TagIdentifier::new().process(&words, &mut output).unwrap();
        assert_eq!(output.tuples()[0].get_str(Field::Key).unwrap(), "phone:screen");
        assert_eq!(output.tuples()[0].list(Field::Sources).unwrap(), &[] as &[Datum]);
    }
}
