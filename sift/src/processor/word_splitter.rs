//! Splitting lines into words and phrases.

use crate::collector::OutputCollector;
use crate::error::{Result, SiftError};
use crate::processor::stop_words::{StopWords, GRAM_SEPARATOR};
use crate::processor::Processor;
use crate::tuple::{Datum, Field, Tuple};

/// The default length of the longest phrase extracted.
pub const DEFAULT_N_GRAM: usize = 1;

/// Replaces the text values of a tuple by the words and phrases they contain.
///
/// Every run of one to `n_gram` consecutive words is a candidate phrase; phrases that are
/// stop words, for the tuple's group when it has one, are dropped. One tuple is emitted per
/// input, holding the surviving phrases in order of their first word, shortest first.
#[derive(Debug, Clone)]
pub struct WordSplitter {
    n_gram: usize,
    stop_words: StopWords,
}

impl Default for WordSplitter {
    fn default() -> Self {
        WordSplitter { n_gram: DEFAULT_N_GRAM, stop_words: StopWords::new() }
    }
}

impl WordSplitter {
    /// Extracts phrases of up to `n_gram` words, filtered by `stop_words`.
    pub fn new(n_gram: usize, stop_words: StopWords) -> Self {
        WordSplitter { n_gram: n_gram.max(1), stop_words }
    }

    /// The length of the longest phrase extracted.
    pub fn n_gram(&self) -> usize { self.n_gram }

    /// The phrases of `text` that are not stop words.
    pub fn grams(&self, text: &str, group: Option<&str>) -> Vec<String> {
        let words = StopWords::split(text);
        let mut grams = Vec::new();
        for start in 0..words.len() {
            let longest = self.n_gram.min(words.len() - start);
            for length in 1..=longest {
                let gram = words[start..start + length].join(GRAM_SEPARATOR);
                let stop = match group {
                    Some(group) => self.stop_words.is_group_stop_word(&gram, group),
                    None => self.stop_words.is_stop_word(&gram),
                };
                if !stop {
                    grams.push(gram);
                }
            }
        }
        grams
    }
}

impl Processor for WordSplitter {
    fn process(&self, tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()> {
        let group = match tuple.get(Field::Group) {
            Ok(Some(_)) => Some(tuple.get_str(Field::Group)?),
            _ => None,
        };
        let mut split = tuple.clone();
        split.reset(Field::Values)?;
        for value in tuple.list(Field::Values)? {
            let text = value.as_text().ok_or(SiftError::TypeMismatch {
                field: Field::Values,
                expected: "text",
                found: "integer",
            })?;
            split.extend_list(Field::Values, self.grams(text, group).into_iter().map(Datum::Text))?;
        }
        output.emit(split)
    }
    fn name(&self) -> &str { "word-splitter" }
}

#[cfg(test)]
mod test {

    use super::WordSplitter;
    use crate::collector::MemOutputCollector;
    use crate::processor::{Processor, StopWords};
    use crate::tuple::{Datum, Field, Tuple};

    #[test]
    fn bigrams_skip_conjunction_edges() {
        let splitter = WordSplitter::new(2, StopWords::new());
        assert_eq!(
            splitter.grams("the battery life is great", None),
            vec!["battery", "battery life", "life", "great"]
        );
    }

    #[test]
    fn emits_one_tuple_with_grams() {
        let line = Tuple::new(&[Field::Key, Field::Sources, Field::Values, Field::Group])
            .with(Field::Key, "phone:review")
            .with(Field::Sources, vec![Datum::from("r1_1")])
            .with(Field::Values, vec![Datum::from("loud speaker"), Datum::from("dim phone screen")])
            .with(Field::Group, "phones");

        let mut stop_words = StopWords::new();
        stop_words.extend_group("phones", ["phone"]);
        let mut output = MemOutputCollector::new();
        WordSplitter::new(1, stop_words).process(&line, &mut output).unwrap();

        assert_eq!(output.len(), 1);
        let split = &output.tuples()[0];
        assert_eq!(
            split.list(Field::Values).unwrap(),
            &[Datum::from("loud"), Datum::from("speaker"), Datum::from("dim"), Datum::from("screen")]
        );
        assert_eq!(split.list(Field::Sources).unwrap(), line.list(Field::Sources).unwrap());
    }

    #[test]
    fn lines_of_stop_words_emit_no_values() {
        let line = Tuple::new(&[Field::Key, Field::Values]).with(Field::Values, vec![Datum::from("it is")]);
        let mut output = MemOutputCollector::new();
        WordSplitter::default().process(&line, &mut output).unwrap();
        assert_eq!(output.len(), 1);
        assert!(output.tuples()[0].list(Field::Values).unwrap().is_empty());
    }
}
