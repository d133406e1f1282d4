//! Splitting review text into lines.

use crate::collector::OutputCollector;
use crate::error::{Result, SiftError};
use crate::processor::Processor;
use crate::tuple::{Datum, Field, Tuple};

/// Lines of at most this many characters carry no useful information.
pub const DEFAULT_MIN_LINE_LENGTH: usize = 3;

/// Separates a subject from the text of a tagged value.
pub const DEFAULT_TAG_SEPARATOR: char = '\t';

/// Joins a source to the index of a line fragment taken from it.
pub const FRAGMENT_SEPARATOR: char = '_';

/// Splits text values into lines, emitting one tuple per line.
///
/// Text is lower-cased and split at newlines, at literal `\n` sequences, and at every dot
/// that does not sit between two digits. Each emitted tuple is a copy of the input holding
/// the trimmed line as its only value, and with every source suffixed by the line's
/// fragment index, counted from one across all values of the input. Lines no longer than
/// the minimum length are dropped, but still count as fragments.
///
/// A value of the form `subject<separator>text` is a tagged value: the subject is bound to
/// the `Tag` field of each emitted tuple, and only the text is split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSplitter {
    min_line_length: usize,
    tag_separator: Option<char>,
}

impl Default for LineSplitter {
    fn default() -> Self {
        LineSplitter {
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
            tag_separator: Some(DEFAULT_TAG_SEPARATOR),
        }
    }
}

impl LineSplitter {
    /// A splitter keeping lines longer than `min_line_length` characters.
    pub fn new(min_line_length: usize) -> Self {
        LineSplitter { min_line_length, ..Self::default() }
    }

    /// Sets the separator of tagged values, or disables tagging with `None`.
    pub fn tag_separator(mut self, separator: Option<char>) -> Self {
        self.tag_separator = separator;
        self
    }

    /// The minimum line length.
    pub fn min_line_length(&self) -> usize { self.min_line_length }

    /// Splits `text` into raw lines, without trimming or filtering.
    ///
    /// Empty lines at the end of the text are dropped.
    pub fn split_lines(text: &str) -> Vec<&str> {
        let chars = text.char_indices().collect::<Vec<_>>();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut index = 0;
        while index < chars.len() {
            let (offset, ch) = chars[index];
            let width = match ch {
                '\n' | '\r' => 1,
                '\\' if matches!(chars.get(index + 1), Some((_, 'n'))) => 2,
                '.' => {
                    let digit_before = index > 0 && chars[index - 1].1.is_ascii_digit();
                    let digit_after = chars.get(index + 1).is_some_and(|(_, next)| next.is_ascii_digit());
                    if digit_before && digit_after { 0 } else { 1 }
                }
                _ => 0,
            };
            if width > 0 {
                lines.push(&text[start..offset]);
                index += width;
                start = chars.get(index).map_or(text.len(), |(next, _)| *next);
            } else {
                index += 1;
            }
        }
        lines.push(&text[start..]);
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    }

    fn untag<'a>(&self, value: &'a str) -> (Option<&'a str>, &'a str) {
        match self.tag_separator.and_then(|separator| value.split_once(separator)) {
            Some((subject, text)) => (Some(subject), text),
            None => (None, value),
        }
    }
}

impl Processor for LineSplitter {
    fn process(&self, tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()> {
        let sources = if tuple.contains(Field::Sources) { tuple.list(Field::Sources)? } else { &[] };
        let mut fragment = 0;
        for value in tuple.list(Field::Values)? {
            let value = value.as_text().ok_or(SiftError::TypeMismatch {
                field: Field::Values,
                expected: "text",
                found: "integer",
            })?;
            let (subject, text) = self.untag(value);
            let text = text.to_lowercase();
            for line in LineSplitter::split_lines(&text) {
                fragment += 1;
                let line = line.trim();
                if line.chars().count() <= self.min_line_length {
                    continue;
                }
                let mut split = tuple.clone();
                split.set(Field::Values, vec![Datum::from(line)])?;
                if !sources.is_empty() {
                    let fragments = sources
                        .iter()
                        .map(|source| Datum::Text(format!("{source}{FRAGMENT_SEPARATOR}{fragment}")))
                        .collect::<Vec<_>>();
                    split.set(Field::Sources, fragments)?;
                }
                if let Some(subject) = subject {
                    split = split.with(Field::Tag, subject);
                }
                output.emit(split)?;
            }
        }
        Ok(())
    }
    fn name(&self) -> &str { "line-splitter" }
}
