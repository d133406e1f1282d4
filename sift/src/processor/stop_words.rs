//! Words that carry no information on their own.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::Result;

const STOP_WORDS: &[&str] = &[
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u",
    "v", "w", "x", "y", "z", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
    "/", "\\", "\\n", ",", ".", "<", ">", "!", "&", "*", "%", "$", "#", "@", "-", "+", "//", "\\\\", "(", ")",
    "an", "and", "are", "as", "at", "be", "but", "by", "eight", "five", "for", "four", "go",
    "has", "have", "he", "her", "his", "if", "in", "into", "is", "it", "its", "my", "nine", "no", "not", "of", "on",
    "one", "or", "seven", "six", "so", "such", "ten", "that", "the", "then", "there", "these", "they", "this",
    "three", "to", "too", "two", "will", "with",
    "&amp;", "&quot;", "amp", "quot", "&gt", "&mdash", "gt", "mdash",
];

const CONJUNCTIONS: &[&str] = &[
    "a", "an", "and", "as", "at", "both", "but", "either", "for", "in", "is", "just", "neither", "nor", "of",
    "only", "or", "so", "this", "the", "to", "with", "whether", "yet",
];

/// Joins the words of an n-gram.
pub const GRAM_SEPARATOR: &str = " ";

/// A set of stop words and conjunctions, optionally scoped by product group.
///
/// A phrase is a stop word if it is listed, if it is empty, or if it starts or ends with a
/// conjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
    conjunctions: HashSet<String>,
    groups: HashMap<String, HashSet<String>>,
}

impl Default for StopWords {
    fn default() -> Self {
        StopWords {
            words: STOP_WORDS.iter().map(|word| (*word).to_owned()).collect(),
            conjunctions: CONJUNCTIONS.iter().map(|word| (*word).to_owned()).collect(),
            groups: HashMap::new(),
        }
    }
}

impl StopWords {
    /// Stop words with the built-in lists.
    pub fn new() -> Self { Self::default() }

    /// Stop words with nothing listed.
    pub fn empty() -> Self {
        StopWords {
            words: HashSet::new(),
            conjunctions: HashSet::new(),
            groups: HashMap::new(),
        }
    }

    /// Splits `text` into words at every run of characters that are not ASCII alphanumeric.
    pub fn split(text: &str) -> Vec<&str> {
        text.split(|ch: char| !ch.is_ascii_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// The number of words in `text`.
    pub fn word_count(text: &str) -> usize { StopWords::split(text).len() }

    /// True if `phrase` is a stop word.
    pub fn is_stop_word(&self, phrase: &str) -> bool {
        if self.words.contains(phrase) {
            return true;
        }
        let words = StopWords::split(phrase);
        match (words.first(), words.last()) {
            (Some(first), Some(last)) => self.conjunctions.contains(*first) || self.conjunctions.contains(*last),
            _ => true,
        }
    }

    /// True if `phrase` is a stop word, or a stop word of `group`.
    pub fn is_group_stop_word(&self, phrase: &str, group: &str) -> bool {
        self.is_stop_word(phrase) || self.groups.get(group).is_some_and(|words| words.contains(phrase))
    }

    /// Adds `words` to the stop words.
    pub fn extend<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, words: I) {
        self.words.extend(words.into_iter().map(Into::into));
    }

    /// Adds `words` to the stop words of `group`.
    pub fn extend_group<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, group: &str, words: I) {
        self.groups
            .entry(group.to_owned())
            .or_default()
            .extend(words.into_iter().map(Into::into));
    }

    /// Adds every line of the file at `path` to the stop words.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let text = fs::read_to_string(path)?;
        self.extend(text.lines().map(str::trim).filter(|line| !line.is_empty()));
        Ok(())
    }

    /// Adds every line of the file at `path` to the stop words of `group`.
    pub fn load_group<P: AsRef<Path>>(&mut self, group: &str, path: P) -> Result<()> {
        let text = fs::read_to_string(path)?;
        self.extend_group(group, text.lines().map(str::trim).filter(|line| !line.is_empty()));
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::StopWords;
    use crate::error::SiftError;

    #[test]
    fn split_on_non_alphanumerics() {
        assert_eq!(StopWords::split("  battery-life, (great)!"), vec!["battery", "life", "great"]);
        assert_eq!(StopWords::word_count("touch screen"), 2);
        assert!(StopWords::split("?!").is_empty());
    }

    #[test]
    fn conjunctions_at_phrase_edges() {
        let stop_words = StopWords::new();
        assert!(stop_words.is_stop_word("the"));
        assert!(stop_words.is_stop_word("the screen"));
        assert!(stop_words.is_stop_word("screen and"));
        assert!(stop_words.is_stop_word("--"));
        assert!(!stop_words.is_stop_word("screen and battery"));
        assert!(!stop_words.is_stop_word("screen"));
    }

    #[test]
    fn group_words_and_files() {
        let mut stop_words = StopWords::empty();
        stop_words.extend_group("phones", ["phone"]);
        assert!(stop_words.is_group_stop_word("phone", "phones"));
        assert!(!stop_words.is_group_stop_word("phone", "tablets"));
        assert!(!stop_words.is_stop_word("phone"));

        let path = std::env::temp_dir().join(format!("sift-stop-words-{}", std::process::id()));
        std::fs::write(&path, "really\n\n  very \n").unwrap();
        stop_words.load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(stop_words.is_stop_word("really"));
        assert!(stop_words.is_stop_word("very"));

        assert!(matches!(stop_words.load(&path), Err(SiftError::Io(_))));
    }
}
