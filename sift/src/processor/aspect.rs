//! Restricting tags to known product aspects.

use std::collections::HashMap;

use crate::collector::OutputCollector;
use crate::error::Result;
use crate::processor::Processor;
use crate::tuple::{compose_key, Field, Tuple};

/// Keeps tuples that mention a known aspect, keying them by that aspect.
///
/// Words and phrases map to a canonical aspect, so synonyms collapse onto one key. The
/// mention is the first text value of the tuple, or, for tuples whose values are weights,
/// the discriminator of its key. Tuples without a known aspect are dropped; the others are
/// re-keyed to `subject:aspect`.
///
/// Aspects registered for a group take precedence over the shared ones for tuples of that
/// group.
#[derive(Debug, Clone, Default)]
pub struct AspectFilter {
    aspects: HashMap<String, String>,
    groups: HashMap<String, HashMap<String, String>>,
}

impl AspectFilter {
    /// A filter knowing no aspects, which drops everything.
    pub fn new() -> Self { Self::default() }

    /// Maps `mention` to `aspect`.
    pub fn insert(&mut self, mention: &str, aspect: &str) {
        self.aspects.insert(mention.to_owned(), aspect.to_owned());
    }

    /// Maps `mention` to `aspect` within `group`.
    pub fn insert_for_group(&mut self, group: &str, mention: &str, aspect: &str) {
        self.groups
            .entry(group.to_owned())
            .or_default()
            .insert(mention.to_owned(), aspect.to_owned());
    }

    /// The aspect `mention` refers to, if any.
    pub fn aspect(&self, mention: &str, group: Option<&str>) -> Option<&str> {
        group
            .and_then(|group| self.groups.get(group))
            .and_then(|aspects| aspects.get(mention))
            .or_else(|| self.aspects.get(mention))
            .map(String::as_str)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for AspectFilter {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut filter = AspectFilter::new();
        for (mention, aspect) in iter {
            filter.insert(mention, aspect);
        }
        filter
    }
}

impl Processor for AspectFilter {
    fn process(&self, tuple: &Tuple, output: &mut dyn OutputCollector) -> Result<()> {
        let (subject, discriminator) = tuple.key_parts()?;
        let mention = tuple
            .list(Field::Values)?
            .first()
            .and_then(|value| value.as_text())
            .unwrap_or(discriminator);
        let group = match tuple.get(Field::Group) {
            Ok(Some(_)) => Some(tuple.get_str(Field::Group)?),
            _ => None,
        };
        if let Some(aspect) = self.aspect(mention, group) {
            let mut filtered = tuple.clone();
            filtered.set(Field::Key, compose_key(subject, aspect))?;
            output.emit(filtered)?;
        }
        Ok(())
    }
    fn name(&self) -> &str { "aspect-filter" }
}
