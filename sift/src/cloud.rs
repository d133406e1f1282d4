//! Tag clouds built from aggregated tuples.
//!
//! Aggregated tuples are keyed `subject:tag` and hold a single summed weight. A
//! [`TagCloud`] gathers the tags of one subject and sentiment, ready to be rendered.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::aggregate::sum;
use crate::error::{Result, SiftError};
use crate::sentiment::Sentiment;
use crate::tuple::{Field, Tuple};

/// The default number of tags kept by [`TagCloud::truncate`].
pub const DEFAULT_MAX_TAGS: usize = 75;

/// A weighted tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// The text displayed for the tag.
    pub text: String,
    /// The accumulated weight.
    pub weight: i64,
    /// Where the tag was found.
    pub sources: Vec<String>,
}

/// The tags of one subject with one sentiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCloud {
    /// The subject the tags describe.
    pub subject: String,
    /// The sentiment of the tags, if they were aggregated per sentiment.
    pub sentiment: Option<Sentiment>,
    /// The tags, in aggregation order until truncated.
    pub tags: Vec<Tag>,
}

impl TagCloud {
    /// Groups aggregated tuples into clouds.
    ///
    /// Clouds are ordered by first appearance of their subject and then by sentiment,
    /// positive first. Labelled and unlabelled tuples cannot be mixed.
    pub fn from_tuples(tuples: &[Tuple]) -> Result<Vec<TagCloud>> {
        let labelled = tuples.iter().filter(|tuple| tuple.contains(Field::Sentiment)).count();
        if labelled != 0 && labelled != tuples.len() {
            return Err(SiftError::FieldNotFound(Field::Sentiment));
        }

        // one slot per sentiment, or a single unlabelled slot, per subject
        let mut subjects: Vec<(String, [Vec<Tag>; 3])> = Vec::new();
        for tuple in tuples {
            let (subject, text) = tuple.key_parts()?;
            let slot = if labelled == 0 { 0 } else { Sentiment::of(tuple)?.index() };
            let tag = Tag {
                text: text.to_owned(),
                weight: sum(tuple)?,
                sources: tuple.list(Field::Sources)?.iter().map(ToString::to_string).collect(),
            };
            let position = match subjects.iter().position(|(known, _)| known == subject) {
                Some(position) => position,
                None => {
                    subjects.push((subject.to_owned(), Default::default()));
                    subjects.len() - 1
                }
            };
            subjects[position].1[slot].push(tag);
        }

        let mut clouds = Vec::new();
        for (subject, slots) in subjects {
            for (slot, tags) in slots.into_iter().enumerate() {
                if tags.is_empty() {
                    continue;
                }
                let sentiment = (labelled != 0).then_some(Sentiment::ALL[slot]);
                clouds.push(TagCloud { subject: subject.clone(), sentiment, tags });
            }
        }
        Ok(clouds)
    }

    /// Keeps the `max_tags` heaviest tags, heaviest first.
    ///
    /// Tags of equal weight keep their relative order.
    pub fn truncate(&mut self, max_tags: usize) {
        self.tags.sort_by_key(|tag| Reverse(tag.weight));
        self.tags.truncate(max_tags);
    }

    /// The sum of the weights of all tags.
    pub fn total_weight(&self) -> i64 {
        self.tags.iter().map(|tag| tag.weight).sum()
    }
}

#[cfg(test)]
mod test {

    use super::{TagCloud, DEFAULT_MAX_TAGS};
    use crate::error::SiftError;
    use crate::sentiment::Sentiment;
    use crate::tuple::{Datum, Field, Tuple};

    fn aggregated(key: &str, weight: i64, sentiment: Option<&str>) -> Tuple {
        let tuple = Tuple::new(&[Field::Key, Field::Sources, Field::Values])
            .with(Field::Key, key)
            .with(Field::Sources, vec![Datum::from("r1_1")])
            .with(Field::Values, vec![Datum::Int(weight)]);
        match sentiment {
            Some(label) => tuple.with(Field::Sentiment, label),
            None => tuple,
        }
    }

    #[test]
    fn groups_by_subject_then_sentiment() {
        let clouds = TagCloud::from_tuples(&[
            aggregated("pixel:screen", 3, Some("negative")),
            aggregated("iphone:camera", 5, Some("positive")),
            aggregated("pixel:camera", 2, Some("positive")),
            aggregated("pixel:battery", 4, Some("negative")),
        ])
        .unwrap();
        let summary = clouds
            .iter()
            .map(|cloud| (cloud.subject.as_str(), cloud.sentiment, cloud.tags.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("pixel", Some(Sentiment::Positive), 1),
                ("pixel", Some(Sentiment::Negative), 2),
                ("iphone", Some(Sentiment::Positive), 1),
            ]
        );
        assert_eq!(clouds[1].total_weight(), 7);
        assert_eq!(clouds[0].tags[0].sources, vec!["r1_1".to_owned()]);
    }

    #[test]
    fn unlabelled_tuples_form_one_cloud_per_subject() {
        let clouds = TagCloud::from_tuples(&[aggregated("pixel:screen", 1, None), aggregated("pixel:camera", 2, None)]).unwrap();
        assert_eq!(clouds.len(), 1);
        assert_eq!(clouds[0].sentiment, None);

        let mixed = TagCloud::from_tuples(&[aggregated("pixel:screen", 1, None), aggregated("pixel:camera", 2, Some("neutral"))]);
        assert!(matches!(mixed, Err(SiftError::FieldNotFound(Field::Sentiment))));
    }

    #[test]
    fn truncation_keeps_the_heaviest() {
        let tuples = (0..100).map(|index| aggregated(&format!("pixel:tag{index}"), index % 10, None)).collect::<Vec<_>>();
        let mut cloud = TagCloud::from_tuples(&tuples).unwrap().remove(0);
        cloud.truncate(DEFAULT_MAX_TAGS);
        assert_eq!(cloud.tags.len(), DEFAULT_MAX_TAGS);
        assert_eq!(cloud.tags[0].weight, 9);
        assert_eq!(cloud.tags[0].text, "tag9");
        assert_eq!(cloud.tags[1].text, "tag19");
        assert!(cloud.tags.windows(2).all(|pair| pair[0].weight >= pair[1].weight));
        assert!(cloud.tags.iter().all(|tag| tag.weight >= 2));
    }
}
