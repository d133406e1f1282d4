//! Grouping of tuples by key.
//!
//! A shuffle takes tuples in arbitrary order and returns one tuple per distinct key. The
//! sources of tuples sharing a key are unioned, and their values concatenated.

use crate::error::Result;
use crate::tuple::{Datum, Field, Tuple};

/// Groups tuples by key, merging those that share one.
///
/// Implementations must return one tuple per distinct `Key`, with `Sources` holding each
/// source once, in first-seen order, and `Values` holding every contributor's values. A
/// tuple that does not declare `Sources` contributes no sources.
/// Tuples sharing a key are expected to share a schema; fields other than the key, sources
/// and values are taken from the first tuple of each key.
pub trait Shuffler: Send + Sync {
    /// Shuffles `tuples`, consuming them.
    fn shuffle(&self, tuples: Vec<Tuple>) -> Result<Vec<Tuple>>;
}

impl<S: ?Sized + Shuffler> Shuffler for Box<S> {
    fn shuffle(&self, tuples: Vec<Tuple>) -> Result<Vec<Tuple>> { (**self).shuffle(tuples) }
}

impl<S: ?Sized + Shuffler> Shuffler for std::sync::Arc<S> {
    fn shuffle(&self, tuples: Vec<Tuple>) -> Result<Vec<Tuple>> { (**self).shuffle(tuples) }
}

/// An in-memory sort-merge shuffle.
///
/// Tuples are stably sorted by key, so output keys ascend and equal keys merge in input
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemSortMergeShuffler;

impl MemSortMergeShuffler {
    /// Allocates a new shuffler.
    pub fn new() -> Self { MemSortMergeShuffler }
}

impl Shuffler for MemSortMergeShuffler {
    fn shuffle(&self, tuples: Vec<Tuple>) -> Result<Vec<Tuple>> {
        let mut keyed = tuples
            .into_iter()
            .map(|tuple| Ok((tuple.get_str(Field::Key)?.to_owned(), tuple)))
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|(key1, _), (key2, _)| key1.cmp(key2));

        let mut merged = Vec::new();
        let mut current: Option<(String, Tuple)> = None;
        for (key, tuple) in keyed {
            match current.as_mut() {
                Some((current_key, accumulator)) if *current_key == key => {
                    merge_into(accumulator, &tuple)?;
                }
                _ => {
                    if let Some((_, accumulator)) = current.take() {
                        merged.push(accumulator);
                    }
                    current = Some((key, seed(tuple)?));
                }
            }
        }
        if let Some((_, accumulator)) = current {
            merged.push(accumulator);
        }
        Ok(merged)
    }
}

/// Prepares the first tuple of a key to absorb the others.
fn seed(mut tuple: Tuple) -> Result<Tuple> {
    tuple.add_field(Field::Sources);
    let sources = tuple.get_list(Field::Sources)?;
    let mut unique: Vec<Datum> = Vec::with_capacity(sources.len());
    for source in sources.drain(..) {
        if !unique.contains(&source) {
            unique.push(source);
        }
    }
    *sources = unique;
    tuple.get_list(Field::Values)?;
    Ok(tuple)
}

fn merge_into(accumulator: &mut Tuple, tuple: &Tuple) -> Result<()> {
    let incoming = if tuple.contains(Field::Sources) { tuple.list(Field::Sources)? } else { &[] };
    let sources = accumulator.get_list(Field::Sources)?;
    for source in incoming {
        if !sources.contains(source) {
            sources.push(source.clone());
        }
    }
    let values = tuple.list(Field::Values)?;
    accumulator.extend_list(Field::Values, values.iter().cloned())
}

#[cfg(test)]
mod test {

    use super::{MemSortMergeShuffler, Shuffler};
    use crate::error::SiftError;
    use crate::tuple::{Datum, Field, Tuple};

    fn tuple(key: &str, sources: &[&str], values: &[i64]) -> Tuple {
        Tuple::new(&[Field::Key, Field::Sources, Field::Values])
            .with(Field::Key, key)
            .with(Field::Sources, sources.iter().map(|s| Datum::from(*s)).collect::<Vec<_>>())
            .with(Field::Values, values.iter().map(|v| Datum::Int(*v)).collect::<Vec<_>>())
    }

    #[test]
    fn merges_equal_keys_in_input_order() {
        let output = MemSortMergeShuffler
            .shuffle(vec![
                tuple("p:b", &["u3"], &[5]),
                tuple("p:a", &["u1"], &[1]),
                tuple("p:b", &["u4"], &[6]),
                tuple("p:a", &["u2", "u1"], &[2, 3]),
            ])
            .unwrap();
        assert_eq!(output, vec![tuple("p:a", &["u1", "u2"], &[1, 2, 3]), tuple("p:b", &["u3", "u4"], &[5, 6])]);
    }

    #[test]
    fn empty_and_singleton_inputs() {
        assert!(MemSortMergeShuffler.shuffle(Vec::new()).unwrap().is_empty());
        let single = tuple("p:a", &["u1"], &[1]);
        assert_eq!(MemSortMergeShuffler.shuffle(vec![single.clone()]).unwrap(), vec![single]);
    }

    #[test]
    fn duplicate_sources_within_one_tuple_collapse() {
        let output = MemSortMergeShuffler.shuffle(vec![tuple("p:a", &["u1", "u1"], &[1])]).unwrap();
        assert_eq!(output[0].list(Field::Sources).unwrap(), &[Datum::from("u1")]);
    }

    #[test]
    fn null_lists_merge_as_empty() {
        let bare = Tuple::new(&[Field::Key, Field::Sources, Field::Values]).with(Field::Key, "p:a");
        let output = MemSortMergeShuffler.shuffle(vec![bare, tuple("p:a", &["u1"], &[4])]).unwrap();
        assert_eq!(output, vec![tuple("p:a", &["u1"], &[4])]);
    }

    #[test]
    fn undeclared_sources_contribute_nothing() {
        let bare = Tuple::new(&[Field::Key, Field::Values])
            .with(Field::Key, "p:a")
            .with(Field::Values, vec![Datum::Int(2)]);
        let output = MemSortMergeShuffler.shuffle(vec![bare.clone(), tuple("p:a", &["u1"], &[4]), bare]).unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].list(Field::Sources).unwrap(), &[Datum::from("u1")]);
        assert_eq!(output[0].list(Field::Values).unwrap(), &[Datum::Int(2), Datum::Int(4), Datum::Int(2)]);
    }

    #[test]
    fn missing_fields_are_errors() {
        let keyless = Tuple::new(&[Field::Sources, Field::Values]);
        assert!(matches!(
            MemSortMergeShuffler.shuffle(vec![keyless]),
            Err(SiftError::FieldNotFound(Field::Key))
        ));
        let valueless = Tuple::new(&[Field::Key]).with(Field::Key, "p:a");
        assert!(matches!(
            MemSortMergeShuffler.shuffle(vec![valueless]),
            Err(SiftError::FieldNotFound(Field::Values))
        ));
    }
}
