//! The unit of data flowing through a sift pipeline.
//!
//! A [`Tuple`] binds an ordered schema of [`Field`]s to optional values. Fields come from a
//! closed vocabulary, so "field not present" is a typed outcome rather than a missing index,
//! and every list held by a tuple is owned by that tuple alone: cloning copies lists, and
//! two tuples can never observe each other's mutations.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Result, SiftError};

/// Separates the subject of a key from its discriminator, as in `product:display`.
pub const KEY_SEPARATOR: char = ':';

/// Key carried by tuples whose key has not been assigned yet.
pub const UNDEFINED_KEY: &str = "UNDEFINED";

/// Composes a key from a subject and a discriminator.
pub fn compose_key(subject: &str, discriminator: &str) -> String {
    format!("{subject}{KEY_SEPARATOR}{discriminator}")
}

/// A named slot in a tuple's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// The grouping key, `subject:discriminator` by convention.
    Key,
    /// Provenance identifiers (review URIs and line fragments).
    Sources,
    /// Text fragments or integer weights, depending on the stage.
    Values,
    /// One of the sentiment labels.
    Sentiment,
    /// The subject a line was tagged with on input.
    Tag,
    /// A product group, used to scope aspects and stop words.
    Group,
}

impl Field {
    /// The display name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Key => "key",
            Field::Sources => "sourceURIs",
            Field::Values => "values",
            Field::Sentiment => "sentiment",
            Field::Tag => "tag",
            Field::Group => "group",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar held by a tuple slot or list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Datum {
    /// A text fragment or identifier.
    Text(String),
    /// An integer weight.
    Int(i64),
}

impl Datum {
    /// The text, if this is a text datum.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Datum::Text(text) => Some(text),
            Datum::Int(_) => None,
        }
    }
    /// The integer, if this is an integer datum.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Datum::Int(int) => Some(*int),
            Datum::Text(_) => None,
        }
    }
    fn kind(&self) -> &'static str {
        match self {
            Datum::Text(_) => "text",
            Datum::Int(_) => "integer",
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Text(text) => f.write_str(text),
            Datum::Int(int) => write!(f, "{int}"),
        }
    }
}

impl From<&str> for Datum {
    fn from(text: &str) -> Self { Datum::Text(text.to_owned()) }
}
impl From<String> for Datum {
    fn from(text: String) -> Self { Datum::Text(text) }
}
impl From<i64> for Datum {
    fn from(int: i64) -> Self { Datum::Int(int) }
}

/// The contents of a non-null slot: a scalar, or a list of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// A single scalar.
    Datum(Datum),
    /// An ordered, growable list.
    List(Vec<Datum>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Datum(datum) => datum.kind(),
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Datum(datum) => datum.fmt(f),
            Value::List(list) => write!(f, "[{}]", list.iter().join(", ")),
        }
    }
}

impl From<Datum> for Value {
    fn from(datum: Datum) -> Self { Value::Datum(datum) }
}
impl From<Vec<Datum>> for Value {
    fn from(list: Vec<Datum>) -> Self { Value::List(list) }
}
impl From<&str> for Value {
    fn from(text: &str) -> Self { Value::Datum(text.into()) }
}
impl From<String> for Value {
    fn from(text: String) -> Self { Value::Datum(text.into()) }
}
impl From<i64> for Value {
    fn from(int: i64) -> Self { Value::Datum(int.into()) }
}

fn mismatch(field: Field, expected: &'static str, found: Option<&Value>) -> SiftError {
    SiftError::TypeMismatch {
        field,
        expected,
        found: found.map_or("null", Value::kind),
    }
}

/// An ordered schema of fields, each bound to an optional value.
///
/// The schema is kept in insertion order and never holds a field twice. Reading a field
/// outside the schema fails with [`SiftError::FieldNotFound`]; fields must be declared with
/// [`Tuple::add_field`] before they can be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuple {
    slots: SmallVec<[(Field, Option<Value>); 6]>,
}

impl Tuple {
    /// Creates a tuple declaring `fields`, all null.
    pub fn new(fields: &[Field]) -> Self {
        let mut tuple = Tuple::default();
        for field in fields {
            tuple.add_field(*field);
        }
        tuple
    }

    /// Declares `field` and binds it to `value`, returning the tuple.
    pub fn with<V: Into<Value>>(mut self, field: Field, value: V) -> Self {
        self.add_field(field);
        if let Ok(slot) = self.slot_mut(field) {
            *slot = Some(value.into());
        }
        self
    }

    /// Appends `field` with a null slot, unless it is already declared.
    pub fn add_field(&mut self, field: Field) {
        if !self.contains(field) {
            self.slots.push((field, None));
        }
    }

    /// True if the schema declares `field`.
    pub fn contains(&self, field: Field) -> bool {
        self.slots.iter().any(|(declared, _)| *declared == field)
    }

    /// The declared fields, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.slots.iter().map(|(field, _)| *field)
    }

    /// The number of declared fields.
    pub fn len(&self) -> usize { self.slots.len() }

    /// True if no field is declared.
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    fn slot(&self, field: Field) -> Result<&Option<Value>> {
        self.slots
            .iter()
            .find(|(declared, _)| *declared == field)
            .map(|(_, value)| value)
            .ok_or(SiftError::FieldNotFound(field))
    }

    fn slot_mut(&mut self, field: Field) -> Result<&mut Option<Value>> {
        self.slots
            .iter_mut()
            .find(|(declared, _)| *declared == field)
            .map(|(_, value)| value)
            .ok_or(SiftError::FieldNotFound(field))
    }

    /// The value bound to `field`, or `None` for a null slot.
    pub fn get(&self, field: Field) -> Result<Option<&Value>> {
        self.slot(field).map(Option::as_ref)
    }

    /// The text bound to `field`.
    pub fn get_str(&self, field: Field) -> Result<&str> {
        match self.slot(field)? {
            Some(Value::Datum(Datum::Text(text))) => Ok(text),
            other => Err(mismatch(field, "text", other.as_ref())),
        }
    }

    /// The integer bound to `field`.
    pub fn get_int(&self, field: Field) -> Result<i64> {
        match self.slot(field)? {
            Some(Value::Datum(Datum::Int(int))) => Ok(*int),
            other => Err(mismatch(field, "integer", other.as_ref())),
        }
    }

    /// Read-only view of the list bound to `field`; a null slot reads as empty.
    pub fn list(&self, field: Field) -> Result<&[Datum]> {
        match self.slot(field)? {
            None => Ok(&[]),
            Some(Value::List(list)) => Ok(list),
            other => Err(mismatch(field, "list", other.as_ref())),
        }
    }

    /// Mutable access to the list bound to `field`.
    ///
    /// A null slot is initialized to an empty list, which stays bound to the field.
    pub fn get_list(&mut self, field: Field) -> Result<&mut Vec<Datum>> {
        let slot = self.slot_mut(field)?;
        if slot.is_none() {
            *slot = Some(Value::List(Vec::new()));
        }
        match slot {
            Some(Value::List(list)) => Ok(list),
            other => Err(mismatch(field, "list", other.as_ref())),
        }
    }

    /// Replaces the value bound to a declared field.
    pub fn set<V: Into<Value>>(&mut self, field: Field, value: V) -> Result<()> {
        *self.slot_mut(field)? = Some(value.into());
        Ok(())
    }

    /// Sets a declared field to null.
    pub fn reset(&mut self, field: Field) -> Result<()> {
        *self.slot_mut(field)? = None;
        Ok(())
    }

    /// Appends `value` to the list bound to `field`, creating the list if needed.
    ///
    /// A `None` value is ignored.
    pub fn add_to_list<D: Into<Option<Datum>>>(&mut self, field: Field, value: D) -> Result<()> {
        if let Some(datum) = value.into() {
            self.get_list(field)?.push(datum);
        }
        Ok(())
    }

    /// Appends every datum of `values` to the list bound to `field`.
    pub fn extend_list<I: IntoIterator<Item = Datum>>(&mut self, field: Field, values: I) -> Result<()> {
        self.get_list(field)?.extend(values);
        Ok(())
    }

    /// Splits the key into its subject and discriminator at the first separator.
    pub fn key_parts(&self) -> Result<(&str, &str)> {
        let key = self.get_str(Field::Key)?;
        key.split_once(KEY_SEPARATOR)
            .ok_or_else(|| SiftError::MalformedKey(key.to_owned()))
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, value) in self.slots.iter() {
            match value {
                Some(value) => write!(f, "{field}:{value}; ")?,
                None => write!(f, "{field}:null; ")?,
            }
        }
        Ok(())
    }
}
