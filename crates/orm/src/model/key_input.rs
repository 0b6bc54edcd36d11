//! Inputs accepted wherever a composite key is expected

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::hash_key::{HashKey, KeyShape, KeyValue};

/// Anything that can report key field values by name
///
/// Models implement this so that an instance of one model can be used to
/// look up rows of another model sharing some of its columns.
pub trait KeySource {
    /// Current value of the named field, `None` when absent or unset
    fn key_field(&self, name: &str) -> Option<KeyValue>;
}

impl<S: KeyShape> KeySource for HashKey<S> {
    fn key_field(&self, name: &str) -> Option<KeyValue> {
        self.get(name).cloned()
    }
}

impl KeySource for HashMap<String, KeyValue> {
    fn key_field(&self, name: &str) -> Option<KeyValue> {
        self.get(name).cloned()
    }
}

/// Loosely-typed key input for a key of shape `S`
pub enum KeyInput<'a, S: KeyShape> {
    /// An already-built key
    Key(HashKey<S>),
    /// Field name to value pairs
    Fields(Vec<(String, KeyValue)>),
    /// A bare value without a field name
    Scalar(KeyValue),
    /// A model instance or other field-bearing record
    Record(&'a dyn KeySource),
}

impl<'a, S: KeyShape> KeyInput<'a, S> {
    /// Wrap any field-bearing record
    pub fn record<T: KeySource>(source: &'a T) -> Self {
        KeyInput::Record(source)
    }

    /// Wrap field pairs
    pub fn fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<KeyValue>,
    {
        KeyInput::Fields(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl<S: KeyShape> fmt::Debug for KeyInput<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyInput::Key(key) => f.debug_tuple("Key").field(key).finish(),
            KeyInput::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            KeyInput::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            KeyInput::Record(_) => f.write_str("Record(..)"),
        }
    }
}

impl<S: KeyShape> From<HashKey<S>> for KeyInput<'_, S> {
    fn from(key: HashKey<S>) -> Self {
        KeyInput::Key(key)
    }
}

impl<S: KeyShape> From<&HashKey<S>> for KeyInput<'_, S> {
    fn from(key: &HashKey<S>) -> Self {
        KeyInput::Key(key.clone())
    }
}

impl<S: KeyShape> From<Vec<(String, KeyValue)>> for KeyInput<'_, S> {
    fn from(fields: Vec<(String, KeyValue)>) -> Self {
        KeyInput::Fields(fields)
    }
}

impl<S: KeyShape> From<HashMap<String, KeyValue>> for KeyInput<'_, S> {
    fn from(fields: HashMap<String, KeyValue>) -> Self {
        KeyInput::Fields(fields.into_iter().collect())
    }
}

impl<S: KeyShape> From<BTreeMap<String, KeyValue>> for KeyInput<'_, S> {
    fn from(fields: BTreeMap<String, KeyValue>) -> Self {
        KeyInput::Fields(fields.into_iter().collect())
    }
}

impl<S: KeyShape> From<KeyValue> for KeyInput<'_, S> {
    fn from(value: KeyValue) -> Self {
        KeyInput::Scalar(value)
    }
}

impl<S: KeyShape> From<i64> for KeyInput<'_, S> {
    fn from(value: i64) -> Self {
        KeyInput::Scalar(value.into())
    }
}

impl<S: KeyShape> From<i32> for KeyInput<'_, S> {
    fn from(value: i32) -> Self {
        KeyInput::Scalar(value.into())
    }
}

impl<S: KeyShape> From<&str> for KeyInput<'_, S> {
    fn from(value: &str) -> Self {
        KeyInput::Scalar(value.into())
    }
}

impl<S: KeyShape> From<String> for KeyInput<'_, S> {
    fn from(value: String) -> Self {
        KeyInput::Scalar(value.into())
    }
}

impl<S: KeyShape> From<Vec<u8>> for KeyInput<'_, S> {
    fn from(value: Vec<u8>) -> Self {
        KeyInput::Scalar(value.into())
    }
}

impl<S: KeyShape> From<&[u8]> for KeyInput<'_, S> {
    fn from(value: &[u8]) -> Self {
        KeyInput::Scalar(value.into())
    }
}
