//! Composite hash keys
//!
//! A [`HashKey`] is an ordered tuple of named scalar fields whose names are
//! fixed by a [`KeyShape`]. Fields may be unset; an unset field places no
//! constraint on a lookup and is distinct from a NULL column value. Keys are
//! immutable and compare and hash structurally, so they can be used directly
//! as map keys.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::backends::DatabaseValue;
use crate::error::{ModelError, ModelResult};

/// Static field layout of one kind of composite key
pub trait KeyShape: 'static {
    /// Name used when rendering keys of this shape
    const NAME: &'static str;

    /// Declared fields, in key order
    const FIELDS: &'static [&'static str];

    /// Position of a declared field
    fn field_index(name: &str) -> Option<usize> {
        Self::FIELDS.iter().position(|field| *field == name)
    }
}

/// Scalar value stored in a key field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(value) => write!(f, "{}", value),
            KeyValue::Text(value) => write!(f, "{:?}", value),
            KeyValue::Bytes(value) => write!(f, "0x{}", hex::encode(value)),
        }
    }
}

impl From<KeyValue> for DatabaseValue {
    fn from(value: KeyValue) -> Self {
        match value {
            KeyValue::Int(v) => DatabaseValue::Int64(v),
            KeyValue::Text(v) => DatabaseValue::String(v),
            KeyValue::Bytes(v) => DatabaseValue::Bytes(v),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Int(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        KeyValue::Int(value as i64)
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Text(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for KeyValue {
    fn from(value: Vec<u8>) -> Self {
        KeyValue::Bytes(value)
    }
}

impl From<&[u8]> for KeyValue {
    fn from(value: &[u8]) -> Self {
        KeyValue::Bytes(value.to_vec())
    }
}

/// Immutable composite key of shape `S`
pub struct HashKey<S: KeyShape> {
    values: Vec<Option<KeyValue>>,
    _shape: PhantomData<fn() -> S>,
}

impl<S: KeyShape> HashKey<S> {
    /// Key with every field unset
    pub fn empty() -> Self {
        Self {
            values: vec![None; S::FIELDS.len()],
            _shape: PhantomData,
        }
    }

    /// Build a key from `(field, value)` pairs
    ///
    /// Declared fields that are not named stay unset. A name outside the
    /// declared field set is rejected. Later pairs win over earlier ones.
    pub fn from_fields<I, K, V>(fields: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<KeyValue>,
    {
        let mut key = Self::empty();
        for (name, value) in fields {
            let name = name.as_ref();
            let index = S::field_index(name).ok_or_else(|| {
                ModelError::InvalidKeyInput(format!(
                    "'{}' is not a field of {} (expected one of {:?})",
                    name,
                    S::NAME,
                    S::FIELDS
                ))
            })?;
            key.values[index] = Some(value.into());
        }
        Ok(key)
    }

    /// Build a key positionally, one entry per declared field
    pub fn from_values(values: Vec<Option<KeyValue>>) -> ModelResult<Self> {
        if values.len() != S::FIELDS.len() {
            return Err(ModelError::InvalidKeyInput(format!(
                "{} takes {} values, got {}",
                S::NAME,
                S::FIELDS.len(),
                values.len()
            )));
        }
        Ok(Self {
            values,
            _shape: PhantomData,
        })
    }

    /// Key from one value per declared field, read in declared order
    pub(crate) fn from_shape_values<F>(mut value_of: F) -> Self
    where
        F: FnMut(&'static str) -> Option<KeyValue>,
    {
        Self {
            values: S::FIELDS.iter().map(|field| value_of(field)).collect(),
            _shape: PhantomData,
        }
    }

    /// Value of a declared field, `None` when unset or undeclared
    pub fn get(&self, name: &str) -> Option<&KeyValue> {
        S::field_index(name).and_then(|index| self.values[index].as_ref())
    }

    /// Field values in declared order
    pub fn values(&self) -> &[Option<KeyValue>] {
        &self.values
    }

    /// All declared fields with their values, unset included
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, Option<&KeyValue>)> + '_ {
        S::FIELDS
            .iter()
            .copied()
            .zip(self.values.iter().map(Option::as_ref))
    }

    /// Only the fields that carry a value
    pub fn set_fields(&self) -> impl Iterator<Item = (&'static str, &KeyValue)> + '_ {
        self.fields()
            .filter_map(|(name, value)| value.map(|value| (name, value)))
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Compare against a value of any type; false unless it is a key of the same shape
    pub fn eq_dyn(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<HashKey<S>>()
            .map_or(false, |other| self == other)
    }
}

impl<S: KeyShape> Clone for HashKey<S> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            _shape: PhantomData,
        }
    }
}

impl<S: KeyShape> PartialEq for HashKey<S> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<S: KeyShape> Eq for HashKey<S> {}

impl<S: KeyShape> Hash for HashKey<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl<S: KeyShape> Default for HashKey<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: KeyShape> fmt::Display for HashKey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {{", S::NAME)?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Some(value) => write!(f, "{}: {}", name, value)?,
                None => write!(f, "{}: <unset>", name)?,
            }
        }
        write!(f, "}}")
    }
}

impl<S: KeyShape> fmt::Debug for HashKey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", S::NAME)?;
        let mut map = f.debug_map();
        for (name, value) in self.fields() {
            map.entry(&name, &value);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::{HashMap, HashSet};

    struct AreaKey;

    impl KeyShape for AreaKey {
        const NAME: &'static str = "AreaKey";
        const FIELDS: &'static [&'static str] = &["radio", "mcc", "mnc", "lac"];
    }

    struct BlueKey;

    impl KeyShape for BlueKey {
        const NAME: &'static str = "BlueKey";
        const FIELDS: &'static [&'static str] = &["mac"];
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn area(mcc: i64, lac: i64) -> HashKey<AreaKey> {
        HashKey::from_fields([
            ("radio", KeyValue::from("gsm")),
            ("mcc", mcc.into()),
            ("lac", lac.into()),
        ])
        .unwrap()
    }

    #[test]
    fn test_fields_read_back() {
        let key = area(262, 5);
        assert_eq!(key.get("radio"), Some(&KeyValue::from("gsm")));
        assert_eq!(key.get("mcc"), Some(&KeyValue::Int(262)));
        assert_eq!(key.get("mnc"), None);
        assert_eq!(key.get("lac"), Some(&KeyValue::Int(5)));
        assert_eq!(key.values().len(), 4);
        assert_eq!(
            key.set_fields().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["radio", "mcc", "lac"]
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = HashKey::<AreaKey>::from_fields([("cid", 1i64)]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidKeyInput(ref msg) if msg.contains("cid")));
    }

    #[test]
    fn test_from_values_checks_arity() {
        assert!(HashKey::<BlueKey>::from_values(vec![Some("ab".into())]).is_ok());
        assert!(HashKey::<BlueKey>::from_values(vec![None, None]).is_err());
    }

    #[test]
    fn test_from_shape_values_follows_declared_order() {
        let mut asked = Vec::new();
        let key = HashKey::<AreaKey>::from_shape_values(|field| {
            asked.push(field);
            (field != "mnc").then(|| KeyValue::from(field))
        });

        assert_eq!(asked, AreaKey::FIELDS);
        assert_eq!(key.values().len(), 4);
        assert_eq!(key.get("lac"), Some(&KeyValue::from("lac")));
        assert_eq!(key.get("mnc"), None);
        assert!(!key.is_empty());
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let a = area(262, 5);
        let b = area(262, 5);
        let c = area(262, 6);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);

        // unset fields take part in equality
        let partial = HashKey::<AreaKey>::from_fields([("radio", "gsm")]).unwrap();
        assert_ne!(partial, a);
        assert_eq!(HashKey::<AreaKey>::empty(), HashKey::<AreaKey>::default());

        let set: HashSet<_> = vec![a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);

        let mut counts = HashMap::new();
        *counts.entry(a.clone()).or_insert(0) += 1;
        *counts.entry(area(262, 5)).or_insert(0) += 1;
        assert_eq!(counts[&a], 2);
    }

    #[test]
    fn test_cross_kind_comparison_is_false() {
        let area_key = area(262, 5);
        let blue_key = HashKey::<BlueKey>::from_fields([("mac", "3680f4f0f9e1")]).unwrap();

        assert!(area_key.eq_dyn(&area(262, 5)));
        assert!(!area_key.eq_dyn(&blue_key));
        assert!(!area_key.eq_dyn(&"gsm"));
        assert!(!HashKey::<BlueKey>::empty().eq_dyn(&HashKey::<AreaKey>::empty()));
    }

    #[test]
    fn test_render() {
        let key = area(262, 5);
        assert_eq!(
            key.to_string(),
            "AreaKey: {radio: \"gsm\", mcc: 262, mnc: <unset>, lac: 5}"
        );
        assert!(format!("{:?}", key).starts_with("AreaKey {"));

        let blue = HashKey::<BlueKey>::from_fields([("mac", vec![0x36u8, 0x80])]).unwrap();
        assert_eq!(blue.to_string(), "BlueKey: {mac: 0x3680}");
    }
}
