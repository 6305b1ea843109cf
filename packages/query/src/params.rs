use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// A single query parameter value.
///
/// Scalars (numbers, booleans) are stringified on conversion, the same way
/// they would be written into a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// All values in order. A single value is a one-element slice.
    pub fn values(&self) -> &[String] {
        match self {
            ParamValue::Single(value) => std::slice::from_ref(value),
            ParamValue::List(values) => values,
        }
    }

    /// Append a value, promoting a single value to a list.
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self {
            ParamValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = ParamValue::List(vec![first, value]);
            }
            ParamValue::List(values) => values.push(value),
        }
    }

    fn from_json(key: &str, value: &Value) -> Result<Option<Self>, Error> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match scalar_to_string(item) {
                        Some(s) => values.push(s),
                        None if item.is_null() => {}
                        None => {
                            return Err(Error::UnsupportedValue {
                                key: key.to_string(),
                                kind: json_kind(item),
                            })
                        }
                    }
                }
                Ok(Some(ParamValue::List(values)))
            }
            other => scalar_to_string(other)
                .map(|s| Some(ParamValue::Single(s)))
                .ok_or_else(|| Error::UnsupportedValue {
                    key: key.to_string(),
                    kind: json_kind(other),
                }),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

macro_rules! scalar_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Single(value.to_string())
                }
            }
        )*
    };
}

scalar_param!(&str, String, &String, bool, char, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl<T: ToString> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        ParamValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        ParamValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Insertion-ordered query parameters.
///
/// Inserting an existing key replaces its value in place, keeping the
/// key's original position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, ParamValue)>", into = "Vec<(String, ParamValue)>")]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// An empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from any serializable map or struct.
    ///
    /// `null` fields are skipped; arrays become repeated values. Nested
    /// objects are rejected.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Self::from_json(serde_json::to_value(value)?)
    }

    /// Build parameters from a JSON object.
    pub fn from_json(value: Value) -> Result<Self, Error> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(Error::NotAnObject {
                    kind: json_kind(&other),
                })
            }
        };

        let mut params = Params::new();
        for (key, value) in &object {
            if let Some(value) = ParamValue::from_json(key, value)? {
                params.insert(key.clone(), value);
            }
        }
        Ok(params)
    }

    /// Builder form of [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a parameter, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Append a value under `key`, turning an existing entry into a list.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, ParamValue::Single(value.into()))),
        }
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove `key`, returning its value. Later keys keep their order.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Check whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Key-wise union of `self` and `other`; `other` wins per key.
    ///
    /// Keys only present in `self` keep their position, keys new in `other`
    /// are appended in `other`'s order.
    pub fn merge(&self, other: &Params) -> Params {
        let mut merged = self.clone();
        for (key, value) in &other.entries {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl From<Vec<(String, ParamValue)>> for Params {
    fn from(entries: Vec<(String, ParamValue)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<Params> for Vec<(String, ParamValue)> {
    fn from(params: Params) -> Self {
        params.entries
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<ParamValue>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
