//! Ordered JSON objects used for token header and payload.

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

use core::{fmt, slice};

/// Top-level JSON object of a token header or payload.
///
/// Unlike [`serde_json::Map`], `Fields` keeps entries in the exact order they were encountered
/// and does not merge duplicate keys. This allows re-encoding a parsed header or payload
/// into the same bytes, which matters because the token signature covers the encoded bytes.
/// Nested objects preserve key order as well (via the `preserve_order` feature of `serde_json`).
///
/// # Examples
///
/// ```
/// # use jwt_verifier::Fields;
/// # use serde_json::json;
/// let mut fields = Fields::from_slice(br#"{"sub":"alice","admin":true}"#)?;
/// assert_eq!(fields.get("sub"), Some(&json!("alice")));
/// fields.set("exp", 1_700_000_000);
/// assert_eq!(fields.to_string(), r#"{"sub":"alice","admin":true,"exp":1700000000}"#);
/// # Ok::<_, serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    /// Creates an empty object.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses an object from UTF-8 encoded JSON. Fails if the JSON value is not an object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serializes this object to compact JSON.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Returns the value of the first field with the specified name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(name, _)| name == key).map(|(_, value)| value)
    }

    /// Returns the number of fields with the specified name.
    pub fn count(&self, key: &str) -> usize {
        self.0.iter().filter(|(name, _)| name == key).count()
    }

    /// Sets a field. If a field with the same name is present, its first occurrence is replaced
    /// in place; otherwise, the field is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some((_, existing)) = self.0.iter_mut().find(|(name, _)| *name == key) {
            *existing = value;
        } else {
            self.0.push((key, value));
        }
    }

    /// Sets a field and returns the modified object.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Appends a field without checking for duplicates.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.push((key.into(), value.into()));
    }

    /// Sets a field so that it occurs exactly once: the first occurrence is replaced in place
    /// and the others are removed. If the field is absent, it is inserted at the start.
    pub(crate) fn set_unique(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.0.iter().position(|(name, _)| name == key) {
            Some(idx) => {
                self.0[idx].1 = value;
                let mut current_idx = 0;
                self.0.retain(|(name, _)| {
                    let keep = current_idx <= idx || name != key;
                    current_idx += 1;
                    keep
                });
            }
            None => self.0.insert(0, (key.to_owned(), value)),
        }
    }

    /// Iterates over fields in their order.
    pub fn iter(&self) -> slice::Iter<'_, (String, Value)> {
        self.0.iter()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether this object has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        formatter.write_str(&json)
    }
}

impl From<Vec<(String, Value)>> for Fields {
    fn from(fields: Vec<(String, Value)>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a (String, Value);
    type IntoIter = slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    fields.push((key, value));
                }
                Ok(Fields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}
