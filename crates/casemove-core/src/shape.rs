//! # Shape Helpers
//!
//! Lenient readers over untyped JSON objects.
//!
//! Persisted state and action payloads arrive as `serde_json::Value`.
//! Every typed slice is built from one of those values through these
//! helpers, which never fail and never lose data: a container field is
//! accepted when it has the right container kind, and whatever it holds is
//! kept verbatim. Only a missing or wrong-kinded container is replaced.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  raw field           seq()          object_field()   field()         │
//! │  ─────────────────   ────────────   ──────────────   ─────────────   │
//! │  [1, "a"]            Some([1,"a"])  None             Some(raw)       │
//! │  {"a": 1}            None           Some(raw)        Some(raw)       │
//! │  null                None           None             Some(null)      │
//! │  missing             None           None             None            │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

// =============================================================================
// Lenient
// =============================================================================

/// A JSON value kept exactly as stored, read as `T` on demand.
///
/// Serializing writes the stored JSON back unchanged, so a value that does
/// not decode as `T` survives a load/save cycle instead of being dropped
/// or replaced.
///
/// ```rust
/// use casemove_core::shape::Lenient;
/// use serde_json::json;
///
/// let theme: Lenient<String> = Lenient::from_value(json!("light"));
/// assert_eq!(theme.get(), Some("light".to_string()));
///
/// let odd: Lenient<String> = Lenient::from_value(json!(5));
/// assert_eq!(odd.get(), None);
/// assert_eq!(serde_json::to_value(&odd).unwrap(), json!(5));
/// ```
pub struct Lenient<T> {
    raw: Value,
    _type: PhantomData<fn() -> T>,
}

impl<T> Lenient<T> {
    pub fn from_value(raw: Value) -> Self {
        Lenient {
            raw,
            _type: PhantomData,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        self.raw
    }
}

impl<T: Serialize> Lenient<T> {
    /// Stores a typed value.
    pub fn new(value: T) -> Self {
        Self::from_value(serde_json::to_value(value).unwrap_or(Value::Null))
    }
}

impl<T: DeserializeOwned> Lenient<T> {
    /// Decodes the stored JSON, `None` if it is not a `T`.
    pub fn get(&self) -> Option<T> {
        T::deserialize(&self.raw).ok()
    }

    /// Decodes the stored JSON, falling back to `default`.
    pub fn get_or(&self, default: T) -> T {
        self.get().unwrap_or(default)
    }
}

impl Lenient<String> {
    pub fn as_str(&self) -> Option<&str> {
        self.raw.as_str()
    }
}

impl<T> Clone for Lenient<T> {
    fn clone(&self) -> Self {
        Self::from_value(self.raw.clone())
    }
}

impl<T> PartialEq for Lenient<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> fmt::Debug for Lenient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.raw, f)
    }
}

impl<T> From<Value> for Lenient<T> {
    fn from(raw: Value) -> Self {
        Self::from_value(raw)
    }
}

impl<T> Serialize for Lenient<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl PartialEq<str> for Lenient<String> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Lenient<String> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<bool> for Lenient<bool> {
    fn eq(&self, other: &bool) -> bool {
        self.raw.as_bool() == Some(*other)
    }
}

impl PartialEq<f64> for Lenient<f64> {
    fn eq(&self, other: &f64) -> bool {
        self.raw.as_f64() == Some(*other)
    }
}

// =============================================================================
// Readers
// =============================================================================

/// Returns true for a JSON object (arrays and `null` are not objects).
#[inline]
pub fn is_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

/// Borrows the object behind `value`, or an empty map for anything else.
pub fn object_or_empty(value: &Value) -> &Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    match value {
        Value::Object(map) => map,
        _ => EMPTY.get_or_init(Map::new),
    }
}

/// Reads a scalar field as stored, `null` included. `None` only when absent.
pub fn field<T>(obj: &Map<String, Value>, key: &str) -> Option<Lenient<T>> {
    obj.get(key).cloned().map(Lenient::from_value)
}

/// Reads an object-typed field. `None` unless the field is an object.
pub fn object_field<T>(obj: &Map<String, Value>, key: &str) -> Option<Lenient<T>> {
    match obj.get(key) {
        Some(value @ Value::Object(_)) => Some(Lenient::from_value(value.clone())),
        _ => None,
    }
}

/// Reads `key` as a sequence.
///
/// Returns `None` unless the field is an actual array. Every element is
/// kept, whatever its shape.
pub fn seq<T: From<Value>>(obj: &Map<String, Value>, key: &str) -> Option<Vec<T>> {
    match obj.get(key) {
        Some(Value::Array(items)) => Some(items.iter().cloned().map(T::from).collect()),
        _ => None,
    }
}

/// Reads `key` as a keyed mapping, kept untyped.
pub fn mapping(obj: &Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    match obj.get(key) {
        Some(Value::Object(map)) => Some(map.clone()),
        _ => None,
    }
}

/// Copies every field of `obj` not listed in `known`.
///
/// Used to carry fields this version doesn't know about through a
/// normalize/serialize cycle untouched.
pub fn extra(obj: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Identifier as a string: strings as-is, numbers in decimal form.
///
/// `"27348"` and `27348` name the same item.
pub fn id_key(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Removes `value` from `set` if present, appends it otherwise.
pub fn toggle<T: PartialEq>(set: &mut Vec<T>, value: T) {
    match set.iter().position(|existing| *existing == value) {
        Some(index) => {
            set.remove(index);
        }
        None => set.push(value),
    }
}

/// Serde helper for identifiers in action payloads: accepts a string or a
/// number, anything else decodes as an empty string.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_key(Some(&value)).unwrap_or_default())
}

/// Implements `From<serde_json::Value>` for a type that implements
/// [`crate::state::Normalize`], so `#[serde(from = "Value")]` can route
/// deserialization through the normalizer.
macro_rules! normalize_from_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<serde_json::Value> for $ty {
                fn from(value: serde_json::Value) -> Self {
                    <$ty as $crate::state::Normalize>::normalize(&value)
                }
            }
        )+
    };
}

pub(crate) use normalize_from_value;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seq_requires_array() {
        let obj = json!({ "a": [1, 2], "b": null, "c": "x" });
        let obj = obj.as_object().unwrap();
        assert_eq!(seq::<Value>(obj, "a"), Some(vec![json!(1), json!(2)]));
        assert_eq!(seq::<Value>(obj, "b"), None);
        assert_eq!(seq::<Value>(obj, "c"), None);
        assert_eq!(seq::<Value>(obj, "missing"), None);
    }

    #[test]
    fn test_seq_keeps_odd_elements() {
        let obj = json!({ "cols": ["Price", null, 3, "Storage"] });
        let cols = seq::<Lenient<String>>(obj.as_object().unwrap(), "cols").unwrap();
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0], "Price");
        assert_eq!(cols[2].get(), None);
        assert_eq!(serde_json::to_value(&cols).unwrap(), obj["cols"]);
    }

    #[test]
    fn test_field_keeps_wrong_type() {
        let obj = json!({ "theme": 5, "locale": "EN-GB", "os": null });
        let obj = obj.as_object().unwrap();
        let theme = field::<String>(obj, "theme").unwrap();
        assert_eq!(theme.get(), None);
        assert_eq!(theme.as_value(), &json!(5));
        assert_eq!(field::<String>(obj, "locale").unwrap(), "EN-GB");
        assert_eq!(field::<String>(obj, "os").unwrap().as_value(), &Value::Null);
        assert!(field::<String>(obj, "missing").is_none());
    }

    #[test]
    fn test_integer_stays_integer() {
        let min: Lenient<f64> = Lenient::from_value(json!(0));
        assert_eq!(min.get(), Some(0.0));
        assert_eq!(min, 0.0);
        assert_eq!(serde_json::to_value(&min).unwrap().to_string(), "0");
    }

    #[test]
    fn test_object_field_requires_object() {
        let obj = json!({ "source": { "title": "buff163", "x": 1 }, "overview": [] });
        let obj = obj.as_object().unwrap();
        let source = object_field::<Value>(obj, "source").unwrap();
        assert_eq!(source.as_value()["x"], json!(1));
        assert!(object_field::<Value>(obj, "overview").is_none());
    }

    #[test]
    fn test_extra_keeps_unknown_fields() {
        let obj = json!({ "columns": [], "future": { "x": 1 } });
        let rest = extra(obj.as_object().unwrap(), &["columns"]);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest["future"], json!({ "x": 1 }));
    }

    #[test]
    fn test_id_key() {
        assert_eq!(id_key(Some(&json!(27348))), Some("27348".to_string()));
        assert_eq!(id_key(Some(&json!("a-1"))), Some("a-1".to_string()));
        assert_eq!(id_key(Some(&json!(null))), None);
        assert_eq!(id_key(None), None);
    }

    #[test]
    fn test_toggle() {
        let mut set = vec![json!("a"), json!(1)];
        toggle(&mut set, json!(1));
        toggle(&mut set, json!("b"));
        assert_eq!(set, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_object_or_empty() {
        assert!(object_or_empty(&json!(null)).is_empty());
        assert!(object_or_empty(&json!([1])).is_empty());
        assert_eq!(object_or_empty(&json!({ "a": 1 })).len(), 1);
    }
}
