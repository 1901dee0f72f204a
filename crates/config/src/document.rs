//! Shape-guided YAML decoding
//!
//! Read without a target type, plain scalars such as `12345` or `1.10`
//! resolve to numbers and lose their text. Decoding against the shape of the
//! current settings value reads a scalar as text wherever that value holds a
//! string, so string fields receive exactly what the document says.

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_yaml::{Mapping, Number, Value};
use std::fmt;
use std::mem;

/// Decode `contents`, reading scalars as text wherever `shape` holds a string
pub(crate) fn decode(contents: &str, shape: &Value) -> Result<Value, serde_yaml::Error> {
    Shaped(Some(shape)).deserialize(serde_yaml::Deserializer::from_str(contents))
}

/// Lay `document` over `base`: mappings merge key by key, anything else
/// replaces the base value.
pub(crate) fn overlay(base: Value, document: Value) -> Value {
    match (base, document) {
        (Value::Mapping(mut base), Value::Mapping(document)) => {
            for (key, value) in document {
                match base.get_mut(&key) {
                    Some(current) => {
                        let taken = mem::replace(current, Value::Null);
                        *current = overlay(taken, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Mapping(base)
        }
        (_, document) => document,
    }
}

struct Shaped<'a>(Option<&'a Value>);

impl<'de> DeserializeSeed<'de> for Shaped<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        match self.0 {
            Some(Value::String(_)) => deserializer.deserialize_str(TextVisitor),
            shape => deserializer.deserialize_any(ShapedVisitor(shape)),
        }
    }
}

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML scalar")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }
}

struct ShapedVisitor<'a>(Option<&'a Value>);

impl<'de> Visitor<'de> for ShapedVisitor<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Shaped(self.0).deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let items = self.0.and_then(Value::as_sequence);
        let mut values = Vec::new();
        // Elements past the current length take the first element's shape
        while let Some(value) = seq.next_element_seed(Shaped(
            items.and_then(|items| items.get(values.len()).or_else(|| items.first())),
        ))? {
            values.push(value);
        }
        Ok(Value::Sequence(values))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut mapping = Mapping::new();
        while let Some(key) = map.next_key::<Value>()? {
            let shape = self.0.and_then(|shape| shape.get(&key));
            let value = map.next_value_seed(Shaped(shape))?;
            mapping.insert(key, value);
        }
        Ok(Value::Mapping(mapping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_string_fields_keep_scalar_text() {
        let current = shape("name: ''\nversion: ''\nport: 0\n");
        let document = decode("name: 12345\nversion: 1.10\nport: 8080\n", &current).unwrap();

        assert_eq!(document["name"], Value::String("12345".to_string()));
        assert_eq!(document["version"], Value::String("1.10".to_string()));
        assert_eq!(document["port"], Value::Number(Number::from(8080u64)));
    }

    #[test]
    fn test_nested_and_sequence_shapes() {
        let current = shape("database:\n  password: ''\ntags: ['a']\n");
        let document = decode("database:\n  password: 007\ntags: [1, true]\n", &current).unwrap();

        assert_eq!(document["database"]["password"], Value::String("007".to_string()));
        assert_eq!(document["tags"][0], Value::String("1".to_string()));
        assert_eq!(document["tags"][1], Value::String("true".to_string()));
    }

    #[test]
    fn test_unknown_keys_decode_untyped() {
        let current = shape("name: ''\n");
        let document = decode("extra: 42\n", &current).unwrap();
        assert_eq!(document["extra"], Value::Number(Number::from(42u64)));
    }

    #[test]
    fn test_overlay_merges_mappings() {
        let base = shape("name: base\ndatabase:\n  host: localhost\n  port: 5432\n");
        let merged = overlay(base, shape("database:\n  port: 6543\n"));

        assert_eq!(merged["name"], Value::String("base".to_string()));
        assert_eq!(merged["database"]["host"], Value::String("localhost".to_string()));
        assert_eq!(merged["database"]["port"], Value::Number(Number::from(6543u64)));
    }

    #[test]
    fn test_overlay_replaces_non_mappings() {
        let merged = overlay(shape("tags: [a, b]\n"), shape("tags: [c]\n"));
        assert_eq!(merged["tags"], shape("[c]\n"));
    }
}
