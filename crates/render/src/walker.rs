//! Field walker
//!
//! Walks any `Serialize` value through a dedicated serializer and produces
//! an ordered tree of fields. Structs and string-keyed maps become records,
//! secret-marked values become [`FieldValue::Masked`] without their inner
//! value ever being visited.

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;
use types::secret::{SECRET_MARKER, SENSITIVE_DATA_MASK};
use types::RenderError;

/// A walked value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// Secret value, never inspected
    Masked,
    List(Vec<FieldValue>),
    /// Named fields in declaration order
    Record(Vec<(String, FieldValue)>),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) | FieldValue::UInt(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Str(_) => "string",
            FieldValue::Masked => "secret",
            FieldValue::List(_) => "sequence",
            FieldValue::Record(_) => "record",
        }
    }

    /// Table cell text
    pub fn display(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(v) => v.to_string(),
            FieldValue::Int(v) => v.to_string(),
            FieldValue::UInt(v) => v.to_string(),
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Str(v) => v.clone(),
            FieldValue::Masked => SENSITIVE_DATA_MASK.to_string(),
            FieldValue::List(_) | FieldValue::Record(_) => self.to_json().to_string(),
        }
    }

    /// JSON value with native types kept and secrets masked
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(v) => Value::Bool(*v),
            FieldValue::Int(v) => Value::from(*v),
            FieldValue::UInt(v) => Value::from(*v),
            FieldValue::Float(v) => Number::from_f64(*v).map(Value::Number).unwrap_or(Value::Null),
            FieldValue::Str(v) => Value::String(v.clone()),
            FieldValue::Masked => Value::String(SENSITIVE_DATA_MASK.to_string()),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Record(fields) => {
                let mut map = Map::new();
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

/// One row of the flattened view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    /// Dot-joined path from the root, e.g. `Database.Host`
    pub name: String,
    pub value: String,
    pub masked: bool,
}

/// Borrowed, printable view of a settings value
pub struct Snapshot<'a> {
    walk: Box<dyn Fn() -> Result<FieldValue, WalkError> + 'a>,
}

impl<'a> Snapshot<'a> {
    pub fn of<T>(value: &'a T) -> Self
    where
        T: Serialize + ?Sized,
    {
        Snapshot {
            walk: Box::new(move || value.serialize(ValueSerializer)),
        }
    }

    /// Top-level fields of the value. Fails unless the value is record-shaped.
    pub fn fields(&self) -> Result<Vec<(String, FieldValue)>, RenderError> {
        match (self.walk)()? {
            FieldValue::Record(fields) => Ok(fields),
            other => Err(RenderError::NotARecord { found: other.kind() }),
        }
    }

    /// Flattened rows in declaration order
    pub fn records(&self) -> Result<Vec<FieldRecord>, RenderError> {
        let fields = self.fields()?;
        let mut records = Vec::with_capacity(fields.len());
        flatten("", &fields, &mut records);
        Ok(records)
    }

    /// Nested JSON object
    pub fn to_json(&self) -> Result<Value, RenderError> {
        Ok(FieldValue::Record(self.fields()?).to_json())
    }
}

impl fmt::Debug for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot").finish_non_exhaustive()
    }
}

/// Flatten `value` into table rows
pub fn walk<T: Serialize + ?Sized>(value: &T) -> Result<Vec<FieldRecord>, RenderError> {
    Snapshot::of(value).records()
}

/// Convert `value` into a nested JSON object with secrets masked
pub fn walk_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, RenderError> {
    Snapshot::of(value).to_json()
}

fn flatten(prefix: &str, fields: &[(String, FieldValue)], out: &mut Vec<FieldRecord>) {
    for (name, value) in fields {
        let name = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        match value {
            FieldValue::Record(nested) => flatten(&name, nested, out),
            FieldValue::Masked => out.push(FieldRecord {
                name,
                value: SENSITIVE_DATA_MASK.to_string(),
                masked: true,
            }),
            other => out.push(FieldRecord {
                name,
                value: other.display(),
                masked: false,
            }),
        }
    }
}

/// Error raised by a value's `Serialize` impl during a walk
#[derive(Debug, Error)]
#[error("{0}")]
pub struct WalkError(String);

impl ser::Error for WalkError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        WalkError(msg.to_string())
    }
}

impl From<WalkError> for RenderError {
    fn from(err: WalkError) -> Self {
        RenderError::Walk(err.0)
    }
}

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = FieldValue;
    type Error = WalkError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = VariantRecordBuilder;

    fn serialize_bool(self, v: bool) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Int(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Int(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Int(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<FieldValue, WalkError> {
        Ok(i64::try_from(v)
            .map(FieldValue::Int)
            .unwrap_or_else(|_| FieldValue::Str(v.to_string())))
    }

    fn serialize_u8(self, v: u8) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::UInt(u64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::UInt(u64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::UInt(u64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::UInt(v))
    }

    fn serialize_u128(self, v: u128) -> Result<FieldValue, WalkError> {
        Ok(u64::try_from(v)
            .map(FieldValue::UInt)
            .unwrap_or_else(|_| FieldValue::Str(v.to_string())))
    }

    fn serialize_f32(self, v: f32) -> Result<FieldValue, WalkError> {
        // Go through the shortest f32 text so 0.1f32 prints as 0.1
        let widened = v.to_string().parse::<f64>().unwrap_or(f64::from(v));
        Ok(FieldValue::Float(widened))
    }

    fn serialize_f64(self, v: f64) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::List(
            v.iter().map(|b| FieldValue::UInt(u64::from(*b))).collect(),
        ))
    }

    fn serialize_none(self) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<FieldValue, WalkError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Str(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<FieldValue, WalkError>
    where
        T: ?Sized + Serialize,
    {
        if name == SECRET_MARKER {
            return Ok(FieldValue::Masked);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<FieldValue, WalkError>
    where
        T: ?Sized + Serialize,
    {
        Ok(FieldValue::Record(vec![(
            variant.to_string(),
            value.serialize(ValueSerializer)?,
        )]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, WalkError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, WalkError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder, WalkError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder, WalkError> {
        Ok(VariantSeqBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, WalkError> {
        Ok(MapBuilder {
            fields: Vec::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<RecordBuilder, WalkError> {
        Ok(RecordBuilder {
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantRecordBuilder, WalkError> {
        Ok(VariantRecordBuilder {
            variant,
            fields: Vec::with_capacity(len),
        })
    }
}

struct SeqBuilder {
    items: Vec<FieldValue>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = FieldValue;
    type Error = WalkError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), WalkError>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::List(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = FieldValue;
    type Error = WalkError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), WalkError>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<FieldValue, WalkError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = FieldValue;
    type Error = WalkError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), WalkError>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<FieldValue, WalkError> {
        ser::SerializeSeq::end(self)
    }
}

struct VariantSeqBuilder {
    variant: &'static str,
    items: Vec<FieldValue>,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = FieldValue;
    type Error = WalkError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), WalkError>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Record(vec![(
            self.variant.to_string(),
            FieldValue::List(self.items),
        )]))
    }
}

struct MapBuilder {
    fields: Vec<(String, FieldValue)>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = FieldValue;
    type Error = WalkError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), WalkError>
    where
        T: ?Sized + Serialize,
    {
        let key = match key.serialize(ValueSerializer)? {
            FieldValue::Str(s) => s,
            FieldValue::Int(v) => v.to_string(),
            FieldValue::UInt(v) => v.to_string(),
            FieldValue::Bool(v) => v.to_string(),
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Masked => SENSITIVE_DATA_MASK.to_string(),
            other => {
                return Err(WalkError(format!(
                    "map key must be a string, found {}",
                    other.kind()
                )))
            }
        };
        self.next_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), WalkError>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| WalkError("map value serialized before its key".to_string()))?;
        self.fields.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Record(self.fields))
    }
}

struct RecordBuilder {
    fields: Vec<(String, FieldValue)>,
}

impl ser::SerializeStruct for RecordBuilder {
    type Ok = FieldValue;
    type Error = WalkError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), WalkError>
    where
        T: ?Sized + Serialize,
    {
        self.fields
            .push((key.to_string(), value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Record(self.fields))
    }
}

struct VariantRecordBuilder {
    variant: &'static str,
    fields: Vec<(String, FieldValue)>,
}

impl ser::SerializeStructVariant for VariantRecordBuilder {
    type Ok = FieldValue;
    type Error = WalkError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), WalkError>
    where
        T: ?Sized + Serialize,
    {
        self.fields
            .push((key.to_string(), value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<FieldValue, WalkError> {
        Ok(FieldValue::Record(vec![(
            self.variant.to_string(),
            FieldValue::Record(self.fields),
        )]))
    }
}
