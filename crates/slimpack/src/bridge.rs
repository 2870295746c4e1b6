//! Glue between serde and the closed value set.
//!
//! [`to_value`] turns any `Serialize` type whose shape fits the closed set
//! into a [`Value`]. Notes on how translations occur:
//!
//! - all signed integer widths become `Int`, all unsigned widths `UInt`
//! - `f32` stays `Float32` and `f64` stays `Float64`
//! - unit and `None` become `Nil`; `Some(v)` becomes `v`
//! - sequences and tuples become `Array`
//! - maps become `Map` when every key serializes to a string
//! - newtype structs are transparent
//!
//! Structs, enums, byte strings, `char` and 128-bit integers have no place in
//! the closed set. Converting them fails with [`ConvertError::Unsupported`],
//! which the [`Encoder`](crate::Encoder) answers by handing the original
//! value to its [`FallbackEncoder`].

use std::fmt::Display;

use serde::ser::{
    Impossible, Serialize, SerializeMap, SerializeSeq, SerializeTuple, SerializeTupleStruct,
    Serializer,
};

use crate::error::ConvertError;
use crate::model::{Map, Value};

/// Encodes values the closed set cannot represent.
///
/// Implementations produce a complete MessagePack encoding of `value`, or
/// fail. The returned bytes are copied verbatim into the output buffer.
pub trait FallbackEncoder {
    type Error: Display;

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Self::Error>;
}

impl<F: FallbackEncoder + ?Sized> FallbackEncoder for &F {
    type Error = F::Error;

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Self::Error> {
        (**self).marshal(value)
    }
}

/// Fallback that rejects everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFallback;

impl FallbackEncoder for NoFallback {
    type Error = &'static str;

    fn marshal<T: Serialize + ?Sized>(&self, _value: &T) -> Result<Vec<u8>, Self::Error> {
        Err("no fallback encoder configured")
    }
}

/// Converts a serializable value into the closed value set.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, ConvertError> {
    value.serialize(ValueSerializer)
}

impl serde::ser::Error for ConvertError {
    fn custom<T: Display>(msg: T) -> Self {
        ConvertError::Custom(msg.to_string())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::UInt(v) => serializer.serialize_u64(*v),
            Value::Float32(v) => serializer.serialize_f32(*v),
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

fn unsupported<T>(kind: &'static str) -> Result<T, ConvertError> {
    Err(ConvertError::Unsupported { kind })
}

/// Serializer producing a [`Value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = ConvertError;
    type SerializeSeq = SerializeArray;
    type SerializeTuple = SerializeArray;
    type SerializeTupleStruct = SerializeArray;
    type SerializeTupleVariant = Impossible<Value, ConvertError>;
    type SerializeMap = SerializeValueMap;
    type SerializeStruct = Impossible<Value, ConvertError>;
    type SerializeStructVariant = Impossible<Value, ConvertError>;

    fn serialize_bool(self, v: bool) -> Result<Value, ConvertError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, ConvertError> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, ConvertError> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, ConvertError> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, ConvertError> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, _v: i128) -> Result<Value, ConvertError> {
        unsupported("i128")
    }

    fn serialize_u8(self, v: u8) -> Result<Value, ConvertError> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, ConvertError> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, ConvertError> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, ConvertError> {
        Ok(Value::UInt(v))
    }

    fn serialize_u128(self, _v: u128) -> Result<Value, ConvertError> {
        unsupported("u128")
    }

    fn serialize_f32(self, v: f32) -> Result<Value, ConvertError> {
        Ok(Value::Float32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, ConvertError> {
        Ok(Value::Float64(v))
    }

    fn serialize_char(self, _v: char) -> Result<Value, ConvertError> {
        unsupported("char")
    }

    fn serialize_str(self, v: &str) -> Result<Value, ConvertError> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Value, ConvertError> {
        unsupported("bytes")
    }

    fn serialize_none(self) -> Result<Value, ConvertError> {
        Ok(Value::Nil)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, ConvertError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, ConvertError> {
        Ok(Value::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, ConvertError> {
        unsupported("unit struct")
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Value, ConvertError> {
        unsupported("enum")
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, ConvertError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Value, ConvertError> {
        unsupported("enum")
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeArray, ConvertError> {
        Ok(SerializeArray {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeArray, ConvertError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeArray, ConvertError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, ConvertError> {
        unsupported("enum")
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeValueMap, ConvertError> {
        Ok(SerializeValueMap {
            map: Map::with_capacity_and_hasher(len.unwrap_or(0), Default::default()),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, ConvertError> {
        unsupported("struct")
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, ConvertError> {
        unsupported("enum")
    }
}

/// Collects sequence and tuple elements.
#[derive(Debug)]
pub struct SerializeArray {
    items: Vec<Value>,
}

impl SerializeSeq for SerializeArray {
    type Ok = Value;
    type Error = ConvertError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ConvertError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, ConvertError> {
        Ok(Value::Array(self.items))
    }
}

impl SerializeTuple for SerializeArray {
    type Ok = Value;
    type Error = ConvertError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ConvertError> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, ConvertError> {
        SerializeSeq::end(self)
    }
}

impl SerializeTupleStruct for SerializeArray {
    type Ok = Value;
    type Error = ConvertError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ConvertError> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, ConvertError> {
        SerializeSeq::end(self)
    }
}

/// Collects string-keyed map entries.
#[derive(Debug)]
pub struct SerializeValueMap {
    map: Map,
    next_key: Option<String>,
}

impl SerializeMap for SerializeValueMap {
    type Ok = Value;
    type Error = ConvertError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), ConvertError> {
        match key.serialize(ValueSerializer)? {
            Value::String(s) => {
                self.next_key = Some(s);
                Ok(())
            }
            _ => unsupported("non-string map key"),
        }
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ConvertError> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| ConvertError::Custom("map value without a key".to_string()))?;
        self.map.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, ConvertError> {
        Ok(Value::Map(self.map))
    }
}
