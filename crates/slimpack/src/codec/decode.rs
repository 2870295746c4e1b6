//! Value decoding.
//!
//! Reads one tagged value at a cursor, recursing into arrays and maps. Every
//! declared length is checked against the remaining input before anything is
//! allocated, so truncated or hostile input yields an error instead of a
//! fault or an oversized allocation.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use crate::codec::primitives::Reader;
use crate::error::DecodeError;
use crate::limits::MAX_DEPTH;
use crate::model::{Map, Marker, Value};
use crate::pool::{ArrayPool, Pooled};

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum container nesting depth.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Decodes one value starting at `offset`.
///
/// Returns the offset just past the value together with the value.
pub fn decode(buf: &[u8], offset: usize) -> Result<(usize, Value), DecodeError> {
    decode_with_options(buf, offset, DecodeOptions::default())
}

/// Decodes one value starting at `offset` with the given options.
pub fn decode_with_options(
    buf: &[u8],
    offset: usize,
    options: DecodeOptions,
) -> Result<(usize, Value), DecodeError> {
    let mut reader = Reader::at(buf, offset)?;
    let value = decode_value(&mut reader, &options, None, 0)?;
    Ok((reader.position(), value))
}

/// Decodes a buffer holding exactly one value.
pub fn from_slice(buf: &[u8]) -> Result<Value, DecodeError> {
    let (consumed, value) = decode(buf, 0)?;
    if consumed != buf.len() {
        return Err(DecodeError::TrailingBytes {
            consumed,
            len: buf.len(),
        });
    }
    Ok(value)
}

// =============================================================================
// DECODER
// =============================================================================

/// Decoder with options and an optional shared array pool.
///
/// ```rust
/// use std::sync::Arc;
/// use slimpack::{ArrayPool, Decoder, Value};
///
/// let decoder = Decoder::new().with_pool(Arc::new(ArrayPool::default()));
/// let (end, value) = decoder.decode_pooled(&[0x92, 0x01, 0xc3], 0).unwrap();
/// assert_eq!(end, 3);
/// assert_eq!(*value, Value::Array(vec![Value::Int(1), Value::Bool(true)]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecodeOptions,
    pool: Option<Arc<ArrayPool>>,
}

impl Decoder {
    /// Creates a decoder with default options and no pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the decoding options.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Draws small arrays from `pool`.
    pub fn with_pool(mut self, pool: Arc<ArrayPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Returns the decoding options.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Returns the pool, if one is installed.
    pub fn pool(&self) -> Option<&Arc<ArrayPool>> {
        self.pool.as_ref()
    }

    /// Decodes one value starting at `offset`.
    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(usize, Value), DecodeError> {
        let mut reader = Reader::at(buf, offset)?;
        let value = decode_value(&mut reader, &self.options, self.pool.as_deref(), 0)?;
        Ok((reader.position(), value))
    }

    /// Decodes one value whose arrays return to the pool when the guard drops.
    pub fn decode_pooled(&self, buf: &[u8], offset: usize) -> Result<(usize, Pooled<'_>), DecodeError> {
        let (end, value) = self.decode(buf, offset)?;
        Ok((end, Pooled::new(value, self.pool.as_deref())))
    }

    /// Returns the arrays of a value decoded earlier to the pool.
    pub fn release(&self, value: Value) {
        if let Some(pool) = &self.pool {
            pool.reclaim(value);
        }
    }
}

// =============================================================================
// VALUE DECODING
// =============================================================================

/// Reads one value and, recursively, its elements.
pub fn decode_value(
    reader: &mut Reader<'_>,
    options: &DecodeOptions,
    pool: Option<&ArrayPool>,
    depth: usize,
) -> Result<Value, DecodeError> {
    let offset = reader.position();
    let tag = reader.read_byte("tag")?;
    let marker = Marker::from_u8(tag).ok_or(DecodeError::UnknownTag { tag, offset })?;

    let value = match marker {
        Marker::Nil => Value::Nil,
        Marker::False => Value::Bool(false),
        Marker::True => Value::Bool(true),
        Marker::PositiveFixint(v) => Value::Int(i64::from(v)),
        Marker::NegativeFixint(v) => Value::Int(i64::from(v)),
        Marker::Int(width) => Value::Int(reader.read_int(width, "int")?),
        Marker::UInt(width) => Value::UInt(reader.read_uint(width, "uint")?),
        Marker::Float32 => Value::Float64(reader.read_f32("float32")?),
        Marker::Float64 => Value::Float64(reader.read_f64("float64")?),
        Marker::FixStr(len) => Value::String(reader.read_str(usize::from(len))?),
        Marker::Str(width) => {
            let len = reader.read_len(width, 1, "string")?;
            Value::String(reader.read_str(len)?)
        }
        Marker::FixArray(len) => decode_array(reader, usize::from(len), options, pool, depth)?,
        Marker::Array(width) => {
            let len = reader.read_uint(width, "array.len")? as usize;
            decode_array(reader, len, options, pool, depth)?
        }
        Marker::FixMap(len) => decode_map(reader, usize::from(len), options, pool, depth)?,
        Marker::Map(width) => {
            let len = reader.read_uint(width, "map.len")? as usize;
            decode_map(reader, len, options, pool, depth)?
        }
    };
    Ok(value)
}

fn decode_array(
    reader: &mut Reader<'_>,
    len: usize,
    options: &DecodeOptions,
    pool: Option<&ArrayPool>,
    depth: usize,
) -> Result<Value, DecodeError> {
    check_depth(depth, options)?;
    // Every element takes at least one byte.
    reader.check_len(len, 1, "array")?;

    let mut items = match pool {
        Some(pool) => pool.acquire(len),
        None => Vec::with_capacity(len),
    };
    for _ in 0..len {
        items.push(decode_value(reader, options, pool, depth + 1)?);
    }
    Ok(Value::Array(items))
}

fn decode_map(
    reader: &mut Reader<'_>,
    len: usize,
    options: &DecodeOptions,
    pool: Option<&ArrayPool>,
    depth: usize,
) -> Result<Value, DecodeError> {
    check_depth(depth, options)?;
    // Every pair takes at least two bytes.
    reader.check_len(len, 2, "map")?;

    let mut map = Map::with_capacity_and_hasher(len, Default::default());
    for _ in 0..len {
        let key = decode_key(reader)?;
        let value = decode_value(reader, options, pool, depth + 1)?;
        match map.entry(key) {
            Entry::Occupied(entry) => {
                return Err(DecodeError::DuplicateKey {
                    key: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
    Ok(Value::Map(map))
}

fn decode_key(reader: &mut Reader<'_>) -> Result<String, DecodeError> {
    let offset = reader.position();
    let tag = reader.read_byte("map key")?;
    let len = match Marker::from_u8(tag) {
        Some(Marker::FixStr(len)) => usize::from(len),
        Some(Marker::Str(width)) => reader.read_len(width, 1, "map key")?,
        Some(_) => return Err(DecodeError::NonStringKey { tag, offset }),
        None => return Err(DecodeError::UnknownTag { tag, offset }),
    };
    reader.read_str(len)
}

fn check_depth(depth: usize, options: &DecodeOptions) -> Result<(), DecodeError> {
    if depth >= options.max_depth {
        return Err(DecodeError::DepthExceeded {
            max: options.max_depth,
        });
    }
    Ok(())
}
