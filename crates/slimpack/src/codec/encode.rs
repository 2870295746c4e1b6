//! Value encoding.
//!
//! Every value is written with the narrowest tag that represents it exactly.
//! The encoder writes into a caller-sized buffer and never grows it; use
//! [`encoded_len`] to size the buffer, or [`to_vec`] to let the crate do it.

use log::debug;
use serde::Serialize;

use crate::bridge::{FallbackEncoder, NoFallback, to_value};
use crate::codec::primitives::Writer;
use crate::error::{ConvertError, EncodeError};
use crate::limits::{MAX_CONTAINER_LEN, MAX_DEPTH};
use crate::model::tag::{self, Width};
use crate::model::{Map, Value};

/// Options for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Sort map pairs by key bytes before writing them.
    ///
    /// When enabled, the same logical map always produces the same bytes.
    /// When disabled, pairs are written in hash-map iteration order, which
    /// is cheaper but may differ between two equal maps.
    ///
    /// Enabled by default.
    pub canonical: bool,

    /// Maximum container nesting depth.
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            canonical: true,
            max_depth: MAX_DEPTH,
        }
    }
}

impl EncodeOptions {
    /// Creates default (canonical) encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that write map pairs in iteration order.
    pub fn fast() -> Self {
        Self {
            canonical: false,
            ..Self::default()
        }
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Encodes `value` at the start of `buf`, returning the number of bytes written.
pub fn encode(value: &Value, buf: &mut [u8]) -> Result<usize, EncodeError> {
    encode_at(value, buf, 0)
}

/// Encodes `value` into `buf` starting at `offset`, returning the next free offset.
pub fn encode_at(value: &Value, buf: &mut [u8], offset: usize) -> Result<usize, EncodeError> {
    encode_with_options(value, buf, offset, EncodeOptions::default())
}

/// Encodes `value` into `buf` starting at `offset` with the given options.
pub fn encode_with_options(
    value: &Value,
    buf: &mut [u8],
    offset: usize,
    options: EncodeOptions,
) -> Result<usize, EncodeError> {
    let mut writer = Writer::at(buf, offset)?;
    encode_value(&mut writer, value, &options, 0)?;
    Ok(writer.position())
}

/// Encodes `value` into a freshly allocated, exactly sized vector.
pub fn to_vec(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![0u8; encoded_len(value)];
    let written = encode(value, &mut buf)?;
    debug_assert_eq!(written, buf.len());
    Ok(buf)
}

/// Returns the exact number of bytes `value` encodes to.
pub fn encoded_len(value: &Value) -> usize {
    match value {
        Value::Nil | Value::Bool(_) => 1,
        Value::Int(v) => {
            if tag::is_fixint(*v) {
                1
            } else {
                1 + tag::signed_width(*v).bytes()
            }
        }
        Value::UInt(v) => 1 + tag::unsigned_width(*v).bytes(),
        Value::Float32(_) => 5,
        Value::Float64(_) => 9,
        Value::String(s) => str_header_len(s.len()) + s.len(),
        Value::Array(items) => {
            container_header_len(items.len()) + items.iter().map(encoded_len).sum::<usize>()
        }
        Value::Map(map) => {
            container_header_len(map.len())
                + map
                    .iter()
                    .map(|(k, v)| str_header_len(k.len()) + k.len() + encoded_len(v))
                    .sum::<usize>()
        }
    }
}

fn str_header_len(len: usize) -> usize {
    match len {
        0..=tag::MAX_FIXSTR_LEN => 1,
        0..=0xff => 2,
        0..=0xffff => 3,
        _ => 5,
    }
}

fn container_header_len(len: usize) -> usize {
    match len {
        0..=tag::MAX_FIXARRAY_LEN => 1,
        0..=0xffff => 3,
        _ => 5,
    }
}

// =============================================================================
// ENCODER
// =============================================================================

/// Encoder with options and an optional bridge for values outside the
/// closed set.
///
/// ```rust
/// use slimpack::{Encoder, Value};
///
/// let encoder = Encoder::new();
/// let mut buf = [0u8; 16];
/// let end = encoder.encode(&Value::from("asdf"), &mut buf, 0).unwrap();
/// assert_eq!(&buf[..end], &[0xa4, b'a', b's', b'd', b'f']);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Encoder<F = NoFallback> {
    options: EncodeOptions,
    fallback: F,
}

impl Encoder<NoFallback> {
    /// Creates an encoder with default options and no fallback.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FallbackEncoder> Encoder<F> {
    /// Replaces the encoding options.
    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Installs a fallback used for values the closed set cannot represent.
    pub fn with_fallback<G: FallbackEncoder>(self, fallback: G) -> Encoder<G> {
        Encoder {
            options: self.options,
            fallback,
        }
    }

    /// Returns the encoding options.
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encodes a value at `offset`, returning the next free offset.
    pub fn encode(&self, value: &Value, buf: &mut [u8], offset: usize) -> Result<usize, EncodeError> {
        encode_with_options(value, buf, offset, self.options)
    }

    /// Encodes any serde-serializable value at `offset`.
    ///
    /// Values whose shape fits the closed set are converted to a [`Value`]
    /// and encoded canonically. Anything else is handed to the fallback,
    /// whose bytes are copied in at the cursor.
    pub fn encode_serialize<T: Serialize + ?Sized>(
        &self,
        value: &T,
        buf: &mut [u8],
        offset: usize,
    ) -> Result<usize, EncodeError> {
        let kind = match to_value(value) {
            Ok(v) => return self.encode(&v, buf, offset),
            Err(ConvertError::Unsupported { kind }) => kind,
            Err(ConvertError::Custom(reason)) => {
                return Err(EncodeError::Unsupported {
                    kind: "custom",
                    reason,
                });
            }
        };

        debug!("routing {} value to fallback encoder at offset {}", kind, offset);
        let bytes = self.fallback.marshal(value).map_err(|e| {
            debug!("fallback encoder rejected {} value: {}", kind, e);
            EncodeError::Unsupported {
                kind,
                reason: e.to_string(),
            }
        })?;

        let mut writer = Writer::at(buf, offset)?;
        writer.write_bytes(&bytes)?;
        Ok(writer.position())
    }
}

// =============================================================================
// VALUE ENCODING
// =============================================================================

/// Writes one value and, recursively, its elements.
pub fn encode_value(
    writer: &mut Writer<'_>,
    value: &Value,
    options: &EncodeOptions,
    depth: usize,
) -> Result<(), EncodeError> {
    match value {
        Value::Nil => writer.write_byte(tag::NIL),
        Value::Bool(b) => writer.write_byte(if *b { tag::TRUE } else { tag::FALSE }),
        Value::Int(v) => encode_int(writer, *v),
        Value::UInt(v) => encode_uint(writer, *v),
        Value::Float32(v) => writer.write_tagged(tag::FLOAT32, Width::W32, u64::from(v.to_bits())),
        Value::Float64(v) => writer.write_tagged(tag::FLOAT64, Width::W64, v.to_bits()),
        Value::String(s) => encode_str(writer, s),
        Value::Array(items) => encode_array(writer, items, options, depth),
        Value::Map(map) => encode_map(writer, map, options, depth),
    }
}

fn encode_int(writer: &mut Writer<'_>, v: i64) -> Result<(), EncodeError> {
    if tag::is_fixint(v) {
        // Both fixint forms are the low byte of the two's complement value.
        return writer.write_byte(v as u8);
    }
    let width = tag::signed_width(v);
    let tag = match width {
        Width::W8 => tag::INT8,
        Width::W16 => tag::INT16,
        Width::W32 => tag::INT32,
        Width::W64 => tag::INT64,
    };
    writer.write_tagged(tag, width, v as u64)
}

fn encode_uint(writer: &mut Writer<'_>, v: u64) -> Result<(), EncodeError> {
    let width = tag::unsigned_width(v);
    let tag = match width {
        Width::W8 => tag::UINT8,
        Width::W16 => tag::UINT16,
        Width::W32 => tag::UINT32,
        Width::W64 => tag::UINT64,
    };
    writer.write_tagged(tag, width, v)
}

fn encode_str(writer: &mut Writer<'_>, s: &str) -> Result<(), EncodeError> {
    let len = s.len();
    match len {
        0..=tag::MAX_FIXSTR_LEN => writer.write_byte(tag::FIXSTR | len as u8)?,
        0..=0xff => writer.write_tagged(tag::STR8, Width::W8, len as u64)?,
        0..=0xffff => writer.write_tagged(tag::STR16, Width::W16, len as u64)?,
        _ => {
            check_len("string", len)?;
            writer.write_tagged(tag::STR32, Width::W32, len as u64)?;
        }
    }
    writer.write_bytes(s.as_bytes())
}

fn encode_array(
    writer: &mut Writer<'_>,
    items: &[Value],
    options: &EncodeOptions,
    depth: usize,
) -> Result<(), EncodeError> {
    check_depth(depth, options)?;
    let len = items.len();
    match len {
        0..=tag::MAX_FIXARRAY_LEN => writer.write_byte(tag::FIXARRAY | len as u8)?,
        0..=0xffff => writer.write_tagged(tag::ARRAY16, Width::W16, len as u64)?,
        _ => {
            check_len("array", len)?;
            writer.write_tagged(tag::ARRAY32, Width::W32, len as u64)?;
        }
    }
    for item in items {
        encode_value(writer, item, options, depth + 1)?;
    }
    Ok(())
}

fn encode_map(
    writer: &mut Writer<'_>,
    map: &Map,
    options: &EncodeOptions,
    depth: usize,
) -> Result<(), EncodeError> {
    check_depth(depth, options)?;
    let len = map.len();
    match len {
        0..=tag::MAX_FIXMAP_LEN => writer.write_byte(tag::FIXMAP | len as u8)?,
        0..=0xffff => writer.write_tagged(tag::MAP16, Width::W16, len as u64)?,
        _ => {
            check_len("map", len)?;
            writer.write_tagged(tag::MAP32, Width::W32, len as u64)?;
        }
    }

    if options.canonical {
        let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
        pairs.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        for (key, value) in pairs {
            encode_str(writer, key)?;
            encode_value(writer, value, options, depth + 1)?;
        }
    } else {
        for (key, value) in map {
            encode_str(writer, key)?;
            encode_value(writer, value, options, depth + 1)?;
        }
    }
    Ok(())
}

fn check_depth(depth: usize, options: &EncodeOptions) -> Result<(), EncodeError> {
    if depth >= options.max_depth {
        return Err(EncodeError::DepthExceeded {
            max: options.max_depth,
        });
    }
    Ok(())
}

fn check_len(field: &'static str, len: usize) -> Result<(), EncodeError> {
    if len > MAX_CONTAINER_LEN {
        return Err(EncodeError::LengthExceedsLimit {
            field,
            len,
            max: MAX_CONTAINER_LEN,
        });
    }
    Ok(())
}
