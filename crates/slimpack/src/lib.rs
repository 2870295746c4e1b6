//! slimpack: a compact MessagePack subset codec.
//!
//! This crate converts a small, closed set of values (nil, booleans, signed
//! and unsigned integers, 32/64-bit floats, UTF-8 strings, string-keyed maps
//! and heterogeneous arrays) to and from MessagePack bytes.
//!
//! # Quick Start
//!
//! ```rust
//! use slimpack::{decode, encode, encoded_len, Value};
//!
//! let value = Value::Array(vec![Value::from("asdf"), Value::Int(-20), Value::Bool(true)]);
//!
//! // The encoder never grows the buffer: size it first.
//! let mut buf = vec![0u8; encoded_len(&value)];
//! let written = encode(&value, &mut buf).unwrap();
//!
//! let (consumed, decoded) = decode(&buf, 0).unwrap();
//! assert_eq!(consumed, written);
//! assert_eq!(decoded, value);
//! ```
//!
//! # Modules
//!
//! - [`model`]: The `Value` type and the wire tag table
//! - [`codec`]: Encoding and decoding
//! - [`pool`]: Reusable array storage for the decoder
//! - [`bridge`]: serde conversion and the fallback for other types
//! - [`error`]: Error types
//! - [`limits`]: Decoder limits and pool sizing
//!
//! # Wire Format
//!
//! Output is bit-compatible with standard MessagePack. Every value is
//! written with the narrowest tag that holds it exactly, so the integer 100
//! is always the single byte `0x64`. Map pairs are sorted by key by default,
//! which makes output byte-stable; see [`EncodeOptions`].
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Declared lengths are checked against the remaining input before allocating
//! - Nesting depth is bounded
//! - Unknown tags, invalid UTF-8 and truncated input are rejected with descriptive errors

pub mod bridge;
pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod pool;

// Re-export commonly used types at crate root
pub use bridge::{to_value, FallbackEncoder, NoFallback};
pub use codec::{
    decode, decode_with_options, encode, encode_at, encode_with_options, encoded_len, from_slice,
    to_vec, DecodeOptions, Decoder, EncodeOptions, Encoder,
};
pub use error::{ConvertError, DecodeError, EncodeError};
pub use model::{Kind, Map, Value};
pub use pool::{ArrayPool, PoolStats, Pooled};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
