//! Error types for encoding and decoding.

use thiserror::Error;

/// Error during binary decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unknown tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("unexpected end of input while reading {context} at offset {offset}")]
    UnexpectedEof { context: &'static str, offset: usize },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("{field} length {len} exceeds remaining input ({remaining} bytes)")]
    LengthExceedsRemaining {
        field: &'static str,
        len: usize,
        remaining: usize,
    },

    #[error("map key at offset {offset} has non-string tag 0x{tag:02x}")]
    NonStringKey { tag: u8, offset: usize },

    #[error("duplicate map key {key:?}")]
    DuplicateKey { key: String },

    #[error("nesting depth exceeds maximum {max}")]
    DepthExceeded { max: usize },

    #[error("offset {offset} is outside the input (length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("trailing bytes after value (consumed {consumed} of {len})")]
    TrailingBytes { consumed: usize, len: usize },
}

/// Error during binary encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("buffer too small: need {needed} bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("nesting depth exceeds maximum {max}")]
    DepthExceeded { max: usize },

    #[error("unsupported {kind} value: {reason}")]
    Unsupported { kind: &'static str, reason: String },

    #[error("offset {offset} is outside the buffer (length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },
}

/// Error converting a serde value into the closed value set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("{kind} is outside the supported value set")]
    Unsupported { kind: &'static str },

    #[error("{0}")]
    Custom(String),
}
