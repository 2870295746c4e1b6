//! Binary encoding/decoding for the supported MessagePack subset.

pub mod decode;
pub mod encode;
pub mod primitives;

pub use decode::{decode, decode_with_options, from_slice, DecodeOptions, Decoder};
pub use encode::{encode, encode_at, encode_with_options, encoded_len, to_vec, EncodeOptions, Encoder};
pub use primitives::{Reader, Writer};
