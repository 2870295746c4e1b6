//! Data model for the codec.
//!
//! - Values (the closed set of encodable kinds)
//! - Wire tags (byte prefixes and their classification)

pub mod tag;
pub mod value;

pub use tag::{Marker, Width};
pub use value::{Kind, Map, Value};
