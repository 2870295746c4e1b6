//! Wire tag table for the supported MessagePack subset.
//!
//! Every encoded value starts with one tag byte. Fix forms pack a small
//! payload (value or length) into the low bits of the tag itself; the other
//! forms are followed by a big-endian payload or length field.

pub const NIL: u8 = 0xc0;
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;

pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;

pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;

pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;

pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;

pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;

pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;

/// High bits of a fixmap tag (`1000xxxx`).
pub const FIXMAP: u8 = 0x80;
/// High bits of a fixarray tag (`1001xxxx`).
pub const FIXARRAY: u8 = 0x90;
/// High bits of a fixstr tag (`101xxxxx`).
pub const FIXSTR: u8 = 0xa0;

pub const MAX_POSITIVE_FIXINT: i64 = 0x7f;
pub const MIN_NEGATIVE_FIXINT: i64 = -32;
pub const MAX_FIXSTR_LEN: usize = 31;
pub const MAX_FIXARRAY_LEN: usize = 15;
pub const MAX_FIXMAP_LEN: usize = 15;

/// Width of an explicit length or numeric payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// Number of payload bytes following the tag.
    pub fn bytes(self) -> usize {
        match self {
            Width::W8 => 1,
            Width::W16 => 2,
            Width::W32 => 4,
            Width::W64 => 8,
        }
    }
}

/// Classification of a single tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Nil,
    False,
    True,
    /// Positive fixint carrying its value (0..=127).
    PositiveFixint(u8),
    /// Negative fixint carrying its value (-32..=-1).
    NegativeFixint(i8),
    Int(Width),
    UInt(Width),
    Float32,
    Float64,
    /// Fixstr carrying its byte length (0..=31).
    FixStr(u8),
    /// String with an explicit length field (8, 16 or 32 bits).
    Str(Width),
    /// Fixarray carrying its element count (0..=15).
    FixArray(u8),
    Array(Width),
    /// Fixmap carrying its pair count (0..=15).
    FixMap(u8),
    Map(Width),
}

impl Marker {
    /// Classifies a tag byte, or returns None for tags outside the subset
    /// (reserved 0xc1, bin, ext and fixext forms).
    pub fn from_u8(tag: u8) -> Option<Marker> {
        let marker = match tag {
            0x00..=0x7f => Marker::PositiveFixint(tag),
            0x80..=0x8f => Marker::FixMap(tag & 0x0f),
            0x90..=0x9f => Marker::FixArray(tag & 0x0f),
            0xa0..=0xbf => Marker::FixStr(tag & 0x1f),
            NIL => Marker::Nil,
            FALSE => Marker::False,
            TRUE => Marker::True,
            FLOAT32 => Marker::Float32,
            FLOAT64 => Marker::Float64,
            UINT8 => Marker::UInt(Width::W8),
            UINT16 => Marker::UInt(Width::W16),
            UINT32 => Marker::UInt(Width::W32),
            UINT64 => Marker::UInt(Width::W64),
            INT8 => Marker::Int(Width::W8),
            INT16 => Marker::Int(Width::W16),
            INT32 => Marker::Int(Width::W32),
            INT64 => Marker::Int(Width::W64),
            STR8 => Marker::Str(Width::W8),
            STR16 => Marker::Str(Width::W16),
            STR32 => Marker::Str(Width::W32),
            ARRAY16 => Marker::Array(Width::W16),
            ARRAY32 => Marker::Array(Width::W32),
            MAP16 => Marker::Map(Width::W16),
            MAP32 => Marker::Map(Width::W32),
            0xe0..=0xff => Marker::NegativeFixint(tag as i8),
            _ => return None,
        };
        Some(marker)
    }

    /// Returns true for tags that introduce a string.
    pub fn is_str(self) -> bool {
        matches!(self, Marker::FixStr(_) | Marker::Str(_))
    }
}

/// Narrowest signed width holding `v`. Fixint ranges are checked by the caller.
pub fn signed_width(v: i64) -> Width {
    if i8::try_from(v).is_ok() {
        Width::W8
    } else if i16::try_from(v).is_ok() {
        Width::W16
    } else if i32::try_from(v).is_ok() {
        Width::W32
    } else {
        Width::W64
    }
}

/// Narrowest unsigned width holding `v`.
pub fn unsigned_width(v: u64) -> Width {
    if u8::try_from(v).is_ok() {
        Width::W8
    } else if u16::try_from(v).is_ok() {
        Width::W16
    } else if u32::try_from(v).is_ok() {
        Width::W32
    } else {
        Width::W64
    }
}

/// Returns true if `v` fits a one-byte fixint.
pub fn is_fixint(v: i64) -> bool {
    (MIN_NEGATIVE_FIXINT..=MAX_POSITIVE_FIXINT).contains(&v)
}
