//! Cursor primitives over caller-owned buffers.
//!
//! All multi-byte fields on the wire are big-endian. Both cursors check every
//! access against the buffer bounds and report overruns as errors.

use crate::error::{DecodeError, EncodeError};
use crate::model::Width;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and a read cursor.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a reader positioned at `offset`.
    pub fn at(data: &'a [u8], offset: usize) -> Result<Self, DecodeError> {
        if offset > data.len() {
            return Err(DecodeError::OffsetOutOfRange {
                offset,
                len: data.len(),
            });
        }
        Ok(Self { data, pos: offset })
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns the next byte without consuming it.
    #[inline]
    pub fn peek_byte(&self, context: &'static str) -> Result<u8, DecodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof {
                context,
                offset: self.pos,
            })
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let byte = self.peek_byte(context)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining_len() {
            return Err(DecodeError::UnexpectedEof {
                context,
                offset: self.pos,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads a fixed-size array of bytes.
    #[inline]
    pub fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, context)?);
        Ok(out)
    }

    /// Reads a big-endian unsigned integer of the given width.
    #[inline]
    pub fn read_uint(&mut self, width: Width, context: &'static str) -> Result<u64, DecodeError> {
        let value = match width {
            Width::W8 => u64::from(self.read_byte(context)?),
            Width::W16 => u64::from(u16::from_be_bytes(self.read_array(context)?)),
            Width::W32 => u64::from(u32::from_be_bytes(self.read_array(context)?)),
            Width::W64 => u64::from_be_bytes(self.read_array(context)?),
        };
        Ok(value)
    }

    /// Reads a big-endian two's complement integer of the given width.
    #[inline]
    pub fn read_int(&mut self, width: Width, context: &'static str) -> Result<i64, DecodeError> {
        let value = match width {
            Width::W8 => i64::from(self.read_byte(context)? as i8),
            Width::W16 => i64::from(i16::from_be_bytes(self.read_array(context)?)),
            Width::W32 => i64::from(i32::from_be_bytes(self.read_array(context)?)),
            Width::W64 => i64::from_be_bytes(self.read_array(context)?),
        };
        Ok(value)
    }

    /// Reads a big-endian IEEE-754 single, widened to f64.
    #[inline]
    pub fn read_f32(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        let bits = u32::from_be_bytes(self.read_array(context)?);
        Ok(f64::from(f32::from_bits(bits)))
    }

    /// Reads a big-endian IEEE-754 double.
    #[inline]
    pub fn read_f64(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        let bits = u64::from_be_bytes(self.read_array(context)?);
        Ok(f64::from_bits(bits))
    }

    /// Reads an explicit length field and checks it against the remaining
    /// input, assuming each counted item occupies at least `min_item_size` bytes.
    pub fn read_len(
        &mut self,
        width: Width,
        min_item_size: usize,
        field: &'static str,
    ) -> Result<usize, DecodeError> {
        let len = self.read_uint(width, field)? as usize;
        self.check_len(len, min_item_size, field)?;
        Ok(len)
    }

    /// Checks that `len` items of at least `min_item_size` bytes can fit in the
    /// remaining input.
    pub fn check_len(
        &self,
        len: usize,
        min_item_size: usize,
        field: &'static str,
    ) -> Result<(), DecodeError> {
        let remaining = self.remaining_len();
        if len.saturating_mul(min_item_size) > remaining {
            return Err(DecodeError::LengthExceedsRemaining {
                field,
                len,
                remaining,
            });
        }
        Ok(())
    }

    /// Reads `len` bytes of UTF-8 as an owned string.
    pub fn read_str(&mut self, len: usize) -> Result<String, DecodeError> {
        let offset = self.pos;
        let bytes = self.read_bytes(len, "string")?;
        // Validate UTF-8 on borrowed slice, then allocate once
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| DecodeError::InvalidUtf8 { offset })
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding into a caller-sized buffer.
///
/// The writer never grows the buffer; running out of room is an error.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    /// Creates a writer positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a writer positioned at `offset`.
    pub fn at(buf: &'a mut [u8], offset: usize) -> Result<Self, EncodeError> {
        if offset > buf.len() {
            return Err(EncodeError::OffsetOutOfRange {
                offset,
                len: buf.len(),
            });
        }
        Ok(Self { buf, pos: offset })
    }

    /// Returns the next free offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes still available.
    pub fn remaining_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    fn reserve(&mut self, n: usize) -> Result<&mut [u8], EncodeError> {
        if n > self.remaining_len() {
            return Err(EncodeError::BufferTooSmall {
                needed: self.pos + n,
                available: self.buf.len(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&mut self.buf[start..start + n])
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.reserve(1)?[0] = byte;
        Ok(())
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Writes the low `width` bytes of `value`, big-endian.
    #[inline]
    pub fn write_uint(&mut self, width: Width, value: u64) -> Result<(), EncodeError> {
        let be = value.to_be_bytes();
        self.write_bytes(&be[8 - width.bytes()..])
    }

    /// Writes a tag byte followed by a big-endian payload of the given width.
    #[inline]
    pub fn write_tagged(&mut self, tag: u8, width: Width, value: u64) -> Result<(), EncodeError> {
        let n = 1 + width.bytes();
        let out = self.reserve(n)?;
        out[0] = tag;
        out[1..].copy_from_slice(&value.to_be_bytes()[8 - width.bytes()..]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_roundtrip() {
        let cases = [
            (Width::W8, 0xabu64),
            (Width::W16, 0xbeef),
            (Width::W32, 0xdead_beef),
            (Width::W64, u64::MAX),
        ];

        for (width, v) in cases {
            let mut buf = [0u8; 8];
            let mut writer = Writer::new(&mut buf);
            writer.write_uint(width, v).unwrap();
            assert_eq!(writer.position(), width.bytes());

            let mut reader = Reader::new(&buf);
            assert_eq!(reader.read_uint(width, "test").unwrap(), v, "failed for {:?}", width);
        }
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = [0u8; 3];
        let mut writer = Writer::new(&mut buf);
        writer.write_tagged(0xcd, Width::W16, 0x0102).unwrap();
        assert_eq!(buf, [0xcd, 0x01, 0x02]);
    }

    #[test]
    fn test_int_sign_extension() {
        let data = [0xff, 0xff, 0x80, 0x00];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_int(Width::W8, "test").unwrap(), -1);
        assert_eq!(reader.read_int(Width::W8, "test").unwrap(), -1);
        assert_eq!(reader.read_int(Width::W16, "test").unwrap(), -32768);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_writer_never_overruns() {
        let mut buf = [0u8; 2];
        let mut writer = Writer::new(&mut buf);
        writer.write_byte(1).unwrap();
        let result = writer.write_tagged(0xcd, Width::W16, 7);
        assert_eq!(
            result,
            Err(EncodeError::BufferTooSmall { needed: 4, available: 2 })
        );
        // failed write leaves the cursor where it was
        assert_eq!(writer.position(), 1);
    }

    #[test]
    fn test_writer_offset_out_of_range() {
        let mut buf = [0u8; 2];
        assert!(matches!(
            Writer::at(&mut buf, 3),
            Err(EncodeError::OffsetOutOfRange { offset: 3, len: 2 })
        ));
        assert!(Writer::at(&mut buf, 2).is_ok());
    }

    #[test]
    fn test_unexpected_eof() {
        let data = [0u8; 5];
        let mut reader = Reader::new(&data);
        let result = reader.read_bytes(10, "test");
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { offset: 0, .. })));
    }

    #[test]
    fn test_len_checked_against_remaining() {
        // declares 0x1000 items with only two bytes left
        let data = [0x10, 0x00, 0x01, 0x02];
        let mut reader = Reader::new(&data);
        let result = reader.read_len(Width::W16, 1, "array");
        assert_eq!(
            result,
            Err(DecodeError::LengthExceedsRemaining { field: "array", len: 0x1000, remaining: 2 })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let data = [b'a', 0xff];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_str(2), Err(DecodeError::InvalidUtf8 { offset: 0 }));
    }
}
