//! Byte-level compatibility with the MessagePack tag table.

use serde::Serialize;
use slimpack::{
    decode, encode, encoded_len, from_slice, EncodeError, Encoder, FallbackEncoder, Map, Value,
};

fn enc(value: &Value) -> Vec<u8> {
    let mut buf = vec![0u8; 1 << 20];
    let n = encode(value, &mut buf).unwrap();
    buf.truncate(n);
    buf
}

fn roundtrip(value: &Value) -> Vec<u8> {
    let bytes = enc(value);
    let (consumed, decoded) = decode(&bytes, 0).unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(&decoded, value);
    bytes
}

fn letters(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| Value::from(((b'a' + (i % 26) as u8) as char).to_string()))
        .collect()
}

fn numbered_map(n: usize) -> Value {
    (0..n).map(|i| (format!("k{:03}", i), i as i64)).collect()
}

#[test]
fn bools_are_single_bytes() {
    assert_eq!(roundtrip(&Value::Bool(true)), [0xc3]);
    assert_eq!(roundtrip(&Value::Bool(false)), [0xc2]);
}

#[test]
fn small_ints_use_fixint() {
    assert_eq!(roundtrip(&Value::Int(120)), [0x78]);
    assert_eq!(roundtrip(&Value::Int(127)), [0x7f]);
    assert_eq!(roundtrip(&Value::Int(-20)), [0xec]);
    assert_eq!(roundtrip(&Value::Int(-32)), [0xe0]);
    assert_eq!(roundtrip(&Value::Int(-33)), [0xd0, 0xdf]);
}

#[test]
fn int16_literal() {
    assert_eq!(roundtrip(&Value::Int(32123)), [0xd1, 0x7d, 0x6b]);
}

#[test]
fn integer_width_boundaries() {
    let cases: [(i64, u8, usize); 8] = [
        (127, 0x7f, 1),
        (128, 0xd1, 3),
        (-128, 0xd0, 2),
        (-129, 0xd1, 3),
        (32767, 0xd1, 3),
        (32768, 0xd2, 5),
        (2147483647, 0xd2, 5),
        (2147483648, 0xd3, 9),
    ];
    for (v, tag, len) in cases {
        let bytes = roundtrip(&Value::Int(v));
        assert_eq!(bytes[0], tag, "tag for {}", v);
        assert_eq!(bytes.len(), len, "length for {}", v);
    }

    let unsigned: [(u64, u8, usize); 6] = [
        (128, 0xcc, 2),
        (255, 0xcc, 2),
        (256, 0xcd, 3),
        (65535, 0xcd, 3),
        (65536, 0xce, 5),
        (4294967296, 0xcf, 9),
    ];
    for (v, tag, len) in unsigned {
        let bytes = roundtrip(&Value::UInt(v));
        assert_eq!(bytes[0], tag, "tag for {}", v);
        assert_eq!(bytes.len(), len, "length for {}", v);
    }
    assert_eq!(roundtrip(&Value::UInt(128)), [0xcc, 0x80]);
}

#[test]
fn string_literal() {
    let bytes = roundtrip(&Value::from("asdf"));
    assert_eq!(bytes, [0xa4, b'a', b's', b'd', b'f']);
}

#[test]
fn string_length_boundaries() {
    let cases = [(31, 0xbf, 1), (32, 0xd9, 2), (255, 0xd9, 2), (256, 0xda, 3), (65535, 0xda, 3), (65536, 0xdb, 5)];
    for (len, tag, header) in cases {
        let bytes = roundtrip(&Value::from("s".repeat(len)));
        assert_eq!(bytes[0], tag, "tag for length {}", len);
        assert_eq!(bytes.len(), header + len, "size for length {}", len);
    }
}

#[test]
fn array16_literal() {
    let bytes = roundtrip(&Value::Array(letters(16)));
    assert_eq!(&bytes[..3], [0xdc, 0x00, 0x10]);
    let mut expected = vec![0xdc, 0x00, 0x10];
    for c in b'a'..=b'p' {
        expected.extend_from_slice(&[0xa1, c]);
    }
    assert_eq!(bytes, expected);
}

#[test]
fn array_length_boundaries() {
    assert_eq!(roundtrip(&Value::Array(letters(15)))[0], 0x9f);
    assert_eq!(roundtrip(&Value::Array(letters(16)))[0], 0xdc);
    assert_eq!(&roundtrip(&Value::Array(letters(65535)))[..3], [0xdc, 0xff, 0xff]);
    assert_eq!(&roundtrip(&Value::Array(letters(65536)))[..5], [0xdd, 0x00, 0x01, 0x00, 0x00]);
}

#[test]
fn map_length_boundaries() {
    assert_eq!(roundtrip(&numbered_map(15))[0], 0x8f);
    assert_eq!(&roundtrip(&numbered_map(16))[..3], [0xde, 0x00, 0x10]);
    assert_eq!(&roundtrip(&Value::Map(Map::default()))[..], [0x80]);
}

#[test]
fn floats_keep_width() {
    let bytes = roundtrip(&Value::Float32(2.5));
    assert_eq!(bytes.len(), 5);
    assert_eq!(bytes[0], 0xca);

    let bytes = roundtrip(&Value::Float64(2000000000000.5));
    assert_eq!(bytes.len(), 9);
    assert_eq!(bytes[0], 0xcb);
}

#[test]
fn nested_containers_consume_exactly_what_was_written() {
    let inner_array = Value::Array(vec![Value::Int(1), Value::from("two"), Value::Nil]);
    let map: Value = [
        ("list", inner_array),
        ("flag", Value::Bool(false)),
        ("big", Value::UInt(u64::MAX)),
    ]
    .into_iter()
    .collect();
    let value = Value::Array(vec![map, Value::Float64(-0.25), Value::Int(-5000)]);

    let mut buf = vec![0u8; encoded_len(&value) + 4];
    let written = encode(&value, &mut buf).unwrap();
    assert_eq!(written, encoded_len(&value));

    let (consumed, decoded) = decode(&buf, 0).unwrap();
    assert_eq!(consumed, written);
    assert_eq!(decoded, value);
}

#[test]
fn consecutive_values_share_a_buffer() {
    let values = [Value::Int(7), Value::from("x"), Value::Array(vec![Value::Bool(true)])];
    let mut buf = [0u8; 32];
    let mut offset = 0;
    for v in &values {
        offset = slimpack::encode_at(v, &mut buf, offset).unwrap();
    }

    let mut cursor = 0;
    for v in &values {
        let (next, decoded) = decode(&buf, cursor).unwrap();
        assert_eq!(&decoded, v);
        cursor = next;
    }
    assert_eq!(cursor, offset);
}

#[test]
fn canonical_maps_are_byte_stable() {
    let forward: Value = (0..40).map(|i| (format!("key{}", i), i as i64)).collect();
    let backward: Value = (0..40).rev().map(|i| (format!("key{}", i), i as i64)).collect();
    assert_eq!(enc(&forward), enc(&backward));
}

#[test]
fn from_slice_decodes_whole_buffer() {
    assert_eq!(from_slice(&enc(&Value::from("asdf"))).unwrap(), Value::from("asdf"));
}

// =============================================================================
// FALLBACK
// =============================================================================

#[derive(Serialize)]
struct Point {
    x: i32,
    y: i32,
}

/// Marshals anything as a MessagePack string holding its JSON form.
struct JsonFallback;

impl FallbackEncoder for JsonFallback {
    type Error = String;

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, String> {
        let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
        slimpack::to_vec(&Value::from(json)).map_err(|e| e.to_string())
    }
}

struct RejectingFallback;

impl FallbackEncoder for RejectingFallback {
    type Error = &'static str;

    fn marshal<T: Serialize + ?Sized>(&self, _value: &T) -> Result<Vec<u8>, &'static str> {
        Err("rejected")
    }
}

#[test]
fn closed_set_values_bypass_fallback() {
    let encoder = Encoder::new().with_fallback(RejectingFallback);
    let mut buf = [0u8; 16];
    let end = encoder.encode_serialize(&vec![1i16, -2], &mut buf, 0).unwrap();
    assert_eq!(&buf[..end], [0x92, 0x01, 0xfe]);
}

#[test]
fn foreign_values_route_to_fallback() {
    let encoder = Encoder::new().with_fallback(JsonFallback);
    let mut buf = [0u8; 64];
    buf[0] = 0xc0;
    let end = encoder.encode_serialize(&Point { x: 1, y: 2 }, &mut buf, 1).unwrap();

    let (next, decoded) = decode(&buf, 1).unwrap();
    assert_eq!(next, end);
    assert_eq!(decoded, Value::from(r#"{"x":1,"y":2}"#));
    assert_eq!(buf[0], 0xc0);
}

#[test]
fn fallback_failure_is_reported() {
    let mut buf = [0u8; 64];
    let result = Encoder::new().encode_serialize(&Point { x: 1, y: 2 }, &mut buf, 0);
    assert!(matches!(result, Err(EncodeError::Unsupported { kind: "struct", .. })));

    let encoder = Encoder::new().with_fallback(RejectingFallback);
    let result = encoder.encode_serialize(&'c', &mut buf, 0);
    assert_eq!(
        result,
        Err(EncodeError::Unsupported {
            kind: "char",
            reason: "rejected".to_string()
        })
    );
}

#[test]
fn fallback_output_respects_buffer_size() {
    let encoder = Encoder::new().with_fallback(JsonFallback);
    let mut buf = [0u8; 4];
    let result = encoder.encode_serialize(&Point { x: 1, y: 2 }, &mut buf, 0);
    assert!(matches!(result, Err(EncodeError::BufferTooSmall { .. })));
}
