//! Benchmark for slimpack encoding and decoding.
//!
//! Loads a JSON document (or builds a synthetic one), converts it to a
//! [`slimpack::Value`] tree and times the codec against it.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use slimpack::{ArrayPool, Decoder, EncodeOptions, Value};

const ITERS: u32 = 10;
const SYNTHETIC_RECORDS: usize = 50_000;

// =============================================================================
// INPUT
// =============================================================================

const TAGS: [&str; 6] = ["capital", "coastal", "historic", "industrial", "port", "rural"];

/// Builds a city-like dataset with a mix of every value kind.
fn synthetic_dataset(records: usize) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = (0..records)
        .map(|i| {
            let tags: Vec<&str> = TAGS.iter().copied().skip(i % 3).take(1 + i % 4).collect();
            serde_json::json!({
                "id": i,
                "name": format!("City {}", i),
                "country_code": (["DE", "FR", "JP", "BR", "US"][i % 5]),
                "population": (i as i64 * 7919) % 5_000_000,
                "elevation": (i as i64 % 400) - 50,
                "latitude": (i as f64 * 0.37) % 180.0 - 90.0,
                "longitude": (i as f64 * 0.73) % 360.0 - 180.0,
                "capital": i % 97 == 0,
                "timezone": if i % 11 == 0 { serde_json::Value::Null } else { "Europe/Berlin".into() },
                "tags": tags,
            })
        })
        .collect();
    serde_json::Value::Array(rows)
}

fn load_input() -> (String, serde_json::Value) {
    match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading JSON from: {}", path);
            let text = fs::read_to_string(&path).expect("Failed to read input file");
            let parse_start = Instant::now();
            let json = serde_json::from_str(&text).expect("Failed to parse JSON");
            println!("Parsed {} bytes of JSON in {:?}", text.len(), parse_start.elapsed());
            (path, json)
        }
        None => {
            println!("No input given, generating {} synthetic records", SYNTHETIC_RECORDS);
            ("synthetic".to_string(), synthetic_dataset(SYNTHETIC_RECORDS))
        }
    }
}

// =============================================================================
// REPORTING
// =============================================================================

fn throughput(bytes: usize, elapsed: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64()
}

fn count_nodes(value: &Value) -> (usize, usize, usize) {
    match value {
        Value::Array(items) => items.iter().fold((1, 0, 0), |(a, m, s), v| {
            let (a2, m2, s2) = count_nodes(v);
            (a + a2, m + m2, s + s2)
        }),
        Value::Map(map) => map.values().fold((0, 1, 0), |(a, m, s), v| {
            let (a2, m2, s2) = count_nodes(v);
            (a + a2, m + m2, s + s2)
        }),
        _ => (0, 0, 1),
    }
}

fn time_encode(value: &Value, buf: &mut [u8], options: EncodeOptions) -> (usize, Duration) {
    for _ in 0..3 {
        slimpack::encode_with_options(value, buf, 0, options).expect("Failed to encode");
    }
    let start = Instant::now();
    let mut written = 0;
    for _ in 0..ITERS {
        written = slimpack::encode_with_options(value, buf, 0, options).expect("Failed to encode");
    }
    (written, start.elapsed() / ITERS)
}

fn main() {
    let (source, json) = load_input();

    let convert_start = Instant::now();
    let value = slimpack::to_value(&json).expect("Failed to convert JSON to a value tree");
    let convert_time = convert_start.elapsed();

    let (arrays, maps, scalars) = count_nodes(&value);
    println!("Converted in {:?}", convert_time);
    println!(
        "  - {} arrays, {} maps, {} scalars, depth {}",
        arrays,
        maps,
        scalars,
        value.depth()
    );

    let size = slimpack::encoded_len(&value);
    let mut buf = vec![0u8; size];

    // Encoding, fast mode
    let (fast_len, fast_time) = time_encode(&value, &mut buf, EncodeOptions::fast());
    println!("\nEncode (fast): {} bytes in {:?} (avg of {} iterations)", fast_len, fast_time, ITERS);
    println!("  Throughput: {:.2} MB/s", throughput(fast_len, fast_time));

    // Encoding, canonical mode
    let (canonical_len, canonical_time) = time_encode(&value, &mut buf, EncodeOptions::new());
    println!(
        "\nEncode (canonical): {} bytes in {:?} (avg of {} iterations)",
        canonical_len, canonical_time, ITERS
    );
    println!("  Throughput: {:.2} MB/s", throughput(canonical_len, canonical_time));
    println!(
        "  Overhead vs fast: {:.1}x slower",
        canonical_time.as_secs_f64() / fast_time.as_secs_f64()
    );
    assert_eq!(fast_len, canonical_len, "Map ordering must not change the size");

    let encoded = slimpack::to_vec(&value).expect("Failed to encode");
    let encoded2 = slimpack::to_vec(&value).expect("Failed to encode");
    assert_eq!(encoded, encoded2, "Canonical encoding should be deterministic");

    // Decoding, allocating
    let decoder = Decoder::new();
    for _ in 0..3 {
        let _ = decoder.decode(&encoded, 0).expect("Failed to decode");
    }
    let decode_start = Instant::now();
    for _ in 0..ITERS {
        let (end, decoded) = decoder.decode(&encoded, 0).expect("Failed to decode");
        assert_eq!(end, encoded.len());
        drop(decoded);
    }
    let decode_time = decode_start.elapsed() / ITERS;
    println!("\nDecode (allocating): {:?} (avg of {} iterations)", decode_time, ITERS);
    println!("  Throughput: {:.2} MB/s", throughput(encoded.len(), decode_time));

    // Decoding, pooled arrays
    let pool = Arc::new(ArrayPool::default());
    let pooled_decoder = Decoder::new().with_pool(Arc::clone(&pool));
    for _ in 0..3 {
        let _ = pooled_decoder.decode_pooled(&encoded, 0).expect("Failed to decode");
    }
    let pooled_start = Instant::now();
    for _ in 0..ITERS {
        let (end, decoded) = pooled_decoder.decode_pooled(&encoded, 0).expect("Failed to decode");
        assert_eq!(end, encoded.len());
        drop(decoded);
    }
    let pooled_time = pooled_start.elapsed() / ITERS;
    let stats = pool.stats();
    println!("\nDecode (pooled): {:?} (avg of {} iterations)", pooled_time, ITERS);
    println!("  Throughput: {:.2} MB/s", throughput(encoded.len(), pooled_time));
    println!(
        "  Pool: {} hits, {} misses, {} retained",
        stats.hits, stats.misses, stats.retained
    );
    println!(
        "  Speedup vs allocating: {:.1}%",
        100.0 * (decode_time.as_secs_f64() - pooled_time.as_secs_f64()) / decode_time.as_secs_f64()
    );

    let (_, roundtrip) = decoder.decode(&encoded, 0).expect("Failed to decode");
    assert_eq!(roundtrip, value, "Round trip should preserve the value");

    // Size against JSON
    let json_text = serde_json::to_vec(&json).expect("Failed to serialize JSON");
    println!("\n=== Size ===");
    println!("JSON:     {} bytes", json_text.len());
    println!("slimpack: {} bytes", encoded.len());
    println!("  Ratio: {:.1}%", 100.0 * encoded.len() as f64 / json_text.len() as f64);

    if source != "synthetic" {
        let input_path = Path::new(&source);
        let stem = input_path.file_stem().unwrap_or_default().to_string_lossy();
        let parent = input_path.parent().unwrap_or(Path::new("."));
        let output = parent.join(format!("{}.msgpack", stem));
        fs::write(&output, &encoded).expect("Failed to write .msgpack file");
        println!("\nWrote {}", output.display());
    }
}
