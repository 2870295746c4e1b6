//! Simple decoder to inspect files holding one or more MessagePack values.

use std::fs;

use slimpack::{decode, Value};

fn format_value(v: &Value, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match v {
        Value::Nil => out.push_str("nil"),
        Value::Bool(b) => out.push_str(&b.to_string()),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::UInt(u) => out.push_str(&format!("{}u", u)),
        Value::Float32(f) => out.push_str(&format!("{:.6}f32", f)),
        Value::Float64(f) => out.push_str(&format!("{:.6}", f)),
        Value::String(s) => {
            let preview: String = s.chars().take(80).collect();
            if s.len() > preview.len() {
                out.push_str(&format!("\"{}...\"", preview));
            } else {
                out.push_str(&format!("\"{}\"", preview));
            }
        }
        Value::Array(items) => {
            out.push_str(&format!("[ # {} items\n", items.len()));
            for item in items {
                out.push_str(&pad);
                out.push_str("  ");
                format_value(item, indent + 1, out);
                out.push('\n');
            }
            out.push_str(&pad);
            out.push(']');
        }
        Value::Map(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push_str(&format!("{{ # {} pairs\n", map.len()));
            for key in keys {
                out.push_str(&pad);
                out.push_str(&format!("  {:?}: ", key));
                format_value(&map[key], indent + 1, out);
                out.push('\n');
            }
            out.push_str(&pad);
            out.push('}');
        }
    }
}

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: dump <file.msgpack>");
        std::process::exit(2);
    };

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let mut offset = 0;
    let mut index = 0;
    while offset < data.len() {
        match decode(&data, offset) {
            Ok((next, value)) => {
                let mut text = String::new();
                format_value(&value, 0, &mut text);
                println!("\n=== Value {} (bytes {}..{}) ===", index, offset, next);
                println!("{}", text);
                offset = next;
                index += 1;
            }
            Err(e) => {
                eprintln!("\nDecode failed at offset {}: {}", offset, e);
                std::process::exit(1);
            }
        }
    }

    println!("\nDecoded {} values", index);
}
