//! Document rendering back to TOML text.
//!
//! # Responsibilities
//! - Emit top-level scalar entries before any section
//! - Emit each nested mapping as a `[section]` with scalar fields
//! - Quote and escape string values
//!
//! # Design Decisions
//! - Two-pass emission is mandatory: TOML does not permit a top-level
//!   scalar key after the first section header
//! - Values are reformatted, not preserved byte-for-byte; re-parsing the
//!   output yields a semantically equal document
//! - Anything that is not a recognized scalar, array, or table is coerced
//!   to a quoted string

use toml::{Table, Value};

/// Render a document as TOML text, scalars first, then sections.
pub fn render(document: &Table) -> String {
    let mut out = String::new();

    for (key, value) in document {
        if !value.is_table() {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(&render_value(value));
            out.push('\n');
        }
    }

    for (key, value) in document {
        if let Value::Table(section) = value {
            out.push('\n');
            out.push('[');
            out.push_str(key);
            out.push_str("]\n");
            for (sub_key, sub_value) in section {
                out.push_str(sub_key);
                out.push_str(" = ");
                out.push_str(&render_value(sub_value));
                out.push('\n');
            }
        }
    }

    out
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => render_float(*f),
        Value::Boolean(b) => b.to_string(),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        other => quote(&other.to_string()),
    }
}

fn render_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if f.fract() == 0.0 {
        // "1" would re-parse as an integer
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

// TOML basic strings may not contain raw control characters.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c < '\u{20}' || c == '\u{7F}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
