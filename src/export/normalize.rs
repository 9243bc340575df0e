// export/normalize.rs
// Row transforms applied before writing: temporal rendering for both output
// formats, byte-level re-encoding for the CSV path.

use crate::db::models::{Row, Value};
use chrono::NaiveDateTime;

/// Fixed rendering for temporal values. No timezone conversion: the value's
/// own instant is formatted with zero-padded components.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Replaces every temporal value with its rendered text form; everything
/// else passes through. Idempotent: a second pass sees only text.
pub fn normalize_temporal(row: Row) -> Row {
    row.into_iter()
        .map(|(column, value)| {
            let value = match value {
                Value::DateTime(dt) => Value::Text(format_timestamp(&dt)),
                other => other,
            };
            (column, value)
        })
        .collect()
}

/// Re-encodes textual values through a UTF-8 round trip so the CSV bytes are
/// guaranteed valid UTF-8 even when the driver handed over raw or partially
/// decoded data. Rust `String`s are valid UTF-8 by construction, so the real
/// work is the `Bytes` case; non-textual values pass through.
pub fn normalize_encoding(row: Row) -> Row {
    row.into_iter()
        .map(|(column, value)| {
            let value = match value {
                Value::Text(s) => Value::Text(String::from_utf8_lossy(s.as_bytes()).into_owned()),
                Value::Bytes(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
                other => other,
            };
            (column, value)
        })
        .collect()
}
