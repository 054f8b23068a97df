//! Persisted line format.
//!
//! `<date> <time> [<LEVEL>] [<source>:<line>: ]<message>[ key=value...]`
//!
//! Dates are local time, `YYYY/MM/DD HH:MM:SS`. Embedded newlines are escaped
//! so that one entry is always exactly one line.

use std::fmt::Write as _;

use chrono::Local;
use serde_json::Value;

use crate::entry::Entry;

/// Date and time layout at the start of every line.
pub const DATE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
/// Time-only layout accepted by the retrieval scan.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Render `entry` as one newline-terminated line.
pub fn format_line(entry: &Entry) -> String {
    let mut line = String::with_capacity(32 + entry.message.len());
    let _ = write!(
        line,
        "{} [{}] ",
        entry.timestamp.with_timezone(&Local).format(DATE_TIME_FORMAT),
        entry.level
    );

    if let (Some(source), Some(number)) = (&entry.source, entry.line) {
        let _ = write!(line, "{}:{}: ", source, number);
    }

    push_escaped(&mut line, &entry.message);

    for (key, value) in &entry.fields {
        line.push(' ');
        line.push_str(key);
        line.push('=');
        match value {
            Value::String(s) => push_escaped(&mut line, s),
            other => line.push_str(&other.to_string()),
        }
    }

    line.push('\n');
    line
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}
