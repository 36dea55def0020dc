//! Formatting helpers shared by the encoders.

use chrono::{DateTime, SecondsFormat, Utc};

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
pub fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn coord(value: f64) -> String {
    format!("{:.8}", value)
}

pub fn altitude(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn field(value: f64) -> String {
    format!("{:.3}", value)
}

/// Always-quoted single-line CSV cell with embedded quotes doubled.
pub fn quoted(text: &str) -> String {
    format!("\"{}\"", one_line(text).replace('"', "\"\""))
}

/// Single-line text for comment headers and table cells.
pub fn one_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
