//! Display formatting shared by the tables and panels

use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format bytes to human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exp = (bytes as f64).log(1024.0).min(UNITS.len() as f64 - 1.0) as usize;
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    if exp == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[exp])
    }
}

/// Signed sizes from the engine use -1 for "not calculated"
pub fn format_size(bytes: i64) -> String {
    if bytes < 0 {
        "-".to_string()
    } else {
        format_bytes(bytes as u64)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// "3 minutes ago" style age of a unix timestamp
pub fn format_relative(timestamp: i64, now: DateTime<Utc>) -> String {
    if timestamp <= 0 {
        return "-".to_string();
    }
    let Some(then) = DateTime::from_timestamp(timestamp, 0) else {
        return "-".to_string();
    };
    relative_between(then, now)
}

/// Same as [`format_relative`] for RFC 3339 strings, as volumes and networks report them
pub fn format_relative_str(timestamp: Option<&str>, now: DateTime<Utc>) -> String {
    timestamp
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|then| relative_between(then.with_timezone(&Utc), now))
        .unwrap_or_else(|| "-".to_string())
}

fn relative_between(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }

    let (value, unit) = match secs {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (secs / 60, "minute"),
        3_600..=86_399 => (secs / 3_600, "hour"),
        86_400..=2_591_999 => (secs / 86_400, "day"),
        2_592_000..=31_535_999 => (secs / 2_592_000, "month"),
        _ => (secs / 31_536_000, "year"),
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
