use chrono::{DateTime, NaiveDateTime};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a service timestamp for display.
///
/// The service emits RFC 3339, naive ISO (`2026-10-19T09:00:00`), or
/// space-separated (`2026-10-19 10:00:00`) timestamps.
pub fn format_timestamp(timestamp: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.format("%b %d, %Y %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, pattern) {
            return dt.format("%b %d, %Y %H:%M").to_string();
        }
    }
    timestamp.to_string()
}

/// Date part only, e.g. for alert deadlines
pub fn format_date(date: &str) -> String {
    let formatted = format_timestamp(date);
    if formatted != date {
        // "Oct 26, 2026 09:00" -> "Oct 26, 2026"
        formatted.chars().take(12).collect()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Thousands separators for trading volume
pub fn format_volume(volume: f64) -> String {
    let rounded = volume.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_timestamp_variants() {
        assert_eq!(format_timestamp("2026-10-19T09:00:00"), "Oct 19, 2026 09:00");
        assert_eq!(format_timestamp("2026-10-19 10:05:00"), "Oct 19, 2026 10:05");
        assert_eq!(format_timestamp("2026-10-19T09:00:00.123456"), "Oct 19, 2026 09:00");
        assert_eq!(format_timestamp("2026-10-19T09:00:00+00:00"), "Oct 19, 2026 09:00");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-10-26T09:00:00"), "Oct 26, 2026");
        assert_eq!(format_date("2026-10-26"), "2026-10-26");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(1_000_000.0), "1,000,000");
        assert_eq!(format_volume(999.0), "999");
        assert_eq!(format_volume(12_345.4), "12,345");
        assert_eq!(format_volume(0.0), "0");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(190.12), "$190.12");
        assert_eq!(format_price(5.0), "$5.00");
    }
}
