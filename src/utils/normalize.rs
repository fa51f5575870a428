use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Trims leading/trailing whitespace; empty results collapse to `None`.
pub fn clean_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Domains are stored trimmed and lowercased.
pub fn normalize_domain(value: &str) -> Option<String> {
    clean_text(value).map(|d| d.to_lowercase())
}

/// Keeps digits only and prefixes `+`; `"(314) 555-0123"` becomes `"+3145550123"`.
pub fn normalize_phone(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("+{}", digits))
    }
}

/// Lenient integer parsing: malformed values become `None`, never errors.
pub fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

pub fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Lenient date parsing for CSV exports: RFC 3339, epoch milliseconds, and a
/// handful of spreadsheet formats. Unparseable values coerce to `None`.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // HubSpot exports timestamps as epoch milliseconds
    if raw.chars().all(|c| c.is_ascii_digit()) && raw.len() >= 12 {
        if let Ok(millis) = raw.parse::<i64>() {
            return DateTime::from_timestamp_millis(millis);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}
