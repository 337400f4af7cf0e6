//! Lenient date parsing for spoken answers and wire payloads.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid regex"));

const SPOKEN_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

/// Parses what a user is likely to say or type for a booking date:
/// "25 December 2025", "December 25th, 2025", "2025-12-25", "25/12/2025".
pub fn parse_booking_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.date_naive());
    }

    let cleaned = ORDINAL_SUFFIX.replace_all(trimmed, "$1").replace(',', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    SPOKEN_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

/// Date-times without an offset, as browsers and `<input type="datetime-local">` send them.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses an instant from RFC 3339, or a bare `YYYY-MM-DD` taken as UTC midnight.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    parse_instant_in(text, Utc.fix())
}

/// Like [`parse_instant`], but a date-time without an offset is read as local
/// time in `offset`. A bare date stays UTC midnight.
pub fn parse_instant_in(text: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return offset
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn christmas() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()
    }

    #[test]
    fn spoken_forms() {
        assert_eq!(parse_booking_date("25 December 2025"), Some(christmas()));
        assert_eq!(parse_booking_date("25th december 2025"), Some(christmas()));
        assert_eq!(parse_booking_date("December 25th, 2025"), Some(christmas()));
        assert_eq!(parse_booking_date("Dec 25 2025"), Some(christmas()));
        assert_eq!(parse_booking_date("25/12/2025"), Some(christmas()));
    }

    #[test]
    fn machine_forms() {
        assert_eq!(parse_booking_date("2025-12-25"), Some(christmas()));
        assert_eq!(parse_booking_date("2025-12-25T18:30:00Z"), Some(christmas()));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_booking_date(""), None);
        assert_eq!(parse_booking_date("next friday"), None);
        assert_eq!(parse_booking_date("31 February 2025"), None);
    }

    #[test]
    fn instants() {
        let at = parse_instant("2025-12-25T00:00:00.000Z").unwrap();
        assert_eq!(at.date_naive(), christmas());
        let bare = parse_instant("2025-12-25").unwrap();
        assert_eq!(bare.to_rfc3339(), "2025-12-25T00:00:00+00:00");
        assert!(parse_instant("yesterday").is_none());
    }

    #[test]
    fn naive_date_times_use_the_local_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let at = parse_instant_in("2025-12-25T12:00:00", ist).unwrap();
        assert_eq!(at.to_rfc3339(), "2025-12-25T06:30:00+00:00");
        let short = parse_instant_in("2025-12-25T00:15", ist).unwrap();
        assert_eq!(short.to_rfc3339(), "2025-12-24T18:45:00+00:00");

        let utc = parse_instant("2025-12-25T12:00:00.250").unwrap();
        assert_eq!(utc.timestamp_millis() % 1000, 250);

        // Explicit offsets and bare dates ignore the local offset.
        let explicit = parse_instant_in("2025-12-25T12:00:00Z", ist).unwrap();
        assert_eq!(explicit.to_rfc3339(), "2025-12-25T12:00:00+00:00");
        let bare = parse_instant_in("2025-12-25", ist).unwrap();
        assert_eq!(bare.to_rfc3339(), "2025-12-25T00:00:00+00:00");
    }
}
