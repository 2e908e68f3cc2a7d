use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One recorded consumption of an inventory item.
///
/// The timestamp is kept as the raw string the caller stored; parsing happens
/// inside the engine so that malformed records can be tolerated per-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionEvent {
    pub timestamp: String,
    pub quantity: u32,
}

impl ConsumptionEvent {
    pub fn new(timestamp: impl Into<String>, quantity: u32) -> Self {
        Self {
            timestamp: timestamp.into(),
            quantity,
        }
    }

    /// Calendar day of the event, or `None` if the timestamp is unreadable.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_event_date(&self.timestamp)
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse an ISO-8601-ish timestamp down to its calendar date.
///
/// Offset-carrying timestamps keep the date as written (in their own offset),
/// not converted to UTC.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_the_stored_timestamp_shapes() {
        assert_eq!(parse_event_date("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_event_date("2024-03-05T14:22:01"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_event_date("2024-03-05 14:22:01"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_event_date("2024-03-05T14:22"), Some(ymd(2024, 3, 5)));
        assert_eq!(
            parse_event_date("2024-03-05T14:22:01.123456"),
            Some(ymd(2024, 3, 5))
        );
        assert_eq!(parse_event_date("  2024-03-05  "), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn offset_timestamps_keep_their_local_date() {
        assert_eq!(
            parse_event_date("2024-03-05T23:30:00-03:00"),
            Some(ymd(2024, 3, 5))
        );
        assert_eq!(parse_event_date("2024-03-05T00:10:00Z"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_event_date(""), None);
        assert_eq!(parse_event_date("yesterday"), None);
        assert_eq!(parse_event_date("2024-13-01"), None);
        assert_eq!(parse_event_date("05/03/2024"), None);
    }

    #[test]
    fn events_deserialize_from_json() {
        let ev: ConsumptionEvent =
            serde_json::from_str(r#"{"timestamp":"2024-03-05T10:00:00","quantity":3}"#).unwrap();
        assert_eq!(ev, ConsumptionEvent::new("2024-03-05T10:00:00", 3));
        assert_eq!(ev.date(), Some(ymd(2024, 3, 5)));
    }
}
