//! Time related utils.

use chrono::Utc;

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time as unix timestamp in seconds: "1452846289"
pub fn format_timestamp(t: DateTime) -> String {
    t.timestamp().to_string()
}

/// Parse a unix timestamp in seconds.
pub fn parse_timestamp(s: &str) -> crate::Result<DateTime> {
    let secs: i64 = s
        .parse()
        .map_err(|e| crate::Error::spec_invalid(format!("invalid timestamp {s:?}: {e}")))?;

    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| crate::Error::spec_invalid(format!("timestamp {s} is out of range")))
}
