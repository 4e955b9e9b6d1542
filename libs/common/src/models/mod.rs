//! Portfolio API models

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub mod auth;
pub mod message;
pub mod post;
pub mod project;

// Re-export for convenience
pub use auth::{ErrorBody, Identity, LoginRequest, TokenResponse};
pub use message::Message;
pub use post::{Post, PostDraft};
pub use project::{Project, ProjectDraft};

/// Parse a timestamp as sent by the API
///
/// Accepts RFC 3339, naive ISO 8601 date-times (read as UTC) and bare dates
/// (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 8);

        let naive = parse_timestamp("2024-03-01T10:30:00.123456").unwrap();
        assert_eq!(naive.hour(), 10);

        let date = parse_timestamp("2024-03-01").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 1));

        assert!(parse_timestamp("yesterday").is_none());
    }
}
