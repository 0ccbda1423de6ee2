// crates/feed-reader/src/date.rs
//! Timestamp parsing for the date profiles feeds use

use crate::error::{FeedError, FeedResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A family of timestamp syntaxes a feed format dictates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateProfile {
    /// RFC 3339 (Atom 1.0), fractional seconds allowed
    Rfc3339,
    /// W3C date-time profile of ISO 8601 (Atom 0.3, Dublin Core)
    W3cdtf,
    /// RFC 822 / RFC 2822 (RSS)
    Rfc822,
}

impl DateProfile {
    /// Every profile, in the order lenient parsing tries them
    pub const ALL: [DateProfile; 3] = [DateProfile::Rfc3339, DateProfile::W3cdtf, DateProfile::Rfc822];

    /// Parses `value` if it matches this profile
    pub fn parse(self, value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        match self {
            DateProfile::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateProfile::W3cdtf => parse_w3cdtf(value),
            DateProfile::Rfc822 => parse_rfc822(value),
        }
    }
}

const W3CDTF_ZONED: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];
const W3CDTF_LOCAL: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_w3cdtf(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let zoned = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => value.to_string(),
    };
    for format in W3CDTF_ZONED {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in W3CDTF_LOCAL {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    // Reduced precision: YYYY-MM-DD, YYYY-MM, YYYY
    let padded = match value.len() {
        4 => format!("{}-01-01", value),
        7 => format!("{}-01", value),
        _ => value.to_string(),
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

const RFC822_FALLBACK: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S%.f %z",
    "%d %b %Y %H:%M:%S%.f %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M %z",
];

fn parse_rfc822(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    RFC822_FALLBACK
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses `value` with the first matching profile
pub fn parse_date(value: &str, profiles: &[DateProfile]) -> FeedResult<DateTime<Utc>> {
    profiles
        .iter()
        .find_map(|profile| profile.parse(value))
        .ok_or_else(|| {
            FeedError::DateParse(format!("'{}' matches none of {:?}", value.trim(), profiles))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2009, 3, 7, 8, 3, 50).unwrap()
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(DateProfile::Rfc3339.parse("2009-03-07T08:03:50Z"), Some(expected()));
        assert_eq!(
            DateProfile::Rfc3339.parse("2009-03-07T09:03:50+01:00"),
            Some(expected())
        );
    }

    #[test]
    fn test_rfc3339_fractional_seconds() {
        assert_eq!(
            DateProfile::Rfc3339.parse("2009-03-07T08:03:50.80Z"),
            Some(expected() + Duration::milliseconds(800))
        );
    }

    #[test]
    fn test_rfc3339_is_strict() {
        assert_eq!(DateProfile::Rfc3339.parse("Sat, 07 Mar 2009 08:03:50 +0000"), None);
        assert_eq!(DateProfile::Rfc3339.parse("2009-03-07"), None);
    }

    #[test]
    fn test_w3cdtf_reduced_precision() {
        let midnight = Utc.with_ymd_and_hms(2009, 3, 7, 0, 0, 0).unwrap();
        assert_eq!(DateProfile::W3cdtf.parse("2009-03-07"), Some(midnight));
        assert_eq!(
            DateProfile::W3cdtf.parse("2009-03"),
            Some(Utc.with_ymd_and_hms(2009, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            DateProfile::W3cdtf.parse("2009"),
            Some(Utc.with_ymd_and_hms(2009, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            DateProfile::W3cdtf.parse("2009-03-07T08:03Z"),
            Some(Utc.with_ymd_and_hms(2009, 3, 7, 8, 3, 0).unwrap())
        );
        assert_eq!(DateProfile::W3cdtf.parse("2009-03-07T08:03:50"), Some(expected()));
    }

    #[test]
    fn test_rfc822() {
        assert_eq!(DateProfile::Rfc822.parse("Sat, 07 Mar 2009 08:03:50 +0000"), Some(expected()));
        assert_eq!(DateProfile::Rfc822.parse("Sat, 07 Mar 2009 08:03:50 GMT"), Some(expected()));
        assert_eq!(DateProfile::Rfc822.parse("07 Mar 2009 08:03:50 +0000"), Some(expected()));
        assert_eq!(
            DateProfile::Rfc822.parse("Sat, 07 Mar 2009 08:03:50.80 +0000"),
            Some(expected() + Duration::milliseconds(800))
        );
    }

    #[test]
    fn test_parse_date_tries_profiles_in_order() {
        let profiles = [DateProfile::W3cdtf, DateProfile::Rfc822];
        assert_eq!(parse_date("2009-03-07T08:03:50Z", &profiles).expect("Should parse"), expected());
        assert_eq!(
            parse_date("Sat, 07 Mar 2009 08:03:50 GMT", &profiles).expect("Should parse"),
            expected()
        );
    }

    #[test]
    fn test_parse_date_error() {
        let result = parse_date("not a date", &[DateProfile::Rfc3339]);
        assert!(matches!(result, Err(FeedError::DateParse(ref msg)) if msg.contains("not a date")));
    }
}
