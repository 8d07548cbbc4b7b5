//! Time normalizer: turns extracted timestamp text into an absolute time.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};

/// `2018-05-04 03:06:43.123 +0100`
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";
/// `2018-05-04 03:06:43.123`, followed by a zone abbreviation
const TIME_FORMAT_NAMED_ZONE: &str = "%Y-%m-%d %H:%M:%S%.f";
/// `2018 May 4 03:06:43` after the current year has been prepended
const SYSLOG_TIME_FORMAT: &str = "%Y %b %d %H:%M:%S";

/// Parse a server timestamp: numeric offset first, zone abbreviation second.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text, TIME_FORMAT)
        .ok()
        .or_else(|| parse_named_zone(text))
}

fn parse_named_zone(text: &str) -> Option<DateTime<FixedOffset>> {
    let (datetime, zone) = text.rsplit_once(' ')?;
    let offset = zone_offset(zone)?;
    let naive = NaiveDateTime::parse_from_str(datetime, TIME_FORMAT_NAMED_ZONE).ok()?;
    naive.and_local_timezone(offset).single()
}

/// Offset for a zone abbreviation, or for a bare `+HH`/`-HHMM` offset as
/// printed for zones without an abbreviation (e.g. `-03`).
///
/// Abbreviations outside the table are taken as UTC: the server prints the
/// abbreviation of its `log_timezone`, and an unknown name still carries a
/// valid wall-clock time.
fn zone_offset(abbreviation: &str) -> Option<FixedOffset> {
    if let Some(offset) = numeric_offset(abbreviation) {
        return Some(offset);
    }
    if abbreviation.is_empty() || !abbreviation.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    let hours = match abbreviation {
        "UTC" | "GMT" | "UT" | "Z" | "WET" => 0,
        "BST" | "CET" | "WEST" => 1,
        "CEST" | "EET" => 2,
        "EEST" | "MSK" => 3,
        "IST" => return FixedOffset::east_opt(5 * 3600 + 1800),
        "JST" | "KST" => 9,
        "AEST" => 10,
        "AEDT" => 11,
        "NZST" => 12,
        "NZDT" => 13,
        "AST" | "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" | "AKDT" => -8,
        "AKST" => -9,
        "HST" => -10,
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600)
}

fn numeric_offset(zone: &str) -> Option<FixedOffset> {
    let sign = match zone.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits = &zone[1..];
    if !matches!(digits.len(), 2 | 4) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = if digits.len() == 4 { digits[2..].parse().ok()? } else { 0 };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse a syslog `Mon D HH:MM:SS` timestamp, which carries no year.
///
/// The year is taken from the clock at parse time, so lines written just
/// before New Year and read just after land a year late.
pub fn parse_syslog_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    parse_syslog_timestamp_in_year(text, Utc::now().year())
}

pub(crate) fn parse_syslog_timestamp_in_year(text: &str, year: i32) -> Option<DateTime<FixedOffset>> {
    // Syslog pads single-digit days with a second space
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let with_year = format!("{} {}", year, normalized);
    let naive = NaiveDateTime::parse_from_str(&with_year, SYSLOG_TIME_FORMAT).ok()?;
    Some(naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_numeric_offset() {
        let ts = parse_timestamp("2018-05-04 03:06:43 +0200").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 7200);
        assert_eq!(ts.with_timezone(&Utc).hour(), 1);
    }

    #[test]
    fn test_fractional_seconds() {
        let ts = parse_timestamp("2018-05-04 03:06:43.512 -0700").unwrap();
        assert_eq!(ts.nanosecond(), 512_000_000);
        assert_eq!(ts.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_named_zone_fallback() {
        let ts = parse_timestamp("2018-05-04 03:06:43 UTC").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts.to_rfc3339(), "2018-05-04T03:06:43+00:00");

        let ts = parse_timestamp("2018-05-04 03:06:43.001 PDT").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_hour_only_offset() {
        let ts = parse_timestamp("2018-05-04 00:06:44 -03").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -3 * 3600);
        assert_eq!(ts.with_timezone(&Utc).hour(), 3);

        let ts = parse_timestamp("2018-05-04 03:06:44.250 +08").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_numeric_offset_with_minutes() {
        assert_eq!(numeric_offset("+0530"), FixedOffset::east_opt(5 * 3600 + 1800));
        assert_eq!(numeric_offset("-0930"), FixedOffset::east_opt(-(9 * 3600 + 1800)));
        assert_eq!(numeric_offset("-3"), None);
        assert_eq!(numeric_offset("+003"), None);
        assert_eq!(numeric_offset("+0575"), None);
        assert_eq!(numeric_offset("03"), None);
    }

    #[test]
    fn test_unknown_abbreviation_is_utc() {
        let ts = parse_timestamp("2018-05-04 03:06:43 XYZT").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_invalid_timestamps() {
        assert!(parse_timestamp("2018-13-04 03:06:43 UTC").is_none());
        assert!(parse_timestamp("2018-05-04 03:06:43 +03x").is_none());
        assert!(parse_timestamp("2018-05-04 03:06:43").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_syslog_year_backfill() {
        let ts = parse_syslog_timestamp("Feb  3 12:00:01").unwrap();
        assert_eq!(ts.year(), Utc::now().year());
        assert_eq!(ts.month(), 2);
        assert_eq!(ts.day(), 3);
    }

    #[test]
    fn test_syslog_explicit_year() {
        let ts = parse_syslog_timestamp_in_year("Oct 11 22:14:15", 2017).unwrap();
        assert_eq!(ts.to_rfc3339(), "2017-10-11T22:14:15+00:00");
        assert!(parse_syslog_timestamp_in_year("Feb 30 22:14:15", 2017).is_none());
    }
}
