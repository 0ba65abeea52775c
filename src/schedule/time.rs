//! Time and date parsing, formatting, and week arithmetic for the booking grid

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

/// A wall-clock time of day in 24-hour form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minutes: u32,
}

impl TimeOfDay {
    pub fn minutes_from_midnight(self) -> u32 {
        self.hour * 60 + self.minutes
    }
}

/// Malformed time/date input is a data error, not a recoverable condition;
/// callers surface it instead of defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("invalid time of day: {0:?}")]
    Time(String),
    #[error("invalid calendar date: {0:?}")]
    Date(String),
    #[error("invalid timestamp: {0:?}")]
    Timestamp(String),
}

/// Parse a 12-hour clock string like "9:00 AM" or "12:30 pm".
/// 12 AM maps to hour 0, 12 PM stays 12, other PM hours add 12.
pub fn parse_time(s: &str) -> Result<TimeOfDay, TimeParseError> {
    let err = || TimeParseError::Time(s.to_string());

    let mut tokens = s.trim().split_whitespace();
    let clock = tokens.next().ok_or_else(err)?;
    let meridiem = tokens.next().ok_or_else(err)?.to_ascii_uppercase();
    if tokens.next().is_some() {
        return Err(err());
    }

    let (h, m) = clock.split_once(':').ok_or_else(err)?;
    let hour12: u32 = h.parse().map_err(|_| err())?;
    let minutes: u32 = m.parse().map_err(|_| err())?;
    if !(1..=12).contains(&hour12) || minutes > 59 {
        return Err(err());
    }

    let hour = match (meridiem.as_str(), hour12) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        ("PM", h) => h + 12,
        _ => return Err(err()),
    };

    Ok(TimeOfDay { hour, minutes })
}

/// Format a 24-hour time as "H:MM AM|PM" with no leading zero on the hour
pub fn format_time(hour: u32, minutes: u32) -> String {
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, minutes, meridiem)
}

/// Parse "YYYY-MM-DD" by component decomposition.
/// Deliberately not locale- or timezone-sensitive: the string names a local
/// calendar day and nothing else.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeParseError> {
    let err = || TimeParseError::Date(s.to_string());

    let mut parts = s.trim().split('-');
    let year: i32 = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let month: u32 = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let day: u32 = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    if parts.next().is_some() {
        return Err(err());
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err)
}

/// Format a date as zero-padded "YYYY-MM-DD"
pub fn format_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// The Monday at or before `date`. Weeks run Monday-Sunday, so a Sunday
/// belongs to the week that started six days earlier.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday();
    date - Duration::days(days_from_monday as i64)
}

/// The seven consecutive dates starting at `start`
pub fn week_dates(start: NaiveDate) -> [NaiveDate; 7] {
    core::array::from_fn(|i| start + Duration::days(i as i64))
}

/// Shift a week anchor by whole weeks
pub fn navigate_week(start: NaiveDate, offset_weeks: i64) -> NaiveDate {
    start + Duration::days(offset_weeks * 7)
}

pub fn is_today(date: NaiveDate) -> bool {
    date == Local::now().date_naive()
}

/// Split a backend ISO-8601 datetime into the local calendar day and a
/// 12-hour time string. Accepts offsets with or without a colon and with or
/// without milliseconds; a bare naive timestamp is taken as already local.
pub fn split_timestamp(stamp: &str) -> Result<(NaiveDate, String), TimeParseError> {
    let normalized = normalize_offset(stamp.trim());

    for fmt in ["%Y-%m-%dT%H:%M:%S%.3f%:z", "%Y-%m-%dT%H:%M:%S%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            let local = dt.with_timezone(&Local);
            return Ok((local.date_naive(), format_time(local.hour(), local.minute())));
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.3f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(stamp.trim(), fmt) {
            return Ok((dt.date(), format_time(dt.hour(), dt.minute())));
        }
    }

    Err(TimeParseError::Timestamp(stamp.to_string()))
}

/// Build the write-path ISO-8601 timestamp from a form date and 12-hour time,
/// carrying the machine's current UTC offset.
pub fn build_timestamp(date: NaiveDate, time: &str) -> Result<String, TimeParseError> {
    let t = parse_time(time)?;

    let local_offset = Local::now().offset().local_minus_utc();
    let sign = if local_offset >= 0 { '+' } else { '-' };
    let offset_hours = (local_offset / 3600).abs();
    let offset_mins = (local_offset.abs() % 3600) / 60;

    Ok(format!(
        "{}T{:02}:{:02}:00{}{:02}:{:02}",
        format_date(date),
        t.hour,
        t.minutes,
        sign,
        offset_hours,
        offset_mins
    ))
}

/// Normalize a "+0530"-style offset to "+05:30" so chrono can parse it
fn normalize_offset(stamp: &str) -> String {
    if stamp.len() > 5 {
        let bytes = stamp.as_bytes();
        let len = bytes.len();
        if (bytes[len - 5] == b'+' || bytes[len - 5] == b'-')
            && bytes[len - 4].is_ascii_digit()
            && bytes[len - 3].is_ascii_digit()
            && bytes[len - 2].is_ascii_digit()
            && bytes[len - 1].is_ascii_digit()
        {
            return format!("{}:{}", &stamp[..len - 2], &stamp[len - 2..]);
        }
    }
    stamp.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn parses_twelve_hour_times() {
        assert_eq!(parse_time("9:00 AM"), Ok(TimeOfDay { hour: 9, minutes: 0 }));
        assert_eq!(parse_time("12:00 AM"), Ok(TimeOfDay { hour: 0, minutes: 0 }));
        assert_eq!(parse_time("12:30 PM"), Ok(TimeOfDay { hour: 12, minutes: 30 }));
        assert_eq!(parse_time("11:45 PM"), Ok(TimeOfDay { hour: 23, minutes: 45 }));
        assert_eq!(parse_time("2:15 pm"), Ok(TimeOfDay { hour: 14, minutes: 15 }));
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "9:00", "9 AM", "13:00 PM", "0:30 AM", "9:60 AM", "9:00 AM extra"] {
            assert!(parse_time(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn time_round_trips_without_leading_zero() {
        for s in ["9:00 AM", "9:05 AM", "12:00 AM", "12:00 PM", "4:45 PM", "11:59 PM"] {
            let t = parse_time(s).unwrap();
            assert_eq!(format_time(t.hour, t.minutes), s);
        }
        // A leading zero normalizes away on the way back out
        let t = parse_time("09:30 AM").unwrap();
        assert_eq!(format_time(t.hour, t.minutes), "9:30 AM");
    }

    #[test]
    fn date_decomposition_round_trips() {
        let d = parse_date("2026-08-04").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 8, 4).unwrap());
        assert_eq!(format_date(d), "2026-08-04");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()), "2026-03-05");
        assert!(parse_date("2026/08/04").is_err());
        assert!(parse_date("2026-13-01").is_err());
    }

    #[test]
    fn week_starts_are_mondays() {
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        // Sunday belongs to the week that began the previous Monday
        assert_eq!(week_start(sunday), monday);
        assert_eq!(week_start(monday), monday);
        assert_eq!(week_start(week_start(sunday)), week_start(sunday));

        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        assert_eq!(week_start(tuesday), NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert_eq!(week_start(tuesday).weekday(), Weekday::Mon);
    }

    #[test]
    fn week_navigation_is_reversible() {
        let ws = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        assert_eq!(navigate_week(navigate_week(ws, 1), -1), ws);
        assert_eq!(navigate_week(ws, 2), NaiveDate::from_ymd_opt(2026, 8, 17).unwrap());

        let days = week_dates(ws);
        assert_eq!(days[0], ws);
        assert_eq!(days[6], NaiveDate::from_ymd_opt(2026, 8, 9).unwrap());
    }

    #[test]
    fn splits_naive_timestamps() {
        let (date, time) = split_timestamp("2026-03-02T09:30:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(time, "9:30 AM");

        let (_, time) = split_timestamp("2026-03-02T14:05:00.000").unwrap();
        assert_eq!(time, "2:05 PM");

        assert!(split_timestamp("yesterday").is_err());
    }

    #[test]
    fn builds_wire_timestamps() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let stamp = build_timestamp(date, "2:30 PM").unwrap();
        assert!(stamp.starts_with("2026-08-04T14:30:00"));
        assert!(stamp.contains('+') || stamp.contains('-'));
        assert!(build_timestamp(date, "2:30").is_err());
    }
}
