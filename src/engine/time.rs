use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use once_cell::sync::Lazy;

/// Manila is UTC+8 year-round with no DST, so a fixed offset is exact.
pub static MANILA: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(8 * 3600).expect("UTC+8 is a valid offset"));

/// Normalizes a raw store timestamp into wall-clock minutes after midnight
/// in Manila time (`0..=1439`).
///
/// Accepted inputs, in order:
/// - RFC 3339 datetimes carrying their own offset
/// - datetimes without any offset marker (stored as UTC by convention)
/// - bare `YYYY-MM-DD` dates, read as UTC midnight
///
/// Anything absent or unparseable yields `None`; callers treat that as
/// "no information", never as an error.
pub fn to_manila_minutes(raw: Option<&str>) -> Option<u32> {
    let utc = parse_utc(raw?)?;
    let local = utc.with_timezone(&*MANILA);
    Some(local.hour() * 60 + local.minute())
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // No offset marker: the store writes these as UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// Current civil date in Manila, independent of the host timezone.
pub fn manila_today(now_utc: DateTime<Utc>) -> NaiveDate {
    now_utc.with_timezone(&*MANILA).date_naive()
}

/// Current Manila wall-clock minute of day.
pub fn manila_minute_of_day(now_utc: DateTime<Utc>) -> u32 {
    let local = now_utc.with_timezone(&*MANILA);
    local.hour() * 60 + local.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_and_explicit_utc_agree() {
        let naive = to_manila_minutes(Some("2024-03-01T23:05:00"));
        let zulu = to_manila_minutes(Some("2024-03-01T23:05:00Z"));
        assert_eq!(naive, zulu);
        // 23:05 UTC is 07:05 the next morning in Manila.
        assert_eq!(naive, Some(7 * 60 + 5));
    }

    #[test]
    fn offset_input_is_converted() {
        // 07:30 Manila expressed with its own offset.
        assert_eq!(
            to_manila_minutes(Some("2024-03-01T07:30:00+08:00")),
            Some(7 * 60 + 30)
        );
        // Same instant expressed in UTC.
        assert_eq!(
            to_manila_minutes(Some("2024-02-29T23:30:00Z")),
            Some(7 * 60 + 30)
        );
    }

    #[test]
    fn bare_date_is_utc_midnight() {
        // 00:00 UTC is 08:00 in Manila.
        assert_eq!(to_manila_minutes(Some("2024-03-01")), Some(8 * 60));
    }

    #[test]
    fn space_separated_datetime_parses() {
        assert_eq!(
            to_manila_minutes(Some("2024-03-01 23:05:00")),
            Some(7 * 60 + 5)
        );
    }

    #[test]
    fn garbage_and_absent_input_yield_none() {
        assert_eq!(to_manila_minutes(None), None);
        assert_eq!(to_manila_minutes(Some("")), None);
        assert_eq!(to_manila_minutes(Some("   ")), None);
        assert_eq!(to_manila_minutes(Some("not-a-timestamp")), None);
        assert_eq!(to_manila_minutes(Some("2024-13-99T07:00:00")), None);
    }

    #[test]
    fn manila_civil_day_rolls_over_before_utc() {
        // 17:00 UTC on the 1st is already 01:00 on the 2nd in Manila.
        let now = DateTime::parse_from_rfc3339("2024-03-01T17:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            manila_today(now),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        assert_eq!(manila_minute_of_day(now), 60);
    }
}
