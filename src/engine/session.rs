use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::engine::time;
use crate::model::attendance::AttendanceRecord;

/// One of the two daily work windows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Session {
    Morning,
    Afternoon,
}

// Legacy rows tag the session inside free-text notes. The scan below is a
// migration shim; new rows carry the session column.
const MORNING_NOTE_TAG: &str = "Morning session";
const AFTERNOON_NOTE_TAG: &str = "Afternoon session";

/// Determines which session a tap belongs to. First match wins:
/// the stored session column, then the legacy notes tag, then the
/// normalized check-in time. Taps outside both windows stay unclassified.
pub fn classify(record: &AttendanceRecord) -> Option<Session> {
    if let Some(session) = record.session {
        return Some(session);
    }

    if let Some(notes) = record.notes.as_deref() {
        if notes.contains(MORNING_NOTE_TAG) {
            return Some(Session::Morning);
        }
        if notes.contains(AFTERNOON_NOTE_TAG) {
            return Some(Session::Afternoon);
        }
    }

    let minute = time::to_manila_minutes(record.time_in.as_deref())?;
    match minute {
        420..=719 => Some(Session::Morning),    // [07:00, 12:00)
        780..=1139 => Some(Session::Afternoon), // [13:00, 19:00)
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::RecordId;
    use chrono::NaiveDate;

    fn record(
        session: Option<Session>,
        notes: Option<&str>,
        time_in: Option<&str>,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: RecordId::Persisted(1),
            employee_id: 7,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time_in: time_in.map(Into::into),
            time_out: None,
            is_present: None,
            session,
            notes: notes.map(Into::into),
        }
    }

    #[test]
    fn explicit_session_field_wins() {
        let r = record(
            Some(Session::Afternoon),
            Some("Morning session"),
            // 07:05 Manila, would classify as morning.
            Some("2024-02-29T23:05:00Z"),
        );
        assert_eq!(classify(&r), Some(Session::Afternoon));
    }

    #[test]
    fn notes_tag_beats_time_window() {
        let r = record(None, Some("Afternoon session - covered for J."), Some("2024-02-29T23:05:00Z"));
        assert_eq!(classify(&r), Some(Session::Afternoon));
    }

    #[test]
    fn morning_window_by_check_in_time() {
        // 07:05 Manila.
        let r = record(None, None, Some("2024-02-29T23:05:00Z"));
        assert_eq!(classify(&r), Some(Session::Morning));
    }

    #[test]
    fn afternoon_window_by_check_in_time() {
        // 13:30 Manila = 05:30 UTC.
        let r = record(None, None, Some("2024-03-01T05:30:00Z"));
        assert_eq!(classify(&r), Some(Session::Afternoon));
    }

    #[test]
    fn window_edges() {
        // 12:00 Manila is past the morning window.
        let noon = record(None, None, Some("2024-03-01T04:00:00Z"));
        assert_eq!(classify(&noon), None);
        // 19:00 Manila is past the afternoon window.
        let evening = record(None, None, Some("2024-03-01T11:00:00Z"));
        assert_eq!(classify(&evening), None);
        // 11:59 Manila still counts as morning.
        let late_morning = record(None, None, Some("2024-03-01T03:59:00Z"));
        assert_eq!(classify(&late_morning), Some(Session::Morning));
    }

    #[test]
    fn unclassifiable_without_any_signal() {
        assert_eq!(classify(&record(None, None, None)), None);
        assert_eq!(classify(&record(None, Some("covered shift"), None)), None);
        assert_eq!(classify(&record(None, None, Some("garbage"))), None);
    }

    #[test]
    fn session_round_trips_through_store_strings() {
        use std::str::FromStr;
        assert_eq!(Session::from_str("morning").unwrap(), Session::Morning);
        assert_eq!(Session::Afternoon.to_string(), "afternoon");
    }
}
