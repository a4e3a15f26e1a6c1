use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::index::{ExemptionIndex, HolidayIndex};
use crate::engine::resolver::Status;
use crate::model::schedule::{ClassAttendanceRecord, Schedule};

/// One schedule slot joined to its most recent attendance event.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleView {
    pub schedule: Schedule,
    /// Date the displayed status refers to: the latest matched record's
    /// date, or today when the slot has never been tapped.
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub reference_date: NaiveDate,
    #[schema(example = "Present")]
    pub status: String,
    pub record_id: Option<u64>,
}

/// Most recent class attendance event for a schedule. Ties on the same
/// date are broken by the highest id, so the latest insert wins.
pub fn latest_record<'a>(
    schedule_id: u64,
    records: &'a [ClassAttendanceRecord],
) -> Option<&'a ClassAttendanceRecord> {
    records
        .iter()
        .filter(|r| r.schedule_id == schedule_id)
        .max_by_key(|r| (r.att_date, r.id))
}

/// Joins each schedule to its latest attendance event and derives the
/// displayed status with the same holiday-then-exemption precedence the
/// resolver applies. With neither in force the matched record's stored
/// status is adopted verbatim; a never-tapped slot reads `Absent`.
pub fn match_schedules(
    schedules: Vec<Schedule>,
    records: &[ClassAttendanceRecord],
    holidays: &HolidayIndex,
    exemptions: &ExemptionIndex,
    today: NaiveDate,
) -> Vec<ScheduleView> {
    schedules
        .into_iter()
        .map(|schedule| {
            let latest = latest_record(schedule.id, records);
            let reference_date = latest.map(|r| r.att_date).unwrap_or(today);

            let status = if holidays.contains(reference_date)
                || exemptions.is_exempted(schedule.employee_id, reference_date)
            {
                Status::Exempted.to_string()
            } else {
                match latest {
                    Some(record) => record.status.clone(),
                    None => Status::Absent.to_string(),
                }
            };

            ScheduleView {
                reference_date,
                status,
                record_id: latest.map(|r| r.id),
                schedule,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::exemption::Exemption;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn schedule(id: u64, employee_id: u64) -> Schedule {
        Schedule {
            id,
            employee_id,
            day_of_week: "Monday".into(),
            start_time: "07:30".into(),
            end_time: "09:00".into(),
            subject: "Mathematics 101".into(),
            room: Some("Room 204".into()),
        }
    }

    fn record(id: u64, schedule_id: u64, att_date: NaiveDate, status: &str) -> ClassAttendanceRecord {
        ClassAttendanceRecord {
            id,
            schedule_id,
            employee_id: 7,
            att_date,
            time_in: None,
            time_out: None,
            status: status.into(),
        }
    }

    #[test]
    fn latest_record_wins_by_date_then_id() {
        let records = vec![
            record(1, 11, date(1), "Late"),
            record(2, 11, date(3), "Present"),
            record(3, 11, date(2), "Absent"),
            record(4, 12, date(4), "Present"),
        ];
        let latest = latest_record(11, &records).unwrap();
        assert_eq!(latest.id, 2);

        // Same date: the higher id is the later insert.
        let records = vec![record(5, 11, date(3), "Late"), record(6, 11, date(3), "Present")];
        assert_eq!(latest_record(11, &records).unwrap().id, 6);
    }

    #[test]
    fn matched_status_is_adopted_verbatim() {
        let records = vec![record(1, 11, date(1), "Late")];
        let views = match_schedules(
            vec![schedule(11, 7)],
            &records,
            &HolidayIndex::default(),
            &ExemptionIndex::default(),
            date(5),
        );
        assert_eq!(views[0].status, "Late");
        assert_eq!(views[0].reference_date, date(1));
        assert_eq!(views[0].record_id, Some(1));
    }

    #[test]
    fn never_tapped_slot_reads_absent_as_of_today() {
        let views = match_schedules(
            vec![schedule(11, 7)],
            &[],
            &HolidayIndex::default(),
            &ExemptionIndex::default(),
            date(5),
        );
        assert_eq!(views[0].status, "Absent");
        assert_eq!(views[0].reference_date, date(5));
        assert_eq!(views[0].record_id, None);
    }

    #[test]
    fn holiday_on_reference_date_overrides_stored_status() {
        let records = vec![record(1, 11, date(1), "Late")];
        let views = match_schedules(
            vec![schedule(11, 7)],
            &records,
            &HolidayIndex::from_dates([date(1)]),
            &ExemptionIndex::default(),
            date(5),
        );
        assert_eq!(views[0].status, "Exempted");
    }

    #[test]
    fn exemption_on_reference_date_overrides_stored_status() {
        let exemptions = ExemptionIndex::from_rows(vec![Exemption {
            employee_id: 7,
            exemption_date: date(5),
            request_type: "Leave".into(),
            start_time: None,
            end_time: None,
            reason: None,
        }]);
        // No record at all: the reference date falls back to today, where
        // the owner is exempted.
        let views = match_schedules(
            vec![schedule(11, 7)],
            &[],
            &HolidayIndex::default(),
            &exemptions,
            date(5),
        );
        assert_eq!(views[0].status, "Exempted");
    }
}
