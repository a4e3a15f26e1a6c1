use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::engine::index::{ExemptionIndex, HolidayIndex};
use crate::engine::time;
use crate::model::attendance::AttendanceRecord;

/// Classified outcome for one attendance record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum Status {
    Present,
    Late,
    Absent,
    Exempted,
}

/// Session windows in Manila wall-clock minutes.
pub const MORNING_START: u32 = 420; // 07:00
pub const MORNING_GRACE_END: u32 = 435; // 07:15, last on-time minute
pub const MORNING_WINDOW_END: u32 = 720; // 12:00
pub const AFTERNOON_START: u32 = 780; // 13:00
pub const AFTERNOON_GRACE_END: u32 = 795; // 13:15
pub const DAY_END: u32 = 1140; // 19:00

/// Classifies one record against the day's holiday and exemption lookups.
///
/// Precedence, each check short-circuiting: holiday, then exemption, then
/// the explicit absent flag, then no-activity, then tap-based evaluation.
/// A completed tap pair resolves `Present` regardless of how late the
/// check-in was; only a check-in with no check-out can be `Late`. A
/// check-out with no check-in is not penalized.
pub fn resolve(
    record: &AttendanceRecord,
    holidays: &HolidayIndex,
    exemptions: &ExemptionIndex,
) -> Status {
    if holidays.contains(record.date) {
        return Status::Exempted;
    }
    if exemptions.is_exempted(record.employee_id, record.date) {
        return Status::Exempted;
    }
    if record.is_present == Some(false) {
        return Status::Absent;
    }

    let has_in = record.time_in.is_some();
    let has_out = record.time_out.is_some();
    if !has_in && !has_out {
        return Status::Absent;
    }

    let late = is_late(time::to_manila_minutes(record.time_in.as_deref()));
    match (has_in, has_out) {
        (true, true) => Status::Present,
        (true, false) if late => Status::Late,
        (true, false) => Status::Present,
        (false, true) => Status::Present,
        (false, false) => Status::Absent,
    }
}

/// Lateness of a normalized check-in minute. Inside a session window the
/// grace boundary decides; outside both windows any tap is late. An
/// unparseable tap carries no lateness information.
fn is_late(minute: Option<u32>) -> bool {
    match minute {
        Some(m) if (MORNING_START..=MORNING_WINDOW_END).contains(&m) => m > MORNING_GRACE_END,
        Some(m) if (AFTERNOON_START..=DAY_END).contains(&m) => m > AFTERNOON_GRACE_END,
        Some(_) => true,
        None => false,
    }
}
