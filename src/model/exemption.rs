use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

/// Approved leave or partial-day carve-out for one employee on one date.
/// Read-only input to the engine; the request/approval workflow that
/// produces these rows lives upstream.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Exemption {
    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub exemption_date: NaiveDate,

    #[schema(example = "Leave")]
    pub request_type: String,

    /// Start of a time-bounded carve-out; absent for full-day leave.
    pub start_time: Option<String>,
    pub end_time: Option<String>,

    #[schema(example = "Medical appointment")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExemptionKind {
    FullDay,
    TimeSpecific,
}

impl Exemption {
    /// "Leave" requests and requests with no time bounds at all cover the
    /// whole day; everything else carves out a window.
    pub fn kind(&self) -> ExemptionKind {
        if self.request_type == "Leave" || (self.start_time.is_none() && self.end_time.is_none()) {
            ExemptionKind::FullDay
        } else {
            ExemptionKind::TimeSpecific
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exemption(request_type: &str, start: Option<&str>, end: Option<&str>) -> Exemption {
        Exemption {
            employee_id: 7,
            exemption_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            request_type: request_type.into(),
            start_time: start.map(Into::into),
            end_time: end.map(Into::into),
            reason: None,
        }
    }

    #[test]
    fn leave_is_full_day_even_with_time_bounds() {
        let e = exemption("Leave", Some("08:00"), Some("12:00"));
        assert_eq!(e.kind(), ExemptionKind::FullDay);
    }

    #[test]
    fn unbounded_request_is_full_day() {
        let e = exemption("Gate Pass", None, None);
        assert_eq!(e.kind(), ExemptionKind::FullDay);
    }

    #[test]
    fn bounded_non_leave_request_is_time_specific() {
        let e = exemption("Gate Pass", Some("13:00"), Some("15:00"));
        assert_eq!(e.kind(), ExemptionKind::TimeSpecific);
        assert_eq!(e.kind().to_string(), "time_specific");
    }
}
