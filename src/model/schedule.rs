use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Recurring class assignment owned by a faculty member. Static reference
/// data; the engine never writes schedules.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Schedule {
    #[schema(example = 11)]
    pub id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "Monday")]
    pub day_of_week: String,

    #[schema(example = "07:30")]
    pub start_time: String,

    #[schema(example = "09:00")]
    pub end_time: String,

    #[schema(example = "Mathematics 101")]
    pub subject: String,

    #[schema(example = "Room 204")]
    pub room: Option<String>,
}

/// Tap event tied to one recurring schedule slot. Several may exist per
/// schedule; only the most recent by date is surfaced.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ClassAttendanceRecord {
    #[schema(example = 90)]
    pub id: u64,

    #[schema(example = 11)]
    pub schedule_id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub att_date: NaiveDate,

    pub time_in: Option<String>,
    pub time_out: Option<String>,

    /// Status stamped by the upstream ingestion; adopted verbatim when no
    /// holiday or exemption outranks it.
    #[schema(example = "Present")]
    pub status: String,
}
