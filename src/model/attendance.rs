use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::engine::session::Session;

/// Identity of an attendance row.
///
/// Store-assigned rows carry a numeric id. Rows synthesized by the backfill
/// job are keyed by `(employee, date)` until the next fetch round-trips them
/// through the store; the composite form keeps them out of reach of the
/// numeric delete route.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RecordId {
    #[display(fmt = "{}", _0)]
    Persisted(u64),
    #[display(fmt = "absent-{}-{}", employee_id, date)]
    Synthetic { employee_id: u64, date: NaiveDate },
}

impl RecordId {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, RecordId::Synthetic { .. })
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One tap-pair per employee per session per day, as the engine sees it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(value_type = String, example = "1042")]
    pub id: RecordId,
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Raw check-in timestamp as stored; normalized lazily by the engine.
    #[schema(example = "2024-02-29T23:05:00Z")]
    pub time_in: Option<String>,
    #[schema(example = "2024-03-01T09:00:00Z")]
    pub time_out: Option<String>,
    /// Explicit presence flag written by the upstream tap-ingestion system.
    pub is_present: Option<bool>,
    #[schema(value_type = Option<String>, example = "morning")]
    pub session: Option<Session>,
    pub notes: Option<String>,
}

impl AttendanceRecord {
    /// A row with no taps and no explicit flag is a pure absence marker.
    pub fn is_absence_marker(&self) -> bool {
        self.time_in.is_none() && self.time_out.is_none() && self.is_present.is_none()
    }

    /// Record shape the backfill job inserts: no taps, explicit absent
    /// flag, explanatory note, composite identity.
    pub fn synthetic_absent(employee_id: u64, date: NaiveDate, note: &str) -> Self {
        Self {
            id: RecordId::Synthetic { employee_id, date },
            employee_id,
            date,
            time_in: None,
            time_out: None,
            is_present: Some(false),
            session: None,
            notes: Some(note.to_string()),
        }
    }
}

/// Raw dashboard row: attendance joined with the minimal employee fields.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub time_in: Option<String>,
    pub time_out: Option<String>,
    pub is_present: Option<bool>,
    pub session: Option<String>,
    pub notes: Option<String>,
    pub employee_name: String,
    pub role_id: u8,
}

impl AttendanceRow {
    pub fn into_record(self) -> AttendanceRecord {
        AttendanceRecord {
            id: RecordId::Persisted(self.id),
            employee_id: self.employee_id,
            date: self.date,
            time_in: self.time_in,
            time_out: self.time_out,
            is_present: self.is_present,
            // Unknown stored values are treated as unclassified.
            session: self.session.as_deref().and_then(|s| Session::from_str(s).ok()),
            notes: self.notes,
        }
    }
}
