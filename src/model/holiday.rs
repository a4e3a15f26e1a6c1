use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Organization-wide non-working day. Only active rows suppress attendance
/// expectations; deactivated holidays stay in the table for history.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Holiday {
    #[schema(example = 3)]
    pub id: u64,

    #[schema(example = "2024-12-25", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "Christmas Day")]
    pub title: String,

    pub is_active: bool,
}
