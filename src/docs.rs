use crate::api::attendance::{AttendanceListResponse, DashboardQuery};
use crate::api::schedule::ScheduleListResponse;
use crate::engine::backfill::BackfillSummary;
use crate::engine::pipeline::ResolvedAttendance;
use crate::engine::resolver::Status;
use crate::engine::schedule_match::ScheduleView;
use crate::engine::session::Session;
use crate::model::schedule::Schedule;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Engine API",
        version = "1.0.0",
        description = r#"
## Attendance Status Resolution & Backfill

This API powers the attendance dashboards of an HR administration system.

### 🔹 Key Features
- **Status Resolution**
  - Classifies raw time-clock taps as Present / Late / Absent / Exempted
  - Fixed Manila work calendar with per-session grace periods
  - Holidays and approved exemptions outrank tap data
- **End-of-day Backfill**
  - Synthesizes Absent records for employees with no taps past the cutoff
  - Idempotent: safe to run on every dashboard refresh
- **Schedule View**
  - Joins recurring class schedules to their latest attendance event

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for the dashboard endpoint

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::dashboard,
        crate::api::attendance::refresh,
        crate::api::attendance::delete_attendance,

        crate::api::schedule::schedule_view,
    ),
    components(schemas(
        AttendanceListResponse,
        DashboardQuery,
        ResolvedAttendance,
        BackfillSummary,
        ScheduleListResponse,
        ScheduleView,
        Schedule,
        Session,
        Status,
    )),
    tags(
        (name = "Attendance", description = "Resolved attendance dashboard, refresh and admin delete"),
        (name = "Schedules", description = "Schedule-anchored attendance view")
    )
)]
pub struct ApiDoc;
