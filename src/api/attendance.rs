use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::engine::backfill::BackfillSummary;
use crate::engine::clock::SystemClock;
use crate::engine::pipeline::{self, ResolvedAttendance};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DashboardQuery {
    /// Civil date to resolve; defaults to today in Manila time
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
    #[schema(example = 7)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<ResolvedAttendance>,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
    pub backfill: BackfillSummary,
}

/// Attendance dashboard
///
/// Runs one full refresh pass (status resolution plus end-of-day backfill)
/// and returns the day's classified records.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Resolved attendance for the requested day", body = AttendanceListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn dashboard(
    pool: web::Data<MySqlPool>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    let report = pipeline::run_refresh(pool.get_ref(), &SystemClock, query.date)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Attendance refresh failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let mut rows = report.rows;
    if let Some(employee_id) = query.employee_id {
        rows.retain(|r| r.employee_id == employee_id);
    }

    // -------------------------
    // Pagination (in memory: the pass already resolved the whole day)
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let total = rows.len() as i64;
    let offset = ((page - 1) * per_page) as usize;
    let data: Vec<ResolvedAttendance> =
        rows.into_iter().skip(offset).take(per_page as usize).collect();

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data,
        date: report.date,
        page: page as u32,
        per_page: per_page as u32,
        total,
        backfill: report.backfill,
    }))
}

/// Explicit refresh trigger
///
/// Same pass as the dashboard, returned as a summary only. Useful for
/// timers and admin tooling that only care about the backfill outcome.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/refresh",
    responses(
        (status = 200, description = "Refresh pass completed", body = Object, example = json!({
            "message": "Refresh complete",
            "rows": 42,
            "backfill": { "planned": 2, "inserted": 2, "failed": 0, "skipped_in_flight": false }
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn refresh(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let report = pipeline::run_refresh(pool.get_ref(), &SystemClock, None)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Attendance refresh failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Refresh complete",
        "rows": report.rows.len(),
        "backfill": report.backfill
    })))
}

/// Administrative delete
///
/// Deletes one persisted attendance row. Synthetic rows carry composite
/// string ids, so they can never match the numeric path parameter.
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance record to delete")
    ),
    responses(
        (status = 200, description = "Attendance record deleted", body = Object, example = json!({
            "message": "Attendance record deleted"
        })),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let attendance_id = path.into_inner();

    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(attendance_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, attendance_id, "Delete attendance failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Attendance record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance record deleted"
    })))
}
