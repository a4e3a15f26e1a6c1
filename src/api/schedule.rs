use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::engine::clock::SystemClock;
use crate::engine::pipeline;
use crate::engine::schedule_match::ScheduleView;

#[derive(Serialize, ToSchema)]
pub struct ScheduleListResponse {
    pub data: Vec<ScheduleView>,
    #[schema(example = 6)]
    pub total: i64,
}

/// Schedule-anchored attendance view
///
/// Every recurring class schedule joined to its most recent attendance
/// event, with holiday and exemption precedence applied to the matched
/// date.
#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    responses(
        (status = 200, description = "Schedules with derived attendance status", body = ScheduleListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedules"
)]
pub async fn schedule_view(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let views = pipeline::run_schedule_view(pool.get_ref(), &SystemClock)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Schedule view pass failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let total = views.len() as i64;
    Ok(HttpResponse::Ok().json(ScheduleListResponse { data: views, total }))
}
