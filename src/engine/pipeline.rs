use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::engine::backfill::{self, BackfillSummary};
use crate::engine::clock::Clock;
use crate::engine::index::{ExemptionIndex, HolidayIndex};
use crate::engine::resolver::{self, Status};
use crate::engine::schedule_match::{self, ScheduleView};
use crate::engine::session::{self, Session};
use crate::engine::time;
use crate::model::attendance::{AttendanceRow, RecordId};
use crate::model::employee::Employee;
use crate::model::role::Role;
use crate::model::schedule::{ClassAttendanceRecord, Schedule};

/// One dashboard row: the stored record plus everything the engine derived.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResolvedAttendance {
    #[schema(value_type = String, example = "1042")]
    pub id: RecordId,
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "Employee")]
    pub role: String,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, example = "morning")]
    pub session: Option<Session>,
    pub time_in: Option<String>,
    pub time_out: Option<String>,
    #[schema(example = "Present")]
    pub status: Status,
    pub notes: Option<String>,
}

/// Result of one refresh pass.
pub struct RefreshReport {
    pub date: NaiveDate,
    pub rows: Vec<ResolvedAttendance>,
    pub backfill: BackfillSummary,
}

/// One sequential refresh pass: fetch the day's rows, build both indexes
/// with one batched query each, resolve every row, then run the backfill
/// for the current Manila day and merge its inserts into the view.
///
/// Stateless: nothing survives between passes, so a pass built on stale
/// data is fully repaired by the next one.
pub async fn run_refresh(
    pool: &MySqlPool,
    clock: &dyn Clock,
    requested_date: Option<NaiveDate>,
) -> anyhow::Result<RefreshReport> {
    let pass_id = Uuid::new_v4();
    let now = clock.now_utc();
    let today = time::manila_today(now);
    let date = requested_date.unwrap_or(today);
    tracing::info!(pass_id = %pass_id, %date, "Attendance refresh started");

    let rows = fetch_day_rows(pool, date).await?;

    let roster = match backfill::load_tracked_roster(pool).await {
        Ok(roster) => roster,
        Err(e) => {
            tracing::error!(error = %e, "Roster load failed, backfill skipped this pass");
            Vec::new()
        }
    };

    let mut employee_ids: HashSet<u64> = rows.iter().map(|r| r.employee_id).collect();
    employee_ids.extend(roster.iter().map(|e| e.id));
    let employee_ids: Vec<u64> = employee_ids.into_iter().collect();

    let mut dates = vec![date];
    if today != date {
        dates.push(today);
    }

    let holidays = HolidayIndex::load(pool, &dates).await;
    let exemptions = ExemptionIndex::load(pool, &employee_ids, &dates).await;

    let mut resolved: Vec<ResolvedAttendance> = Vec::with_capacity(rows.len());
    for row in rows {
        let employee_name = row.employee_name.clone();
        let role = role_label(row.role_id);
        let record = row.into_record();
        let status = resolver::resolve(&record, &holidays, &exemptions);
        let session = session::classify(&record);
        resolved.push(ResolvedAttendance {
            id: record.id,
            employee_id: record.employee_id,
            employee_name,
            role,
            date: record.date,
            session,
            time_in: record.time_in,
            time_out: record.time_out,
            status,
            notes: record.notes,
        });
    }

    let recorded_today: Option<HashSet<u64>> = if date == today {
        Some(resolved.iter().map(|r| r.employee_id).collect())
    } else {
        match fetch_recorded_ids(pool, today).await {
            Ok(ids) => Some(ids),
            Err(e) => {
                // Without the existence set the insert step cannot stay
                // idempotent, so the write is skipped, not guessed.
                tracing::error!(error = %e, "Could not read today's records, backfill skipped");
                None
            }
        }
    };

    let mut backfill_summary = BackfillSummary::default();
    if let Some(recorded) = recorded_today {
        let by_id: HashMap<u64, &Employee> = roster.iter().map(|e| (e.id, e)).collect();
        let outcome =
            backfill::run_backfill(pool, clock, &holidays, &exemptions, &roster, &recorded).await;
        backfill_summary = outcome.summary;

        if date == today {
            for record in outcome.records {
                let (employee_name, role) = by_id
                    .get(&record.employee_id)
                    .map(|e| (e.full_name(), role_label(e.role_id)))
                    .unwrap_or_default();
                let status = resolver::resolve(&record, &holidays, &exemptions);
                resolved.push(ResolvedAttendance {
                    id: record.id,
                    employee_id: record.employee_id,
                    employee_name,
                    role,
                    date: record.date,
                    session: None,
                    time_in: None,
                    time_out: None,
                    status,
                    notes: record.notes,
                });
            }
        }
    }

    tracing::info!(
        pass_id = %pass_id,
        rows = resolved.len(),
        inserted = backfill_summary.inserted,
        "Attendance refresh complete"
    );

    Ok(RefreshReport {
        date,
        rows: resolved,
        backfill: backfill_summary,
    })
}

/// Schedule-anchored pass for faculty dashboards: every schedule joined to
/// its latest class attendance event, with the indexes built over exactly
/// the reference dates the join produced.
pub async fn run_schedule_view(
    pool: &MySqlPool,
    clock: &dyn Clock,
) -> anyhow::Result<Vec<ScheduleView>> {
    let pass_id = Uuid::new_v4();
    let today = time::manila_today(clock.now_utc());

    let schedules = sqlx::query_as::<_, Schedule>(
        "SELECT id, employee_id, day_of_week, start_time, end_time, subject, room \
         FROM schedules ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let records = sqlx::query_as::<_, ClassAttendanceRecord>(
        "SELECT id, schedule_id, employee_id, att_date, time_in, time_out, status \
         FROM class_attendance",
    )
    .fetch_all(pool)
    .await?;

    let mut dates: HashSet<NaiveDate> = HashSet::from([today]);
    for schedule in &schedules {
        if let Some(latest) = schedule_match::latest_record(schedule.id, &records) {
            dates.insert(latest.att_date);
        }
    }
    let dates: Vec<NaiveDate> = dates.into_iter().collect();
    let employee_ids: Vec<u64> = schedules
        .iter()
        .map(|s| s.employee_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let holidays = HolidayIndex::load(pool, &dates).await;
    let exemptions = ExemptionIndex::load(pool, &employee_ids, &dates).await;

    let views = schedule_match::match_schedules(schedules, &records, &holidays, &exemptions, today);
    tracing::info!(pass_id = %pass_id, schedules = views.len(), "Schedule view pass complete");
    Ok(views)
}

fn role_label(role_id: u8) -> String {
    Role::from_id(role_id)
        .map(|r| r.label().to_string())
        .unwrap_or_default()
}

async fn fetch_day_rows(pool: &MySqlPool, date: NaiveDate) -> anyhow::Result<Vec<AttendanceRow>> {
    let rows = sqlx::query_as::<_, AttendanceRow>(
        "SELECT a.id, a.employee_id, a.date, a.time_in, a.time_out, a.is_present, a.session, a.notes, \
                CONCAT(e.first_name, ' ', e.last_name) AS employee_name, e.role_id \
         FROM attendance a \
         JOIN employees e ON e.id = a.employee_id \
         WHERE a.date = ? \
         ORDER BY a.id",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_recorded_ids(pool: &MySqlPool, date: NaiveDate) -> anyhow::Result<HashSet<u64>> {
    let ids = sqlx::query_scalar::<_, u64>("SELECT employee_id FROM attendance WHERE date = ?")
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().collect())
}
