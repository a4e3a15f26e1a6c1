use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::exemption::Exemption;
use crate::model::holiday::Holiday;
use crate::utils::db_utils::placeholders;

/// Per-pass lookup of `(employee, date)` exemptions.
///
/// Built from a single batched query covering every employee and date the
/// pass touches; per-row store lookups are exactly the pattern this index
/// exists to replace.
#[derive(Debug, Default)]
pub struct ExemptionIndex {
    by_key: HashMap<(u64, NaiveDate), Exemption>,
}

impl ExemptionIndex {
    pub fn from_rows(rows: Vec<Exemption>) -> Self {
        let by_key = rows
            .into_iter()
            .map(|e| ((e.employee_id, e.exemption_date), e))
            .collect();
        Self { by_key }
    }

    /// One round-trip for the whole keyset. A store failure degrades to an
    /// empty index: nothing gets exempted, and a later correct refresh
    /// repairs the statuses since the engine is stateless per pass.
    pub async fn load(pool: &MySqlPool, employee_ids: &[u64], dates: &[NaiveDate]) -> Self {
        if employee_ids.is_empty() || dates.is_empty() {
            return Self::default();
        }

        let sql = format!(
            "SELECT employee_id, exemption_date, request_type, start_time, end_time, reason \
             FROM exemptions \
             WHERE employee_id IN ({}) AND exemption_date IN ({})",
            placeholders(employee_ids.len()),
            placeholders(dates.len()),
        );

        let mut query = sqlx::query_as::<_, Exemption>(&sql);
        for id in employee_ids {
            query = query.bind(id);
        }
        for date in dates {
            query = query.bind(date);
        }

        match query.fetch_all(pool).await {
            Ok(rows) => {
                log::info!(
                    "Exemption index loaded: {} rows for {} employees / {} dates",
                    rows.len(),
                    employee_ids.len(),
                    dates.len()
                );
                Self::from_rows(rows)
            }
            Err(e) => {
                tracing::error!(error = %e, "Exemption index load failed, continuing unexempted");
                Self::default()
            }
        }
    }

    pub fn lookup(&self, employee_id: u64, date: NaiveDate) -> Option<&Exemption> {
        self.by_key.get(&(employee_id, date))
    }

    pub fn is_exempted(&self, employee_id: u64, date: NaiveDate) -> bool {
        self.by_key.contains_key(&(employee_id, date))
    }

    /// Employee ids holding any exemption on the given date; feeds the
    /// backfill skip list.
    pub fn exempted_ids_on(&self, date: NaiveDate) -> HashSet<u64> {
        self.by_key
            .keys()
            .filter(|(_, d)| *d == date)
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Per-pass membership set of active holiday dates.
#[derive(Debug, Default)]
pub struct HolidayIndex {
    dates: HashSet<NaiveDate>,
}

impl HolidayIndex {
    pub fn from_rows(rows: Vec<Holiday>) -> Self {
        let dates = rows
            .into_iter()
            .filter(|h| h.is_active)
            .map(|h| h.date)
            .collect();
        Self { dates }
    }

    #[cfg(test)]
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub async fn load(pool: &MySqlPool, dates: &[NaiveDate]) -> Self {
        if dates.is_empty() {
            return Self::default();
        }

        let sql = format!(
            "SELECT id, date, title, is_active FROM holidays \
             WHERE is_active = 1 AND date IN ({})",
            placeholders(dates.len()),
        );

        let mut query = sqlx::query_as::<_, Holiday>(&sql);
        for date in dates {
            query = query.bind(date);
        }

        match query.fetch_all(pool).await {
            Ok(rows) => {
                log::info!("Holiday index loaded: {} active holidays", rows.len());
                Self::from_rows(rows)
            }
            Err(e) => {
                tracing::error!(error = %e, "Holiday index load failed, continuing with none");
                Self::default()
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}
