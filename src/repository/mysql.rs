use super::AttendanceStore;
use crate::{
    error::AppError,
    model::attendance::{
        AttendanceFilter, AttendanceRecord, AttendanceStatus, DailyDetail, DetailFilter,
        HistoryFilter, NewAttendance, PeriodSummary,
    },
    utils::db_utils::{SqlValue, WhereClause, bind_values, like_contains},
};
use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, info};

const RECORD_COLUMNS: &str =
    "id, employee_name, employee_id, date, status, year, month, week, day, created_at";

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    employee_name: String,
    employee_id: String,
    date: NaiveDate,
    status: String,
    year: i32,
    month: i32,
    week: i32,
    day: i32,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct DailyRow {
    date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
}

fn parse_status(raw: &str) -> Result<AttendanceStatus, AppError> {
    raw.parse().map_err(|err: strum::ParseError| {
        AppError::Internal(anyhow!("unexpected attendance status {raw:?} in database: {err}"))
    })
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(AttendanceRecord {
            status: parse_status(&row.status)?,
            id: row.id,
            employee_name: row.employee_name,
            employee_id: row.employee_id,
            date: row.date,
            year: row.year,
            month: row.month,
            week: row.week,
            day: row.day,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DailyRow> for DailyDetail {
    type Error = AppError;

    fn try_from(row: DailyRow) -> Result<Self, Self::Error> {
        Ok(DailyDetail {
            date: row.date,
            status: parse_status(&row.status)?,
            created_at: row.created_at,
        })
    }
}

// -------------------- SQL builders --------------------

pub(crate) fn list_sql(filter: &AttendanceFilter) -> (String, Vec<SqlValue>) {
    let mut clause = WhereClause::new();
    clause.and_opt("date = ?", filter.date);
    if let Some(search) = &filter.search {
        clause.and_repeated(
            "(LOWER(employee_name) LIKE ? OR LOWER(employee_id) LIKE ?)",
            like_contains(&search.to_lowercase()),
        );
    }
    clause
        .and_opt("year = ?", filter.year)
        .and_opt("month = ?", filter.month)
        .and_opt("week = ?", filter.week)
        .and_opt("employee_id = ?", filter.employee_id.clone())
        .and_opt("status = ?", filter.status.map(|s| s.to_string()));

    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance {} ORDER BY date DESC, created_at DESC, id DESC",
        clause.to_sql()
    );
    (sql, clause.into_values())
}

pub(crate) fn history_sql(employee_id: &str, filter: &HistoryFilter) -> (String, Vec<SqlValue>) {
    let mut clause = WhereClause::new();
    clause
        .and("employee_id = ?", employee_id)
        .and_opt("year = ?", filter.year)
        .and_opt("month = ?", filter.month);

    let sql = format!(
        r#"
        SELECT
            year,
            month,
            week,
            COUNT(*) AS total_days,
            CAST(SUM(CASE WHEN status = 'Present' THEN 1 ELSE 0 END) AS SIGNED) AS present_days,
            CAST(SUM(CASE WHEN status = 'Absent' THEN 1 ELSE 0 END) AS SIGNED) AS absent_days,
            MIN(date) AS period_start,
            MAX(date) AS period_end
        FROM attendance
        {}
        GROUP BY year, month, week
        ORDER BY year DESC, month DESC, week DESC
        "#,
        clause.to_sql()
    );
    (sql, clause.into_values())
}

pub(crate) fn details_sql(employee_id: &str, filter: &DetailFilter) -> (String, Vec<SqlValue>) {
    let mut clause = WhereClause::new();
    clause
        .and("employee_id = ?", employee_id)
        .and_opt("year = ?", filter.year)
        .and_opt("month = ?", filter.month)
        .and_opt("week = ?", filter.week);

    let sql = format!(
        "SELECT date, status, created_at FROM attendance {} ORDER BY date DESC",
        clause.to_sql()
    );
    (sql, clause.into_values())
}

// -------------------- Store --------------------

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: u64) -> Result<Option<AttendanceRecord>, AppError> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE id = ?");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }
}

impl AttendanceStore for MySqlStore {
    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>, AppError> {
        let (sql, values) = list_sql(filter);
        debug!(sql = %sql, bindings = ?values, "Fetching attendance records");

        let rows = bind_values(sqlx::query_as::<_, AttendanceRow>(&sql), values)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn exists(&self, employee_id: &str, date: NaiveDate) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM attendance WHERE employee_id = ? AND date = ? LIMIT 1",
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn insert(&self, entry: &NewAttendance) -> Result<AttendanceRecord, AppError> {
        let parts = entry.parts();

        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (employee_name, employee_id, date, status, year, month, week, day)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.employee_name.as_str())
        .bind(entry.employee_id.as_str())
        .bind(entry.date)
        .bind(entry.status.as_ref())
        .bind(parts.year)
        .bind(parts.month)
        .bind(parts.week)
        .bind(parts.day)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        info!(id, employee_id = %entry.employee_id, date = %entry.date, "Attendance recorded");

        self.fetch_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow!("attendance {id} missing right after insert")))
    }

    async fn delete(&self, id: u64) -> Result<Option<AttendanceRecord>, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE id = ? FOR UPDATE");
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(id, "Attendance deleted");
        AttendanceRecord::try_from(row).map(Some)
    }

    async fn employee_history(
        &self,
        employee_id: &str,
        filter: &HistoryFilter,
    ) -> Result<Vec<PeriodSummary>, AppError> {
        let (sql, values) = history_sql(employee_id, filter);
        debug!(sql = %sql, bindings = ?values, "Aggregating employee history");

        let periods = bind_values(sqlx::query_as::<_, PeriodSummary>(&sql), values)
            .fetch_all(&self.pool)
            .await?;
        Ok(periods)
    }

    async fn employee_details(
        &self,
        employee_id: &str,
        filter: &DetailFilter,
    ) -> Result<Vec<DailyDetail>, AppError> {
        let (sql, values) = details_sql(employee_id, filter);
        debug!(sql = %sql, bindings = ?values, "Fetching employee daily details");

        let rows = bind_values(sqlx::query_as::<_, DailyRow>(&sql), values)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(DailyDetail::try_from).collect()
    }
}
