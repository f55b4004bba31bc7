use super::AttendanceStore;
use crate::{
    error::AppError,
    model::attendance::{
        AttendanceFilter, AttendanceRecord, AttendanceStatus, DailyDetail, DetailFilter,
        HistoryFilter, NewAttendance, PeriodSummary,
    },
};
use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use std::{
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

#[derive(Default)]
struct Table {
    next_id: u64,
    rows: Vec<AttendanceRecord>,
}

/// Process-local attendance table with the same semantics as the MySQL one:
/// the unique `(employee_id, date)` key, and employee ids compared exactly
/// (the MySQL columns use a binary collation).
#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, AppError> {
        Ok(self.read()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, AppError> {
        self.table
            .read()
            .map_err(|_| AppError::Internal(anyhow!("attendance table lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, AppError> {
        self.table
            .write()
            .map_err(|_| AppError::Internal(anyhow!("attendance table lock poisoned")))
    }
}

fn matches_filter(record: &AttendanceRecord, filter: &AttendanceFilter) -> bool {
    if filter.date.is_some_and(|d| d != record.date) {
        return false;
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        if !record.employee_name.to_lowercase().contains(&needle)
            && !record.employee_id.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if !in_period(record, filter.year, filter.month, filter.week) {
        return false;
    }
    if filter
        .employee_id
        .as_deref()
        .is_some_and(|id| id != record.employee_id)
    {
        return false;
    }
    if filter.status.is_some_and(|s| s != record.status) {
        return false;
    }
    true
}

fn in_period(
    record: &AttendanceRecord,
    year: Option<i32>,
    month: Option<i32>,
    week: Option<i32>,
) -> bool {
    year.is_none_or(|y| y == record.year)
        && month.is_none_or(|m| m == record.month)
        && week.is_none_or(|w| w == record.week)
}

impl AttendanceStore for MemoryStore {
    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>, AppError> {
        let table = self.read()?;
        let mut rows: Vec<AttendanceRecord> = table
            .rows
            .iter()
            .filter(|r| matches_filter(r, filter))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn exists(&self, employee_id: &str, date: NaiveDate) -> Result<bool, AppError> {
        let table = self.read()?;
        Ok(table
            .rows
            .iter()
            .any(|r| r.employee_id == employee_id && r.date == date))
    }

    async fn insert(&self, entry: &NewAttendance) -> Result<AttendanceRecord, AppError> {
        let mut table = self.write()?;
        if table
            .rows
            .iter()
            .any(|r| r.employee_id == entry.employee_id && r.date == entry.date)
        {
            return Err(AppError::Duplicate);
        }

        table.next_id += 1;
        let parts = entry.parts();
        let record = AttendanceRecord {
            id: table.next_id,
            employee_name: entry.employee_name.clone(),
            employee_id: entry.employee_id.clone(),
            date: entry.date,
            status: entry.status,
            year: parts.year,
            month: parts.month,
            week: parts.week,
            day: parts.day,
            created_at: Utc::now(),
        };
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: u64) -> Result<Option<AttendanceRecord>, AppError> {
        let mut table = self.write()?;
        let removed = table
            .rows
            .iter()
            .position(|r| r.id == id)
            .map(|idx| table.rows.remove(idx));
        Ok(removed)
    }

    async fn employee_history(
        &self,
        employee_id: &str,
        filter: &HistoryFilter,
    ) -> Result<Vec<PeriodSummary>, AppError> {
        let table = self.read()?;
        let mut periods: BTreeMap<(i32, i32, i32), PeriodSummary> = BTreeMap::new();

        for r in table.rows.iter().filter(|r| {
            r.employee_id == employee_id && in_period(r, filter.year, filter.month, None)
        }) {
            let period = periods
                .entry((r.year, r.month, r.week))
                .or_insert_with(|| PeriodSummary {
                    year: r.year,
                    month: r.month,
                    week: r.week,
                    total_days: 0,
                    present_days: 0,
                    absent_days: 0,
                    period_start: r.date,
                    period_end: r.date,
                });

            period.total_days += 1;
            match r.status {
                AttendanceStatus::Present => period.present_days += 1,
                AttendanceStatus::Absent => period.absent_days += 1,
            }
            period.period_start = period.period_start.min(r.date);
            period.period_end = period.period_end.max(r.date);
        }

        Ok(periods.into_values().rev().collect())
    }

    async fn employee_details(
        &self,
        employee_id: &str,
        filter: &DetailFilter,
    ) -> Result<Vec<DailyDetail>, AppError> {
        let table = self.read()?;
        let mut rows: Vec<DailyDetail> = table
            .rows
            .iter()
            .filter(|r| {
                r.employee_id == employee_id
                    && in_period(r, filter.year, filter.month, filter.week)
            })
            .map(|r| DailyDetail {
                date: r.date,
                status: r.status,
                created_at: r.created_at,
            })
            .collect();

        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }
}
