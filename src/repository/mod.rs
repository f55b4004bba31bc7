//! Storage seam for attendance records.
//!
//! Handlers are generic over [`AttendanceStore`], so the same routes run
//! against MySQL in production and against [`MemoryStore`] in tests or when
//! the service is started without a database.

mod memory;
mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

use crate::{
    error::AppError,
    model::attendance::{
        AttendanceFilter, AttendanceRecord, DailyDetail, DetailFilter, HistoryFilter,
        NewAttendance, PeriodSummary,
    },
};
use chrono::NaiveDate;
use std::future::Future;

pub trait AttendanceStore: Send + Sync + 'static {
    /// Records matching every set filter, newest date first, then newest insert first.
    fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> impl Future<Output = Result<Vec<AttendanceRecord>, AppError>> + Send;

    /// Whether a record already exists for this employee on this date.
    fn exists(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Inserts the entry and returns the stored row with its generated id and timestamp.
    ///
    /// A second entry for the same `(employee_id, date)` fails with
    /// [`AppError::Duplicate`] or a unique-key database error.
    fn insert(
        &self,
        entry: &NewAttendance,
    ) -> impl Future<Output = Result<AttendanceRecord, AppError>> + Send;

    /// Removes a record and returns it, or `None` when the id is unknown.
    fn delete(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Option<AttendanceRecord>, AppError>> + Send;

    /// Per `(year, month, week)` totals for one employee, newest period first.
    fn employee_history(
        &self,
        employee_id: &str,
        filter: &HistoryFilter,
    ) -> impl Future<Output = Result<Vec<PeriodSummary>, AppError>> + Send;

    /// Daily rows for one employee, newest date first.
    fn employee_details(
        &self,
        employee_id: &str,
        filter: &DetailFilter,
    ) -> impl Future<Output = Result<Vec<DailyDetail>, AppError>> + Send;
}
