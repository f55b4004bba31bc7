use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Allowed values of the `status` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_name": "John Doe",
        "employee_id": "EMP-001",
        "date": "2026-01-05",
        "status": "Present",
        "year": 2026,
        "month": 1,
        "week": 2,
        "day": 5,
        "created_at": "2026-01-05T08:30:00Z"
    })
)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub employee_name: String,

    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub status: AttendanceStatus,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = 1)]
    pub month: i32,

    #[schema(example = 2)]
    pub week: i32,

    #[schema(example = 5)]
    pub day: i32,

    #[schema(example = "2026-01-05T08:30:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// One `(year, month, week)` bucket of an employee's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PeriodSummary {
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 1)]
    pub month: i32,
    #[schema(example = 2)]
    pub week: i32,
    #[schema(example = 5)]
    pub total_days: i64,
    #[schema(example = 4)]
    pub present_days: i64,
    #[schema(example = 1)]
    pub absent_days: i64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub period_start: NaiveDate,
    #[schema(example = "2026-01-09", value_type = String, format = "date")]
    pub period_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyDetail {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = "2026-01-05T08:30:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Denormalized date columns stored next to `date`.
///
/// `week` is the ISO-8601 week number while `year` stays the calendar year,
/// so the last days of December can land in week 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: i32,
    pub week: i32,
    pub day: i32,
}

impl DateParts {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month() as i32,
            week: date.iso_week().week() as i32,
            day: date.day() as i32,
        }
    }
}

/// A validated attendance entry ready to be stored.
///
/// Serializes with the field names the creation endpoint accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAttendance {
    #[serde(rename = "employeeName")]
    pub employee_name: String,
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    pub status: AttendanceStatus,
    pub date: NaiveDate,
}

impl NewAttendance {
    pub fn new(
        employee_name: impl Into<String>,
        employee_id: impl Into<String>,
        status: AttendanceStatus,
        date: NaiveDate,
    ) -> Self {
        Self {
            employee_name: employee_name.into(),
            employee_id: employee_id.into(),
            status,
            date,
        }
    }

    pub fn parts(&self) -> DateParts {
        DateParts::from_date(self.date)
    }
}

/// Filters accepted by the attendance listing. Every field is optional and
/// the set ones are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceFilter {
    pub date: Option<NaiveDate>,
    /// Case-insensitive substring of the employee name or id.
    pub search: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub week: Option<i32>,
    pub employee_id: Option<String>,
    pub status: Option<AttendanceStatus>,
}

impl AttendanceFilter {
    /// Query-string pairs for the set filters, in the order the endpoint documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.date {
            pairs.push(("date", date.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        push_period(&mut pairs, self.year, self.month, self.week);
        if let Some(employee_id) = &self.employee_id {
            pairs.push(("employeeId", employee_id.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl HistoryFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_period(&mut pairs, self.year, self.month, None);
        pairs
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailFilter {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub week: Option<i32>,
}

impl DetailFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_period(&mut pairs, self.year, self.month, self.week);
        pairs
    }
}

fn push_period(
    pairs: &mut Vec<(&'static str, String)>,
    year: Option<i32>,
    month: Option<i32>,
    week: Option<i32>,
) {
    if let Some(year) = year {
        pairs.push(("year", year.to_string()));
    }
    if let Some(month) = month {
        pairs.push(("month", month.to_string()));
    }
    if let Some(week) = week {
        pairs.push(("week", week.to_string()));
    }
}
