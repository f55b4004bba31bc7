use crate::{
    error::{AppError, INVALID_STATUS, MISSING_FIELDS, RECORD_NOT_FOUND},
    model::attendance::{
        AttendanceFilter, AttendanceRecord, AttendanceStatus, DetailFilter, HistoryFilter,
        NewAttendance,
    },
    repository::AttendanceStore,
};
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

// -------------------- Request / response types --------------------

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Exact attendance date (YYYY-MM-DD)
    #[param(example = "2026-01-05")]
    pub date: Option<String>,
    /// Case-insensitive substring of the employee name or id
    #[param(example = "jo")]
    pub search: Option<String>,
    #[param(example = 2026)]
    pub year: Option<String>,
    #[param(example = 1)]
    pub month: Option<String>,
    /// ISO week number
    #[param(example = 2)]
    pub week: Option<String>,
    #[serde(rename = "employeeId")]
    #[param(example = "EMP-001")]
    pub employee_id: Option<String>,
    /// Present or Absent
    #[param(example = "Present")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    #[param(example = 2026)]
    pub year: Option<String>,
    #[param(example = 1)]
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DetailQuery {
    #[param(example = 2026)]
    pub year: Option<String>,
    #[param(example = 1)]
    pub month: Option<String>,
    #[param(example = 2)]
    pub week: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateAttendance {
    #[serde(rename = "employeeName")]
    #[schema(example = "John Doe", value_type = String)]
    pub employee_name: Option<String>,

    /// Text or number; numbers are stored as their decimal text
    #[serde(rename = "employeeID")]
    #[schema(example = "EMP-001", value_type = String)]
    pub employee_id: Option<Value>,

    #[schema(example = "Present", value_type = String)]
    pub status: Option<String>,

    /// Defaults to today (UTC) when omitted
    #[schema(example = "2026-01-05", format = "date")]
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "Record deleted successfully.")]
    pub message: String,
    #[serde(rename = "deletedRecord")]
    pub deleted_record: AttendanceRecord,
}

// -------------------- Parsing --------------------

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn id_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => present(Some(text)),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn parse_number(name: &str, value: Option<String>) -> Result<Option<i32>, AppError> {
    present(value)
        .map(|v| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| AppError::validation(format!("Invalid {name}: {v:?}")))
        })
        .transpose()
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    present(value)
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::validation(format!("Invalid date {v:?}, expected YYYY-MM-DD"))
            })
        })
        .transpose()
}

fn parse_status(value: Option<String>) -> Result<Option<AttendanceStatus>, AppError> {
    present(value)
        .map(|v| {
            v.trim()
                .parse::<AttendanceStatus>()
                .map_err(|_| AppError::validation(INVALID_STATUS))
        })
        .transpose()
}

impl AttendanceQuery {
    pub fn into_filter(self) -> Result<AttendanceFilter, AppError> {
        Ok(AttendanceFilter {
            date: parse_date(self.date)?,
            search: present(self.search),
            year: parse_number("year", self.year)?,
            month: parse_number("month", self.month)?,
            week: parse_number("week", self.week)?,
            employee_id: present(self.employee_id).map(|v| v.trim().to_string()),
            status: parse_status(self.status)?,
        })
    }
}

impl HistoryQuery {
    pub fn into_filter(self) -> Result<HistoryFilter, AppError> {
        Ok(HistoryFilter {
            year: parse_number("year", self.year)?,
            month: parse_number("month", self.month)?,
        })
    }
}

impl DetailQuery {
    pub fn into_filter(self) -> Result<DetailFilter, AppError> {
        Ok(DetailFilter {
            year: parse_number("year", self.year)?,
            month: parse_number("month", self.month)?,
            week: parse_number("week", self.week)?,
        })
    }
}

impl CreateAttendance {
    /// Checks required fields and resolves the date, falling back to `today`.
    pub fn validate(self, today: NaiveDate) -> Result<NewAttendance, AppError> {
        let (Some(name), Some(employee_id), Some(status)) = (
            present(self.employee_name),
            id_text(self.employee_id),
            present(self.status),
        ) else {
            return Err(AppError::validation(MISSING_FIELDS));
        };

        let status = parse_status(Some(status))?.ok_or_else(|| AppError::validation(MISSING_FIELDS))?;
        let date = parse_date(self.date)?.unwrap_or(today);

        Ok(NewAttendance::new(name.trim(), employee_id.trim(), status, date))
    }
}

// -------------------- Handlers --------------------

/// List attendance records
#[utoipa::path(
    get,
    path = "/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Matching records, newest first", body = [AttendanceRecord]),
        (status = 400, description = "Invalid filter value", body = Object, example = json!({
            "error": "Invalid year: \"abc\""
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Something went wrong on the server!"
        }))
    ),
    tag = "Attendance"
)]
pub async fn list_attendance<S: AttendanceStore>(
    store: web::Data<S>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;
    debug!(filter = ?filter, "Listing attendance");

    let records = store.list(&filter).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Record attendance for one employee on one day
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 400, description = "Missing fields, invalid status or duplicate date", body = Object, example = json!({
            "error": "Attendance already recorded for this employee on the selected date."
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Something went wrong on the server!"
        }))
    ),
    tag = "Attendance"
)]
pub async fn create_attendance<S: AttendanceStore>(
    store: web::Data<S>,
    payload: web::Json<CreateAttendance>,
) -> Result<HttpResponse, AppError> {
    let entry = payload.into_inner().validate(Utc::now().date_naive())?;

    // Friendly pre-check; the unique key still catches concurrent submissions.
    if store.exists(&entry.employee_id, entry.date).await? {
        return Err(AppError::Duplicate);
    }

    let record = store.insert(&entry).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Record deleted", body = DeleteResponse),
        (status = 404, description = "Record not found", body = Object, example = json!({
            "error": "Record not found."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance<S: AttendanceStore>(
    store: web::Data<S>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    match store.delete(id).await? {
        Some(record) => Ok(HttpResponse::Ok().json(DeleteResponse {
            message: "Record deleted successfully.".to_string(),
            deleted_record: record,
        })),
        None => Err(AppError::not_found(RECORD_NOT_FOUND)),
    }
}

/// Attendance totals per (year, month, week) for one employee
#[utoipa::path(
    get,
    path = "/attendance/employee-history/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Periods, newest first", body = [crate::model::attendance::PeriodSummary]),
        (status = 400, description = "Invalid filter value"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn employee_history<S: AttendanceStore>(
    store: web::Data<S>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let filter = query.into_inner().into_filter()?;

    let periods = store.employee_history(&employee_id, &filter).await?;
    Ok(HttpResponse::Ok().json(periods))
}

/// Daily attendance rows for one employee
#[utoipa::path(
    get,
    path = "/attendance/employee-details/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID"),
        DetailQuery
    ),
    responses(
        (status = 200, description = "Daily rows, newest date first", body = [crate::model::attendance::DailyDetail]),
        (status = 400, description = "Invalid filter value"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn employee_details<S: AttendanceStore>(
    store: web::Data<S>,
    path: web::Path<String>,
    query: web::Query<DetailQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let filter = query.into_inner().into_filter()?;

    let details = store.employee_details(&employee_id, &filter).await?;
    Ok(HttpResponse::Ok().json(details))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn payload(name: &str, id: &str, status: &str, date: Option<&str>) -> CreateAttendance {
        CreateAttendance {
            employee_name: Some(name.into()),
            employee_id: Some(id.into()),
            status: Some(status.into()),
            date: date.map(Into::into),
        }
    }

    #[test]
    fn create_requires_name_id_and_status() {
        for p in [
            CreateAttendance { employee_name: None, ..payload("A", "E1", "Present", None) },
            CreateAttendance { employee_id: Some("  ".into()), ..payload("A", "E1", "Present", None) },
            CreateAttendance { status: Some(String::new()), ..payload("A", "E1", "Present", None) },
        ] {
            let err = p.validate(today()).unwrap_err();
            assert_eq!(err.public_message(), MISSING_FIELDS);
        }
    }

    #[test]
    fn create_defaults_date_to_today_and_trims() {
        let entry = payload(" Ann Lee ", " E9 ", "Absent", None)
            .validate(today())
            .unwrap();
        assert_eq!(entry.employee_name, "Ann Lee");
        assert_eq!(entry.employee_id, "E9");
        assert_eq!(entry.status, AttendanceStatus::Absent);
        assert_eq!(entry.date, today());

        let entry = payload("Ann", "E9", "Present", Some("")).validate(today()).unwrap();
        assert_eq!(entry.date, today());
    }

    #[test]
    fn numeric_employee_id_becomes_text() {
        let body = r#"{"employeeName":"Ann","employeeID":123,"status":"Present"}"#;
        let entry = serde_json::from_str::<CreateAttendance>(body)
            .unwrap()
            .validate(today())
            .unwrap();
        assert_eq!(entry.employee_id, "123");

        let body = r#"{"employeeName":"Ann","employeeID":false,"status":"Present"}"#;
        let err = serde_json::from_str::<CreateAttendance>(body)
            .unwrap()
            .validate(today())
            .unwrap_err();
        assert_eq!(err.public_message(), MISSING_FIELDS);
    }

    #[test]
    fn create_rejects_unknown_status_and_bad_date() {
        let err = payload("A", "E1", "Late", None).validate(today()).unwrap_err();
        assert_eq!(err.public_message(), INVALID_STATUS);

        let err = payload("A", "E1", "Present", Some("16/10/2026"))
            .validate(today())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn empty_query_values_are_ignored() {
        let query = AttendanceQuery {
            date: Some(String::new()),
            search: Some(String::new()),
            year: Some(" ".into()),
            status: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(query.into_filter().unwrap(), AttendanceFilter::default());
    }

    #[test]
    fn query_values_are_typed() {
        let query = AttendanceQuery {
            date: Some("2026-01-05".into()),
            year: Some("2026".into()),
            employee_id: Some("E1".into()),
            status: Some("Present".into()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(filter.year, Some(2026));
        assert_eq!(filter.employee_id.as_deref(), Some("E1"));
        assert_eq!(filter.status, Some(AttendanceStatus::Present));

        let bad = AttendanceQuery { week: Some("abc".into()), ..Default::default() };
        assert!(bad.into_filter().is_err());
    }
}
