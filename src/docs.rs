use crate::api::attendance::{CreateAttendance, DeleteResponse};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, DailyDetail, PeriodSummary};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

Records a daily **Present** / **Absent** status per employee and reports on it.

### 🔹 Key Features
- **Mark attendance**
  - One record per employee per day; the date defaults to today
- **Dashboard**
  - List records filtered by date, name/id search, year, month, week, employee and status
  - Delete individual records
- **Employee history**
  - Totals per (year, month, week) period with present/absent counts
  - Daily drill-down for a single period

### 📦 Response Format
- JSON bodies; errors are `{"error": "<message>"}`
- Client errors answer 400/404, anything unexpected answers 500

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::list_attendance,
        crate::api::attendance::create_attendance,
        crate::api::attendance::delete_attendance,
        crate::api::attendance::employee_history,
        crate::api::attendance::employee_details
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            CreateAttendance,
            DeleteResponse,
            PeriodSummary,
            DailyDetail
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance recording and reporting APIs"),
    )
)]
pub struct ApiDoc;
