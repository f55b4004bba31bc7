use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use sqlx::error::ErrorKind;
use tracing::{error, warn};

pub const MISSING_FIELDS: &str = "Employee name, ID, and status are required.";
pub const INVALID_STATUS: &str = "Invalid status value. Must be \"Present\" or \"Absent\".";
pub const DUPLICATE_ATTENDANCE: &str =
    "Attendance already recorded for this employee on the selected date.";
pub const RECORD_NOT_FOUND: &str = "Record not found.";
pub const SERVER_ERROR: &str = "Something went wrong on the server!";

/// Every failure a request can end in.
///
/// Client mistakes carry their own message. Database and internal failures are
/// classified once more when the response is built: constraint violations still
/// surface as 400, anything else is an opaque 500.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", DUPLICATE_ATTENDANCE)]
    Duplicate,

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "internal error: {:#}", _0)]
    Internal(anyhow::Error),
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

/// What a database failure means to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbFailure {
    CheckConstraint,
    DuplicateKey,
    Other,
}

pub fn classify_db_error(err: &sqlx::Error) -> DbFailure {
    let sqlx::Error::Database(db_err) = err else {
        return DbFailure::Other;
    };

    let message = db_err.message().to_lowercase();
    match db_err.kind() {
        ErrorKind::CheckViolation => DbFailure::CheckConstraint,
        ErrorKind::UniqueViolation => DbFailure::DuplicateKey,
        _ if message.contains("check constraint") => DbFailure::CheckConstraint,
        _ if message.contains("duplicate entry") => DbFailure::DuplicateKey,
        _ => DbFailure::Other,
    }
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    /// Message sent to the client; never includes database or internal details.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Duplicate => DUPLICATE_ATTENDANCE.to_string(),
            AppError::Database(err) => match classify_db_error(err) {
                DbFailure::CheckConstraint => INVALID_STATUS.to_string(),
                DbFailure::DuplicateKey => DUPLICATE_ATTENDANCE.to_string(),
                DbFailure::Other => SERVER_ERROR.to_string(),
            },
            AppError::Internal(_) => SERVER_ERROR.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Duplicate => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(err) => match classify_db_error(err) {
                DbFailure::CheckConstraint | DbFailure::DuplicateKey => StatusCode::BAD_REQUEST,
                DbFailure::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            match self {
                AppError::Internal(err) => error!(error = ?err, "Request failed"),
                other => error!(error = %other, "Request failed"),
            }
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        HttpResponse::build(status).json(json!({ "error": self.public_message() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use sqlx::error::DatabaseError;

    #[derive(Debug, Clone, Copy)]
    enum Reported {
        Check,
        Unique,
        Unmapped,
    }

    /// Driver error with a chosen kind and message.
    #[derive(Debug, Display)]
    #[display(fmt = "{}", message)]
    struct FakeDbError {
        reported: Reported,
        message: &'static str,
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            self.message
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.reported {
                Reported::Check => ErrorKind::CheckViolation,
                Reported::Unique => ErrorKind::UniqueViolation,
                Reported::Unmapped => ErrorKind::Other,
            }
        }
    }

    fn db_error(reported: Reported, message: &'static str) -> AppError {
        AppError::Database(sqlx::Error::Database(Box::new(FakeDbError { reported, message })))
    }

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn client_errors_keep_their_message() {
        let (status, body) = body_of(AppError::validation(MISSING_FIELDS)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], MISSING_FIELDS);

        let (status, body) = body_of(AppError::Duplicate).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], DUPLICATE_ATTENDANCE);

        let (status, body) = body_of(AppError::not_found(RECORD_NOT_FOUND)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], RECORD_NOT_FOUND);
    }

    #[actix_web::test]
    async fn unexpected_failures_are_opaque() {
        let (status, body) = body_of(AppError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], SERVER_ERROR);

        let (status, body) =
            body_of(AppError::Internal(anyhow::anyhow!("secret connection string"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], SERVER_ERROR);
    }

    #[actix_web::test]
    async fn constraint_violations_map_to_client_errors() {
        let (status, body) = body_of(db_error(
            Reported::Check,
            "Check constraint 'attendance_status_check' is violated.",
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], INVALID_STATUS);

        let (status, body) = body_of(db_error(
            Reported::Unique,
            "Duplicate entry 'E1-2026-01-05' for key 'uq_attendance_employee_date'",
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], DUPLICATE_ATTENDANCE);
    }

    #[actix_web::test]
    async fn unmapped_kinds_fall_back_to_the_message() {
        let (status, body) = body_of(db_error(
            Reported::Unmapped,
            "Check constraint 'attendance_status_check' is violated.",
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], INVALID_STATUS);

        let (status, body) = body_of(db_error(
            Reported::Unmapped,
            "Duplicate entry 'E1-2026-01-05' for key 'uq_attendance_employee_date'",
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], DUPLICATE_ATTENDANCE);

        let (status, body) = body_of(db_error(Reported::Unmapped, "Lock wait timeout exceeded")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], SERVER_ERROR);
    }

    #[test]
    fn non_database_errors_are_not_constraint_violations() {
        assert_eq!(classify_db_error(&sqlx::Error::RowNotFound), DbFailure::Other);
    }
}
