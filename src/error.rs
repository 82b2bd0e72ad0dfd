use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Every failure a handler or service can report.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    InvalidInput(String),

    #[display(fmt = "start date cannot be after end date")]
    InvalidDateRange,

    #[display(fmt = "leave request cannot start in the past")]
    PastDate,

    #[display(fmt = "overlapping approved leave request exists for this date range")]
    OverlapConflict,

    /// Caller has no relationship to the resource.
    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    /// Caller is related to the resource but their role does not allow the action.
    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "email already exists")]
    EmailExists,

    #[display(fmt = "invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed or expired bearer token.
    #[display(fmt = "{}", _0)]
    Unauthenticated(String),

    #[display(fmt = "storage failure: {}", _0)]
    StorageFailure(sqlx::Error),

    #[display(fmt = "internal error: {}", _0)]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::InvalidDateRange => "invalid_date_range",
            AppError::PastDate => "past_date",
            AppError::OverlapConflict => "overlap_conflict",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::EmailExists => "email_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::StorageFailure(_) => "storage_failure",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::StorageFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::StorageFailure(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(errors.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::InvalidDateRange | AppError::PastDate => {
                StatusCode::BAD_REQUEST
            }
            AppError::OverlapConflict | AppError::EmailExists => StatusCode::CONFLICT,
            AppError::Unauthorized(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials | AppError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::StorageFailure(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // infrastructure details stay in the log
        let message = match self {
            AppError::StorageFailure(e) => {
                error!(error = %e, "Storage failure");
                "Something went wrong, Contact with system admin".to_string()
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                "Something went wrong, Contact with system admin".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.code(),
            message,
        })
    }
}
