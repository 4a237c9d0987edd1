use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use serde_json::json;

use crate::model::leave_request::{LeaveId, LeaveStatus};
use crate::repository::RepositoryError;

/// Why a leave operation did not change any state.
#[derive(Debug, thiserror::Error)]
pub enum LeaveError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("end_date {end} cannot be before start_date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("requested dates overlap an existing leave request")]
    OverlappingDates,
    #[error("insufficient leave balance: {requested} day(s) requested, {available} available")]
    InsufficientBalance { requested: i64, available: i64 },
    #[error("leave request {0} not found")]
    NotFound(LeaveId),
    #[error("leave request {id} is already {status}")]
    IllegalTransition { id: LeaveId, status: LeaveStatus },
    #[error("rejecting a leave request requires manager comments")]
    MissingRejectionReason,
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl LeaveError {
    pub fn code(&self) -> &'static str {
        match self {
            LeaveError::InvalidInput(_) => "invalid_input",
            LeaveError::InvalidRange { .. } => "invalid_range",
            LeaveError::OverlappingDates => "overlapping_dates",
            LeaveError::InsufficientBalance { .. } => "insufficient_balance",
            LeaveError::NotFound(_) => "not_found",
            LeaveError::IllegalTransition { .. } => "illegal_transition",
            LeaveError::MissingRejectionReason => "missing_rejection_reason",
            LeaveError::Storage(_) => "storage_failure",
        }
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::InvalidInput(_)
            | LeaveError::InvalidRange { .. }
            | LeaveError::MissingRejectionReason => StatusCode::BAD_REQUEST,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::OverlappingDates | LeaveError::IllegalTransition { .. } => {
                StatusCode::CONFLICT
            }
            LeaveError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LeaveError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // storage details stay in the logs
        let message = match self {
            LeaveError::Storage(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "message": message,
            "code": self.code(),
        }))
    }
}
