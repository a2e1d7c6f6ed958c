use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error taxonomy for the workshop workflow. Every failure is scoped to a
/// single request; nothing here is retried by the service itself.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("worker {0} not found in the directory")]
    UnknownWorker(i64),

    #[error("{0}")]
    NotFound(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("no signoff for holding point {holding_point_id} on job {job_id}")]
    UnknownSignoff { job_id: i64, holding_point_id: i64 },

    #[error("holding point {holding_point_id} on job {job_id} is already decided")]
    AlreadyDecided { job_id: i64, holding_point_id: i64 },

    #[error("job {0} already has a completion sign-off")]
    AlreadyCompleted(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Validation(_) | WorkflowError::UnknownWorker(_) => {
                StatusCode::BAD_REQUEST
            }
            WorkflowError::NotFound(_) | WorkflowError::UnknownSignoff { .. } => {
                StatusCode::NOT_FOUND
            }
            WorkflowError::InvalidTransition(_)
            | WorkflowError::AlreadyDecided { .. }
            | WorkflowError::AlreadyCompleted(_) => StatusCode::CONFLICT,
            WorkflowError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            WorkflowError::Validation(_) => "validation_error",
            WorkflowError::UnknownWorker(_) => "unknown_worker",
            WorkflowError::NotFound(_) => "not_found",
            WorkflowError::InvalidTransition(_) => "invalid_transition",
            WorkflowError::UnknownSignoff { .. } => "unknown_signoff",
            WorkflowError::AlreadyDecided { .. } => "already_decided",
            WorkflowError::AlreadyCompleted(_) => "already_completed",
            WorkflowError::Database(_) => "internal_error",
        }
    }
}

impl From<garde::Report> for WorkflowError {
    fn from(report: garde::Report) -> Self {
        WorkflowError::Validation(report.to_string())
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        if let WorkflowError::Database(ref e) = self {
            tracing::error!(error = %e, "request failed on database error");
        }

        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WorkflowError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WorkflowError::NotFound("job 1 not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WorkflowError::AlreadyCompleted(1).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WorkflowError::AlreadyDecided {
                job_id: 1,
                holding_point_id: 2
            }
            .status_code(),
            StatusCode::CONFLICT
        );
    }
}
