use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::db::job_queries;
use crate::error::WorkflowError;
use crate::models::job::{Job, NewJobRequest};

/// POST /api/v1/jobs — job intake. New jobs start at NEW.
pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<NewJobRequest>,
) -> Result<(StatusCode, Json<Job>), WorkflowError> {
    req.validate()?;

    match job_queries::create_job(&state.db, &req).await {
        Ok(job) => {
            tracing::info!(job_id = job.id, job_number = %job.job_number, "job created");
            Ok((StatusCode::CREATED, Json(job)))
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(WorkflowError::Validation(format!(
                "job number '{}' already exists",
                req.job_number
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<Job>, WorkflowError> {
    let job = job_queries::fetch_job(&state.db, job_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("job {job_id} not found")))?;
    Ok(Json(job))
}
