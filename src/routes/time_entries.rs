use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::db::{job_queries, time_queries, worker_queries};
use crate::error::WorkflowError;
use crate::models::time_entry::{TimeEntry, TimeEntryRequest};

/// POST /api/v1/jobs/{id}/time — append to the time ledger.
pub async fn log_time(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Json(req): Json<TimeEntryRequest>,
) -> Result<(StatusCode, Json<TimeEntry>), WorkflowError> {
    req.validate()?;

    job_queries::fetch_job(&state.db, job_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("job {job_id} not found")))?;

    let worker = worker_queries::fetch_worker(&state.db, req.worker_id)
        .await?
        .ok_or(WorkflowError::UnknownWorker(req.worker_id))?;

    let entry = time_queries::insert_entry(&state.db, job_id, &worker.full_name(), &req).await?;

    tracing::info!(
        job_id,
        worker_id = req.worker_id,
        normal_hours = req.normal_hours,
        overtime_hours = req.overtime_hours,
        "time logged"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/jobs/{id}/time — the job's time audit trail.
pub async fn list_time(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<Vec<TimeEntry>>, WorkflowError> {
    job_queries::fetch_job(&state.db, job_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("job {job_id} not found")))?;

    let entries = time_queries::list_for_job(&state.db, job_id).await?;
    Ok(Json(entries))
}
