use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::db::{assignment_queries, job_queries, worker_queries};
use crate::error::WorkflowError;
use crate::models::assignment::{AssignRequest, JobAssignment};

async fn ensure_job_exists(state: &AppState, job_id: i64) -> Result<(), WorkflowError> {
    job_queries::fetch_job(&state.db, job_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("job {job_id} not found")))?;
    Ok(())
}

/// POST /api/v1/jobs/{id}/assign — upsert a worker onto a job.
///
/// Assignment never advances the lifecycle by itself; the state machine
/// checks the ledger at transition time.
pub async fn assign_worker(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<JobAssignment>, WorkflowError> {
    req.validate()?;
    ensure_job_exists(&state, job_id).await?;

    worker_queries::fetch_worker(&state.db, req.worker_id)
        .await?
        .ok_or(WorkflowError::UnknownWorker(req.worker_id))?;

    let assignment =
        assignment_queries::upsert_assignment(&state.db, job_id, req.worker_id, req.role).await?;

    tracing::info!(job_id, worker_id = req.worker_id, role = %req.role, "worker assigned");
    Ok(Json(assignment))
}

/// DELETE /api/v1/jobs/{id}/assign/{worker_id}
pub async fn remove_assignment(
    State(state): State<AppState>,
    Path((job_id, worker_id)): Path<(i64, i64)>,
) -> Result<StatusCode, WorkflowError> {
    let removed = assignment_queries::delete_assignment(&state.db, job_id, worker_id).await?;
    if removed == 0 {
        return Err(WorkflowError::NotFound(format!(
            "worker {worker_id} is not assigned to job {job_id}"
        )));
    }

    tracing::info!(job_id, worker_id, "assignment removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/jobs/{id}/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<Vec<JobAssignment>>, WorkflowError> {
    ensure_job_exists(&state, job_id).await?;
    let assignments = assignment_queries::list_for_job(&state.db, job_id).await?;
    Ok(Json(assignments))
}
