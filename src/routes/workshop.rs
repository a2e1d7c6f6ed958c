use axum::extract::{Path, State};
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::db::completion_queries;
use crate::error::WorkflowError;
use crate::models::completion::{CompletionRequest, JobCompletion};
use crate::models::job::{Job, KanbanBoard};
use crate::services::{completion, lifecycle};

/// GET /api/v1/workshop/kanban — the five-column board projection.
pub async fn kanban(State(state): State<AppState>) -> Result<Json<KanbanBoard>, WorkflowError> {
    let board = lifecycle::kanban_board(&state.db).await?;
    Ok(Json(board))
}

/// POST /api/v1/workshop/jobs/{id}/advance — manual forward move where
/// preconditions allow.
pub async fn advance_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<Job>, WorkflowError> {
    let job = lifecycle::advance(&state.db, job_id).await?;
    Ok(Json(job))
}

/// POST /api/v1/workshop/jobs/{id}/complete — dual-signature sign-off.
pub async fn complete_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<JobCompletion>, WorkflowError> {
    req.validate()?;
    let record = completion::complete(&state.db, job_id, &req).await?;
    Ok(Json(record))
}

/// GET /api/v1/workshop/jobs/{id}/completion — the sign-off record, once made.
pub async fn get_completion(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<JobCompletion>, WorkflowError> {
    let record = completion_queries::fetch_for_job(&state.db, job_id)
        .await?
        .ok_or_else(|| {
            WorkflowError::NotFound(format!("job {job_id} has no completion sign-off"))
        })?;
    Ok(Json(record))
}
