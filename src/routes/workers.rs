use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::db::worker_queries;
use crate::error::WorkflowError;
use crate::models::worker::Worker;

/// GET /api/v1/workers — the worker directory (read-only here).
pub async fn list_workers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Worker>>, WorkflowError> {
    let workers = worker_queries::list_workers(&state.db).await?;
    Ok(Json(workers))
}
