use axum::extract::{Path, State};
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::db::qc_queries;
use crate::error::WorkflowError;
use crate::models::qc::{CatalogUpdateRequest, HoldingPoint, QcBoard, QcDecisionRequest, QcProgress, QcSignoff};
use crate::services::qc_board;

/// GET /api/v1/qc/holding-points — the global checkpoint catalog.
pub async fn list_holding_points(
    State(state): State<AppState>,
) -> Result<Json<Vec<HoldingPoint>>, WorkflowError> {
    let catalog = qc_queries::list_catalog(&state.db).await?;
    Ok(Json(catalog))
}

/// PATCH /api/v1/qc/holding-points/{id} — activate or retire a point.
/// Reordering is deliberately not supported; boards already snapshotted keep
/// the retired point.
pub async fn update_holding_point(
    State(state): State<AppState>,
    Path(holding_point_id): Path<i64>,
    Json(req): Json<CatalogUpdateRequest>,
) -> Result<Json<Vec<HoldingPoint>>, WorkflowError> {
    req.validate()?;

    let updated = qc_queries::set_catalog_active(&state.db, holding_point_id, req.is_active).await?;
    if updated == 0 {
        return Err(WorkflowError::NotFound(format!(
            "holding point {holding_point_id} not found"
        )));
    }

    tracing::info!(holding_point_id, is_active = req.is_active, "holding point updated");
    let catalog = qc_queries::list_catalog(&state.db).await?;
    Ok(Json(catalog))
}

/// POST /api/v1/qc/jobs/{id}/init — snapshot the active catalog (idempotent).
pub async fn initialize_board(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<QcBoard>, WorkflowError> {
    let board = qc_board::initialize(&state.db, job_id).await?;
    Ok(Json(board))
}

/// GET /api/v1/qc/jobs/{id} — the job's signoff rows.
pub async fn get_board(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<Vec<QcSignoff>>, WorkflowError> {
    let signoffs = qc_board::board(&state.db, job_id).await?;
    Ok(Json(signoffs))
}

/// GET /api/v1/qc/jobs/{id}/progress — recomputed summary.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<QcProgress>, WorkflowError> {
    let progress = qc_board::progress(&state.db, job_id).await?;
    Ok(Json(progress))
}

/// POST /api/v1/qc/jobs/{id}/holding-points/{hp_id}/pass
pub async fn pass_holding_point(
    State(state): State<AppState>,
    Path((job_id, holding_point_id)): Path<(i64, i64)>,
    Json(req): Json<QcDecisionRequest>,
) -> Result<Json<QcProgress>, WorkflowError> {
    req.validate()?;
    let progress = qc_board::pass(&state.db, job_id, holding_point_id, &req).await?;
    Ok(Json(progress))
}

/// POST /api/v1/qc/jobs/{id}/holding-points/{hp_id}/fail — notes mandatory.
pub async fn fail_holding_point(
    State(state): State<AppState>,
    Path((job_id, holding_point_id)): Path<(i64, i64)>,
    Json(req): Json<QcDecisionRequest>,
) -> Result<Json<QcProgress>, WorkflowError> {
    req.validate()?;
    let progress = qc_board::fail(&state.db, job_id, holding_point_id, &req).await?;
    Ok(Json(progress))
}
