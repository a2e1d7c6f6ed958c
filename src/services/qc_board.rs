use sqlx::PgPool;

use crate::db::{job_queries, qc_queries, worker_queries};
use crate::error::WorkflowError;
use crate::models::qc::{QcBoard, QcDecisionRequest, QcProgress, QcSignoff, SignoffStatus};

async fn ensure_job_exists(pool: &PgPool, job_id: i64) -> Result<(), WorkflowError> {
    job_queries::fetch_job(pool, job_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("job {job_id} not found")))?;
    Ok(())
}

/// Snapshot the active holding-point catalog into PENDING signoffs for a job.
///
/// Idempotent: the insert-if-absent in the query layer means N calls leave
/// exactly one row per point that was active at first initialization, even
/// when first-callers race or the catalog changes afterwards.
pub async fn initialize(pool: &PgPool, job_id: i64) -> Result<QcBoard, WorkflowError> {
    ensure_job_exists(pool, job_id).await?;

    let created = qc_queries::snapshot_board(pool, job_id).await?;
    if created > 0 {
        tracing::info!(job_id, points = created, "QC board initialized");
        metrics::counter!("qc_boards_initialized_total").increment(1);
    }

    let signoffs = qc_queries::list_board(pool, job_id).await?;
    let progress = progress_of(job_id, &signoffs);
    Ok(QcBoard { signoffs, progress })
}

/// The job's signoff rows in checkpoint order. Empty until initialized.
pub async fn board(pool: &PgPool, job_id: i64) -> Result<Vec<QcSignoff>, WorkflowError> {
    ensure_job_exists(pool, job_id).await?;
    Ok(qc_queries::list_board(pool, job_id).await?)
}

/// Recompute the QC summary. Consumers must not cache this across mutations.
pub async fn progress(pool: &PgPool, job_id: i64) -> Result<QcProgress, WorkflowError> {
    ensure_job_exists(pool, job_id).await?;
    let statuses = qc_queries::list_statuses(pool, job_id).await?;
    Ok(QcProgress::compute(job_id, &statuses))
}

pub async fn pass(
    pool: &PgPool,
    job_id: i64,
    holding_point_id: i64,
    req: &QcDecisionRequest,
) -> Result<QcProgress, WorkflowError> {
    decide(pool, job_id, holding_point_id, SignoffStatus::Passed, req).await
}

pub async fn fail(
    pool: &PgPool,
    job_id: i64,
    holding_point_id: i64,
    req: &QcDecisionRequest,
) -> Result<QcProgress, WorkflowError> {
    if req.notes.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "notes are required when failing a holding point".to_string(),
        ));
    }
    decide(pool, job_id, holding_point_id, SignoffStatus::Failed, req).await
}

/// Decide one PENDING signoff. Sequence numbers order the display only;
/// inspection order on the shop floor varies by job, so any pending point may
/// be decided at any time.
async fn decide(
    pool: &PgPool,
    job_id: i64,
    holding_point_id: i64,
    status: SignoffStatus,
    req: &QcDecisionRequest,
) -> Result<QcProgress, WorkflowError> {
    if let Some(signer_id) = req.signed_by_id {
        worker_queries::fetch_worker(pool, signer_id)
            .await?
            .ok_or(WorkflowError::UnknownWorker(signer_id))?;
    }

    ensure_job_exists(pool, job_id).await?;

    let updated = qc_queries::decide(
        pool,
        job_id,
        holding_point_id,
        status,
        &req.notes,
        req.signed_by_id,
    )
    .await?;

    if updated == 0 {
        return if qc_queries::signoff_exists(pool, job_id, holding_point_id).await? {
            Err(WorkflowError::AlreadyDecided {
                job_id,
                holding_point_id,
            })
        } else {
            Err(WorkflowError::UnknownSignoff {
                job_id,
                holding_point_id,
            })
        };
    }

    tracing::info!(job_id, holding_point_id, decision = %status, "holding point decided");
    metrics::counter!("qc_signoff_decisions_total", "decision" => status.to_string()).increment(1);

    let statuses = qc_queries::list_statuses(pool, job_id).await?;
    Ok(QcProgress::compute(job_id, &statuses))
}

fn progress_of(job_id: i64, signoffs: &[QcSignoff]) -> QcProgress {
    let statuses: Vec<SignoffStatus> = signoffs.iter().map(|s| s.status).collect();
    QcProgress::compute(job_id, &statuses)
}
