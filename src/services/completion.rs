use sqlx::PgPool;

use crate::db::{completion_queries, job_queries, qc_queries, worker_queries};
use crate::error::WorkflowError;
use crate::models::completion::{CompletionRequest, JobCompletion};
use crate::models::job::WorkshopStatus;
use crate::models::qc::QcProgress;

/// Record the dual-signature completion and move the job to
/// READY_FOR_DELIVERY, all in one transaction.
///
/// The QC gate is re-checked inside the transaction, with the job row locked,
/// so `is_complete` is true at the instant the record is created — not merely
/// at some point before the request arrived.
pub async fn complete(
    pool: &PgPool,
    job_id: i64,
    req: &CompletionRequest,
) -> Result<JobCompletion, WorkflowError> {
    // Segregation of duties: the two ids must differ even when one person
    // wears both hats organizationally.
    if req.qc_inspector_id == req.shop_manager_id {
        return Err(WorkflowError::Validation(
            "QC inspector and shop manager must be different workers".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let job = job_queries::fetch_job_for_update(&mut *tx, job_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("job {job_id} not found")))?;

    if completion_queries::exists(&mut *tx, job_id).await? {
        return Err(WorkflowError::AlreadyCompleted(job_id));
    }

    if job.workshop_status != WorkshopStatus::QcInProgress {
        return Err(WorkflowError::InvalidTransition(format!(
            "job {job_id} is {}; completion sign-off requires {}",
            job.workshop_status,
            WorkshopStatus::QcInProgress
        )));
    }

    worker_queries::fetch_worker(&mut *tx, req.qc_inspector_id)
        .await?
        .ok_or(WorkflowError::UnknownWorker(req.qc_inspector_id))?;
    worker_queries::fetch_worker(&mut *tx, req.shop_manager_id)
        .await?
        .ok_or(WorkflowError::UnknownWorker(req.shop_manager_id))?;

    let statuses = qc_queries::list_statuses(&mut *tx, job_id).await?;
    let progress = QcProgress::compute(job_id, &statuses);
    if !progress.is_complete {
        return Err(WorkflowError::Validation(format!(
            "QC checklist is not complete: {} passed, {} failed, {} pending of {}",
            progress.passed, progress.failed, progress.pending, progress.total
        )));
    }

    let completion = completion_queries::insert_completion(&mut *tx, job_id, req)
        .await?
        .ok_or(WorkflowError::AlreadyCompleted(job_id))?;

    job_queries::update_status(
        &mut *tx,
        job_id,
        WorkshopStatus::QcInProgress,
        WorkshopStatus::ReadyForDelivery,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        job_id,
        qc_inspector_id = req.qc_inspector_id,
        shop_manager_id = req.shop_manager_id,
        "job completed, ready for delivery"
    );
    metrics::counter!("job_completions_total").increment(1);

    Ok(completion)
}
