use sqlx::PgPool;

use crate::db::{assignment_queries, completion_queries, job_queries};
use crate::error::WorkflowError;
use crate::models::job::{Job, KanbanBoard, WorkshopStatus};

/// Move a job one step forward in the fixed status order.
///
/// The job row is locked for the duration of the transaction, so concurrent
/// advances serialize and the status sequence observed by any reader is
/// non-decreasing.
pub async fn advance(pool: &PgPool, job_id: i64) -> Result<Job, WorkflowError> {
    let mut tx = pool.begin().await?;

    let job = job_queries::fetch_job_for_update(&mut *tx, job_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("job {job_id} not found")))?;

    let current = job.workshop_status;
    let next = current.next().ok_or_else(|| {
        WorkflowError::InvalidTransition(format!(
            "job {job_id} is already at {current} and cannot advance"
        ))
    })?;

    check_target_precondition(&mut tx, job_id, next).await?;

    let updated = job_queries::update_status(&mut *tx, job_id, current, next).await?;
    if updated == 0 {
        return Err(WorkflowError::InvalidTransition(format!(
            "job {job_id} moved concurrently; expected {current}"
        )));
    }

    let job = job_queries::fetch_job(&mut *tx, job_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("job {job_id} not found")))?;

    tx.commit().await?;

    tracing::info!(
        job_id,
        from = %current,
        to = %next,
        "workshop status advanced"
    );
    metrics::counter!("workshop_status_transitions_total", "to" => next.to_string()).increment(1);

    Ok(job)
}

/// Preconditions on the *target* state, evaluated inside the caller's
/// transaction.
async fn check_target_precondition(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    job_id: i64,
    target: WorkshopStatus,
) -> Result<(), WorkflowError> {
    match target {
        WorkshopStatus::Assigned | WorkshopStatus::QcInProgress => {
            let assigned = assignment_queries::count_for_job(&mut **tx, job_id).await?;
            if assigned == 0 {
                return Err(WorkflowError::InvalidTransition(format!(
                    "job {job_id} needs at least one assigned worker to reach {target}"
                )));
            }
        }
        WorkshopStatus::ReadyForDelivery => {
            // Only the completion register creates this record, so the only
            // advance that lands here is the one it performs itself.
            if !completion_queries::exists(&mut **tx, job_id).await? {
                return Err(WorkflowError::InvalidTransition(format!(
                    "job {job_id} has no completion sign-off"
                )));
            }
        }
        WorkshopStatus::New | WorkshopStatus::InProgress => {}
    }
    Ok(())
}

/// The kanban projection: every job bucketed by its current status.
/// Pure query; nothing here is cached or stored.
pub async fn kanban_board(pool: &PgPool) -> Result<KanbanBoard, WorkflowError> {
    let cards = job_queries::kanban_cards(pool).await?;

    let mut board = KanbanBoard::default();
    for card in cards {
        board.push(card);
    }
    Ok(board)
}
