use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

use crate::models::completion::{CompletionRequest, JobCompletion};

fn completion_from_row(row: &PgRow) -> Result<JobCompletion, sqlx::Error> {
    Ok(JobCompletion {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        qc_inspector_id: row.try_get("qc_inspector_id")?,
        qc_inspector_name: row.try_get("qc_inspector_name")?,
        shop_manager_id: row.try_get("shop_manager_id")?,
        shop_manager_name: row.try_get("shop_manager_name")?,
        notes: row.try_get("notes")?,
        completed_at: row.try_get("completed_at")?,
    })
}

/// Insert the completion record for a job. The unique constraint on job_id is
/// the race backstop; `None` means a record already existed.
pub async fn insert_completion(
    ex: impl PgExecutor<'_>,
    job_id: i64,
    req: &CompletionRequest,
) -> Result<Option<JobCompletion>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO job_completions
            (job_id, qc_inspector_id, qc_inspector_name, shop_manager_id, shop_manager_name, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (job_id) DO NOTHING
        RETURNING id, job_id, qc_inspector_id, qc_inspector_name,
                  shop_manager_id, shop_manager_name, notes, completed_at
        "#,
    )
    .bind(job_id)
    .bind(req.qc_inspector_id)
    .bind(&req.qc_inspector_name)
    .bind(req.shop_manager_id)
    .bind(&req.shop_manager_name)
    .bind(&req.notes)
    .fetch_optional(ex)
    .await?;

    row.as_ref().map(completion_from_row).transpose()
}

/// The completion record for a job, if signed off.
pub async fn fetch_for_job(
    ex: impl PgExecutor<'_>,
    job_id: i64,
) -> Result<Option<JobCompletion>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, job_id, qc_inspector_id, qc_inspector_name,
               shop_manager_id, shop_manager_name, notes, completed_at
        FROM job_completions
        WHERE job_id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(ex)
    .await?;

    row.as_ref().map(completion_from_row).transpose()
}

/// Whether a job already has its sign-off.
pub async fn exists(ex: impl PgExecutor<'_>, job_id: i64) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM job_completions WHERE job_id = $1) AS present")
        .bind(job_id)
        .fetch_one(ex)
        .await?;

    row.try_get("present")
}
