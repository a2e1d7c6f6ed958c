use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

use crate::db::parse_column;
use crate::models::job::{Job, KanbanCard, NewJobRequest, Priority, WorkshopStatus};

fn job_from_row(row: &PgRow) -> Result<Job, sqlx::Error> {
    Ok(Job {
        id: row.try_get("id")?,
        job_number: row.try_get("job_number")?,
        description: row.try_get("description")?,
        priority: parse_column(row, "priority")?,
        workshop_status: parse_column(row, "workshop_status")?,
        client_name: row.try_get("client_name")?,
        order_number: row.try_get("order_number")?,
        expected_delivery_date: row.try_get("expected_delivery_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const JOB_COLUMNS: &str = "id, job_number, description, priority, workshop_status, \
                           client_name, order_number, expected_delivery_date, created_at, updated_at";

/// Insert a new job in its initial state.
pub async fn create_job(
    ex: impl PgExecutor<'_>,
    req: &NewJobRequest,
) -> Result<Job, sqlx::Error> {
    let priority = req.priority.unwrap_or(Priority::Medium);
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO jobs (job_number, description, priority, client_name, order_number, expected_delivery_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(&req.job_number)
    .bind(&req.description)
    .bind(priority.to_string())
    .bind(&req.client_name)
    .bind(&req.order_number)
    .bind(req.expected_delivery_date)
    .fetch_one(ex)
    .await?;

    job_from_row(&row)
}

/// Get a job by id
pub async fn fetch_job(ex: impl PgExecutor<'_>, job_id: i64) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
        .bind(job_id)
        .fetch_optional(ex)
        .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Get a job by id, locking the row for the rest of the transaction.
pub async fn fetch_job_for_update(
    ex: impl PgExecutor<'_>,
    job_id: i64,
) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 FOR UPDATE"
    ))
    .bind(job_id)
    .fetch_optional(ex)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Move a job from `current` to `next`, guarded against concurrent movers.
/// Returns the number of rows updated (0 when the status no longer matches).
pub async fn update_status(
    ex: impl PgExecutor<'_>,
    job_id: i64,
    current: WorkshopStatus,
    next: WorkshopStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET workshop_status = $1, updated_at = NOW()
        WHERE id = $2 AND workshop_status = $3
        "#,
    )
    .bind(next.to_string())
    .bind(job_id)
    .bind(current.to_string())
    .execute(ex)
    .await?;

    Ok(result.rows_affected())
}

/// All jobs as kanban cards, aggregates computed at read time so the board
/// can never drift from `workshop_status`.
pub async fn kanban_cards(ex: impl PgExecutor<'_>) -> Result<Vec<KanbanCard>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT j.id, j.job_number, j.description, j.priority, j.workshop_status,
               j.client_name, j.order_number, j.expected_delivery_date,
               (SELECT COUNT(*) FROM job_assignments a WHERE a.job_id = j.id) AS worker_count,
               COALESCE((SELECT ((COUNT(*) FILTER (WHERE s.status IN ('PASSED', 'NOT_APPLICABLE'))) * 100
                                 / NULLIF(COUNT(*), 0))::int
                         FROM qc_signoffs s WHERE s.job_id = j.id), 0) AS qc_progress,
               COALESCE((SELECT SUM(t.normal_hours + t.overtime_hours)
                         FROM time_entries t WHERE t.job_id = j.id), 0) AS total_hours_logged
        FROM jobs j
        ORDER BY j.created_at ASC
        "#,
    )
    .fetch_all(ex)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(KanbanCard {
                job_id: row.try_get("id")?,
                job_number: row.try_get("job_number")?,
                description: row.try_get("description")?,
                workshop_status: parse_column(row, "workshop_status")?,
                priority: parse_column(row, "priority")?,
                client_name: row.try_get("client_name")?,
                order_number: row.try_get("order_number")?,
                expected_delivery_date: row.try_get("expected_delivery_date")?,
                worker_count: row.try_get("worker_count")?,
                qc_progress: row.try_get("qc_progress")?,
                total_hours_logged: row.try_get("total_hours_logged")?,
            })
        })
        .collect()
}
