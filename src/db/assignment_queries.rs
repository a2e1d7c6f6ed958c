use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

use crate::db::parse_column;
use crate::models::assignment::{AssignmentRole, JobAssignment};

fn assignment_from_row(row: &PgRow) -> Result<JobAssignment, sqlx::Error> {
    Ok(JobAssignment {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        worker_id: row.try_get("worker_id")?,
        worker_name: row.try_get("worker_name")?,
        role: parse_column(row, "role")?,
        assigned_at: row.try_get("assigned_at")?,
    })
}

/// Upsert the (job, worker) pair. Re-assigning replaces the role rather than
/// adding a second row.
pub async fn upsert_assignment(
    ex: impl PgExecutor<'_>,
    job_id: i64,
    worker_id: i64,
    role: AssignmentRole,
) -> Result<JobAssignment, sqlx::Error> {
    let row = sqlx::query(
        r#"
        WITH upserted AS (
            INSERT INTO job_assignments (job_id, worker_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (job_id, worker_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING id, job_id, worker_id, role, assigned_at
        )
        SELECT u.id, u.job_id, u.worker_id, u.role, u.assigned_at,
               w.first_name || ' ' || w.last_name AS worker_name
        FROM upserted u
        JOIN workers w ON w.id = u.worker_id
        "#,
    )
    .bind(job_id)
    .bind(worker_id)
    .bind(role.to_string())
    .fetch_one(ex)
    .await?;

    assignment_from_row(&row)
}

/// Remove the pair. Returns rows affected (0 when it did not exist).
pub async fn delete_assignment(
    ex: impl PgExecutor<'_>,
    job_id: i64,
    worker_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM job_assignments WHERE job_id = $1 AND worker_id = $2")
        .bind(job_id)
        .bind(worker_id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected())
}

/// Current assignments for a job, with worker names for display.
pub async fn list_for_job(
    ex: impl PgExecutor<'_>,
    job_id: i64,
) -> Result<Vec<JobAssignment>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.job_id, a.worker_id, a.role, a.assigned_at,
               w.first_name || ' ' || w.last_name AS worker_name
        FROM job_assignments a
        JOIN workers w ON w.id = a.worker_id
        WHERE a.job_id = $1
        ORDER BY a.assigned_at ASC
        "#,
    )
    .bind(job_id)
    .fetch_all(ex)
    .await?;

    rows.iter().map(assignment_from_row).collect()
}

/// Number of active assignments; the lifecycle precondition check.
pub async fn count_for_job(ex: impl PgExecutor<'_>, job_id: i64) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM job_assignments WHERE job_id = $1")
        .bind(job_id)
        .fetch_one(ex)
        .await?;

    row.try_get("n")
}
