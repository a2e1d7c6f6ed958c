use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

use crate::models::time_entry::{TimeEntry, TimeEntryRequest};

fn entry_from_row(row: &PgRow) -> Result<TimeEntry, sqlx::Error> {
    Ok(TimeEntry {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        worker_id: row.try_get("worker_id")?,
        worker_name: row.try_get("worker_name")?,
        work_date: row.try_get("work_date")?,
        normal_hours: row.try_get("normal_hours")?,
        overtime_hours: row.try_get("overtime_hours")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Append one entry to the time ledger. Entries are never updated; a
/// correction is another entry.
pub async fn insert_entry(
    ex: impl PgExecutor<'_>,
    job_id: i64,
    worker_name: &str,
    req: &TimeEntryRequest,
) -> Result<TimeEntry, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO time_entries (job_id, worker_id, work_date, normal_hours, overtime_hours, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, job_id, worker_id, work_date, normal_hours, overtime_hours, notes, created_at
        "#,
    )
    .bind(job_id)
    .bind(req.worker_id)
    .bind(req.work_date)
    .bind(req.normal_hours)
    .bind(req.overtime_hours)
    .bind(&req.notes)
    .fetch_one(ex)
    .await?;

    Ok(TimeEntry {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        worker_id: row.try_get("worker_id")?,
        worker_name: worker_name.to_string(),
        work_date: row.try_get("work_date")?,
        normal_hours: row.try_get("normal_hours")?,
        overtime_hours: row.try_get("overtime_hours")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Ledger entries for a job, oldest first.
pub async fn list_for_job(
    ex: impl PgExecutor<'_>,
    job_id: i64,
) -> Result<Vec<TimeEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.job_id, t.worker_id, t.work_date, t.normal_hours, t.overtime_hours,
               t.notes, t.created_at,
               w.first_name || ' ' || w.last_name AS worker_name
        FROM time_entries t
        JOIN workers w ON w.id = t.worker_id
        WHERE t.job_id = $1
        ORDER BY t.work_date ASC, t.id ASC
        "#,
    )
    .bind(job_id)
    .fetch_all(ex)
    .await?;

    rows.iter().map(entry_from_row).collect()
}
