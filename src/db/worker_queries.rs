use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

use crate::db::parse_column;
use crate::models::worker::Worker;

fn worker_from_row(row: &PgRow) -> Result<Worker, sqlx::Error> {
    Ok(Worker {
        id: row.try_get("id")?,
        employee_code: row.try_get("employee_code")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        department: row.try_get("department")?,
        worker_type: parse_column(row, "worker_type")?,
        current_hourly_rate: row.try_get("current_hourly_rate")?,
    })
}

const WORKER_COLUMNS: &str =
    "id, employee_code, first_name, last_name, department, worker_type, current_hourly_rate";

/// All active workers, for the assignment and sign-off pickers.
pub async fn list_workers(ex: impl PgExecutor<'_>) -> Result<Vec<Worker>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {WORKER_COLUMNS} FROM workers WHERE is_active ORDER BY last_name, first_name"
    ))
    .fetch_all(ex)
    .await?;

    rows.iter().map(worker_from_row).collect()
}

/// Resolve a worker id against the directory.
pub async fn fetch_worker(
    ex: impl PgExecutor<'_>,
    worker_id: i64,
) -> Result<Option<Worker>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {WORKER_COLUMNS} FROM workers WHERE id = $1 AND is_active"
    ))
    .bind(worker_id)
    .fetch_optional(ex)
    .await?;

    row.as_ref().map(worker_from_row).transpose()
}
