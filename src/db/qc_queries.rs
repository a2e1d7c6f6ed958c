use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

use crate::db::parse_column;
use crate::models::qc::{HoldingPoint, QcSignoff, SignoffStatus};

fn holding_point_from_row(row: &PgRow) -> Result<HoldingPoint, sqlx::Error> {
    Ok(HoldingPoint {
        id: row.try_get("id")?,
        sequence_number: row.try_get("sequence_number")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
    })
}

fn signoff_from_row(row: &PgRow) -> Result<QcSignoff, sqlx::Error> {
    Ok(QcSignoff {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        holding_point_id: row.try_get("holding_point_id")?,
        holding_point_name: row.try_get("holding_point_name")?,
        sequence_number: row.try_get("sequence_number")?,
        status: parse_column(row, "status")?,
        notes: row.try_get("notes")?,
        signed_by: row.try_get("signed_by")?,
        signed_at: row.try_get("signed_at")?,
    })
}

/// Full catalog, display order.
pub async fn list_catalog(ex: impl PgExecutor<'_>) -> Result<Vec<HoldingPoint>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, sequence_number, name, description, is_active
         FROM holding_points ORDER BY sequence_number ASC",
    )
    .fetch_all(ex)
    .await?;

    rows.iter().map(holding_point_from_row).collect()
}

/// Activate or retire a catalog point. Existing job boards are snapshots and
/// are not touched. Returns rows affected.
pub async fn set_catalog_active(
    ex: impl PgExecutor<'_>,
    holding_point_id: i64,
    is_active: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE holding_points SET is_active = $1 WHERE id = $2")
        .bind(is_active)
        .bind(holding_point_id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected())
}

/// Materialize the active catalog into PENDING signoffs for a job.
///
/// Insert-if-absent: safe under concurrent first-callers, a no-op when the
/// board already exists, and never re-snapshots after catalog changes.
pub async fn snapshot_board(ex: impl PgExecutor<'_>, job_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO qc_signoffs (job_id, holding_point_id, sequence_number)
        SELECT $1, hp.id, hp.sequence_number
        FROM holding_points hp
        WHERE hp.is_active
        ON CONFLICT (job_id, holding_point_id) DO NOTHING
        "#,
    )
    .bind(job_id)
    .execute(ex)
    .await?;

    Ok(result.rows_affected())
}

/// The job's board, checkpoint order, with catalog names for display.
pub async fn list_board(
    ex: impl PgExecutor<'_>,
    job_id: i64,
) -> Result<Vec<QcSignoff>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.job_id, s.holding_point_id, s.sequence_number, s.status,
               s.notes, s.signed_by, s.signed_at,
               hp.name AS holding_point_name
        FROM qc_signoffs s
        JOIN holding_points hp ON hp.id = s.holding_point_id
        WHERE s.job_id = $1
        ORDER BY s.sequence_number ASC
        "#,
    )
    .bind(job_id)
    .fetch_all(ex)
    .await?;

    rows.iter().map(signoff_from_row).collect()
}

/// Just the statuses, for progress computation.
pub async fn list_statuses(
    ex: impl PgExecutor<'_>,
    job_id: i64,
) -> Result<Vec<SignoffStatus>, sqlx::Error> {
    let rows = sqlx::query("SELECT status FROM qc_signoffs WHERE job_id = $1")
        .bind(job_id)
        .fetch_all(ex)
        .await?;

    rows.iter().map(|row| parse_column(row, "status")).collect()
}

/// Decide a PENDING signoff. The status guard in the WHERE clause is the
/// serialization point: of two racing deciders exactly one updates a row.
/// Returns rows affected (0 when the row is missing or already decided).
pub async fn decide(
    ex: impl PgExecutor<'_>,
    job_id: i64,
    holding_point_id: i64,
    status: SignoffStatus,
    notes: &str,
    signed_by: Option<i64>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE qc_signoffs
        SET status = $1, notes = $2, signed_by = $3, signed_at = NOW()
        WHERE job_id = $4 AND holding_point_id = $5 AND status = 'PENDING'
        "#,
    )
    .bind(status.to_string())
    .bind(notes)
    .bind(signed_by)
    .bind(job_id)
    .bind(holding_point_id)
    .execute(ex)
    .await?;

    Ok(result.rows_affected())
}

/// Whether a signoff row exists for the pair, regardless of status.
pub async fn signoff_exists(
    ex: impl PgExecutor<'_>,
    job_id: i64,
    holding_point_id: i64,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        "SELECT EXISTS(SELECT 1 FROM qc_signoffs WHERE job_id = $1 AND holding_point_id = $2) AS present",
    )
    .bind(job_id)
    .bind(holding_point_id)
    .fetch_one(ex)
    .await?;

    row.try_get("present")
}
