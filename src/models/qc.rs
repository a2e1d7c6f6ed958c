use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A QC checkpoint in the catalog. Global reference data; per-job boards
/// snapshot the active set at initialization time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPoint {
    pub id: i64,
    pub sequence_number: i32,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SignoffStatus {
    Pending,
    Passed,
    Failed,
    NotApplicable,
}

/// Per-job materialization of a holding point. The sequence number is copied
/// from the catalog at snapshot time and never changes afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QcSignoff {
    pub id: i64,
    pub job_id: i64,
    pub holding_point_id: i64,
    pub holding_point_name: String,
    pub sequence_number: i32,
    pub status: SignoffStatus,
    pub notes: String,
    pub signed_by: Option<i64>,
    pub signed_at: Option<DateTime<Utc>>,
}

/// Derived QC summary. Always recomputed from the signoff rows, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QcProgress {
    pub job_id: i64,
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub pending: i64,
    pub not_applicable: i64,
    pub percent_complete: i32,
    pub is_complete: bool,
}

impl QcProgress {
    /// Compute the summary for a job's signoff statuses.
    ///
    /// A job is complete when every signoff that is not NOT_APPLICABLE is
    /// PASSED. An empty board (never initialized) is never complete.
    pub fn compute(job_id: i64, statuses: &[SignoffStatus]) -> QcProgress {
        let total = statuses.len() as i64;
        let count = |wanted: SignoffStatus| statuses.iter().filter(|s| **s == wanted).count() as i64;

        let passed = count(SignoffStatus::Passed);
        let failed = count(SignoffStatus::Failed);
        let pending = count(SignoffStatus::Pending);
        let not_applicable = count(SignoffStatus::NotApplicable);

        let percent_complete = if total > 0 {
            (((passed + not_applicable) * 100) / total) as i32
        } else {
            0
        };

        QcProgress {
            job_id,
            total,
            passed,
            failed,
            pending,
            not_applicable,
            percent_complete,
            is_complete: total > 0 && pending == 0 && failed == 0,
        }
    }
}

/// Body of a pass/fail decision. Notes are mandatory for fail; the service
/// enforces that, not the DTO.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QcDecisionRequest {
    #[garde(length(max = 2000))]
    #[serde(default)]
    pub notes: String,

    #[garde(inner(range(min = 1)))]
    #[serde(default)]
    pub signed_by_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CatalogUpdateRequest {
    #[garde(skip)]
    pub is_active: bool,
}

/// Board plus summary, returned by initialize so the client needs one call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QcBoard {
    pub signoffs: Vec<QcSignoff>,
    pub progress: QcProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_board_is_all_pending() {
        let statuses = vec![SignoffStatus::Pending; 9];
        let progress = QcProgress::compute(7, &statuses);
        assert_eq!(progress.total, 9);
        assert_eq!(progress.pending, 9);
        assert_eq!(progress.passed, 0);
        assert_eq!(progress.failed, 0);
        assert_eq!(progress.percent_complete, 0);
        assert!(!progress.is_complete);
    }

    #[test]
    fn test_one_failed_point_blocks_completion() {
        let mut statuses = vec![SignoffStatus::Passed; 8];
        statuses.push(SignoffStatus::Failed);
        let progress = QcProgress::compute(7, &statuses);
        assert_eq!(progress.passed, 8);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.pending, 0);
        assert!(!progress.is_complete);
    }

    #[test]
    fn test_all_passed_is_complete() {
        let statuses = vec![SignoffStatus::Passed; 9];
        let progress = QcProgress::compute(7, &statuses);
        assert_eq!(progress.percent_complete, 100);
        assert!(progress.is_complete);
    }

    #[test]
    fn test_not_applicable_points_do_not_block() {
        let mut statuses = vec![SignoffStatus::Passed; 7];
        statuses.push(SignoffStatus::NotApplicable);
        statuses.push(SignoffStatus::NotApplicable);
        let progress = QcProgress::compute(7, &statuses);
        assert_eq!(progress.not_applicable, 2);
        assert!(progress.is_complete);
    }

    #[test]
    fn test_empty_board_is_never_complete() {
        let progress = QcProgress::compute(7, &[]);
        assert_eq!(progress.total, 0);
        assert!(!progress.is_complete);
    }
}
