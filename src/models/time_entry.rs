use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// One line in the append-only time ledger. Corrections are new entries,
/// never edits.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: i64,
    pub job_id: i64,
    pub worker_id: i64,
    pub worker_name: String,
    pub work_date: NaiveDate,
    pub normal_hours: f64,
    pub overtime_hours: f64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryRequest {
    #[garde(range(min = 1))]
    pub worker_id: i64,

    #[garde(skip)]
    pub work_date: NaiveDate,

    #[garde(range(min = 0.0, max = 24.0))]
    pub normal_hours: f64,

    #[garde(range(min = 0.0, max = 24.0))]
    pub overtime_hours: f64,

    #[garde(length(max = 1000))]
    #[serde(default)]
    pub notes: String,
}
