use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role a worker holds on a job. One role per (job, worker) pair;
/// re-assigning replaces the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentRole {
    Lead,
    Artisan,
    Helper,
    Apprentice,
}

/// A (job, worker, role) entry in the assignment ledger, joined with the
/// worker's name for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAssignment {
    pub id: i64,
    pub job_id: i64,
    pub worker_id: i64,
    pub worker_name: String,
    pub role: AssignmentRole,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[garde(range(min = 1))]
    pub worker_id: i64,

    #[garde(skip)]
    pub role: AssignmentRole,
}
