use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// The dual-signature record that finalizes a job. One per job, immutable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCompletion {
    pub id: i64,
    pub job_id: i64,
    pub qc_inspector_id: i64,
    pub qc_inspector_name: String,
    pub shop_manager_id: i64,
    pub shop_manager_name: String,
    pub notes: String,
    pub completed_at: DateTime<Utc>,
}

/// Completion sign-off request. The two signer ids must differ; that is a
/// segregation-of-duties rule, not an authentication check.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    #[garde(range(min = 1))]
    pub qc_inspector_id: i64,

    #[garde(length(min = 1, max = 200))]
    pub qc_inspector_name: String,

    #[garde(range(min = 1))]
    pub shop_manager_id: i64,

    #[garde(length(min = 1, max = 200))]
    pub shop_manager_name: String,

    #[garde(length(max = 2000))]
    #[serde(default)]
    pub notes: String,
}
