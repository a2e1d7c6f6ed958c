use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerType {
    Permanent,
    Casual,
    Contract,
}

/// A worker from the directory. Immutable reference data in this service;
/// payroll and HR administer it elsewhere.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: i64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub worker_type: WorkerType,
    pub current_hourly_rate: f64,
}

impl Worker {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
