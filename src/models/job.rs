use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Position of a job in the five-stage production pipeline.
///
/// Transitions are forward-only; `next` is the single allowed step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkshopStatus {
    New,
    Assigned,
    InProgress,
    QcInProgress,
    ReadyForDelivery,
}

impl WorkshopStatus {
    /// The next state in the fixed forward order, or `None` at the end.
    pub fn next(self) -> Option<WorkshopStatus> {
        match self {
            WorkshopStatus::New => Some(WorkshopStatus::Assigned),
            WorkshopStatus::Assigned => Some(WorkshopStatus::InProgress),
            WorkshopStatus::InProgress => Some(WorkshopStatus::QcInProgress),
            WorkshopStatus::QcInProgress => Some(WorkshopStatus::ReadyForDelivery),
            WorkshopStatus::ReadyForDelivery => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A workshop job. Produced upstream by job intake; this service owns its
/// `workshop_status` and everything hanging off it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub job_number: String,
    pub description: String,
    pub priority: Priority,
    pub workshop_status: WorkshopStatus,
    pub client_name: Option<String>,
    pub order_number: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a job (intake).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewJobRequest {
    #[garde(length(min = 1, max = 40))]
    pub job_number: String,

    #[garde(length(max = 2000))]
    pub description: String,

    #[garde(skip)]
    pub priority: Option<Priority>,

    #[garde(inner(length(min = 1, max = 200)))]
    pub client_name: Option<String>,

    #[garde(inner(length(min = 1, max = 100)))]
    pub order_number: Option<String>,

    #[garde(skip)]
    pub expected_delivery_date: Option<NaiveDate>,
}

/// One card on the kanban board, with read-time aggregates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanCard {
    pub job_id: i64,
    pub job_number: String,
    pub description: String,
    pub workshop_status: WorkshopStatus,
    pub priority: Priority,
    pub client_name: Option<String>,
    pub order_number: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub worker_count: i64,
    pub qc_progress: i32,
    pub total_hours_logged: f64,
}

/// The five named kanban columns.
#[derive(Debug, Default, Serialize)]
pub struct KanbanBoard {
    #[serde(rename = "NEW")]
    pub new: Vec<KanbanCard>,
    #[serde(rename = "ASSIGNED")]
    pub assigned: Vec<KanbanCard>,
    #[serde(rename = "IN_PROGRESS")]
    pub in_progress: Vec<KanbanCard>,
    #[serde(rename = "QC_IN_PROGRESS")]
    pub qc_in_progress: Vec<KanbanCard>,
    #[serde(rename = "READY_FOR_DELIVERY")]
    pub ready_for_delivery: Vec<KanbanCard>,
}

impl KanbanBoard {
    pub fn push(&mut self, card: KanbanCard) {
        match card.workshop_status {
            WorkshopStatus::New => self.new.push(card),
            WorkshopStatus::Assigned => self.assigned.push(card),
            WorkshopStatus::InProgress => self.in_progress.push(card),
            WorkshopStatus::QcInProgress => self.qc_in_progress.push(card),
            WorkshopStatus::ReadyForDelivery => self.ready_for_delivery.push(card),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_forward_order() {
        let mut status = WorkshopStatus::New;
        let mut seen = vec![status];
        while let Some(next) = status.next() {
            seen.push(next);
            status = next;
        }
        assert_eq!(
            seen,
            vec![
                WorkshopStatus::New,
                WorkshopStatus::Assigned,
                WorkshopStatus::InProgress,
                WorkshopStatus::QcInProgress,
                WorkshopStatus::ReadyForDelivery,
            ]
        );
        assert_eq!(WorkshopStatus::ReadyForDelivery.next(), None);
    }

    #[test]
    fn test_status_wire_format_round_trips() {
        for status in WorkshopStatus::iter() {
            let parsed: WorkshopStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!(WorkshopStatus::QcInProgress.to_string(), "QC_IN_PROGRESS");
    }

    #[test]
    fn test_board_partitions_by_status() {
        let card = |status| KanbanCard {
            job_id: 1,
            job_number: "J-001".to_string(),
            description: String::new(),
            workshop_status: status,
            priority: Priority::Medium,
            client_name: None,
            order_number: None,
            expected_delivery_date: None,
            worker_count: 0,
            qc_progress: 0,
            total_hours_logged: 0.0,
        };

        let mut board = KanbanBoard::default();
        for status in WorkshopStatus::iter() {
            board.push(card(status));
        }

        assert_eq!(board.new.len(), 1);
        assert_eq!(board.assigned.len(), 1);
        assert_eq!(board.in_progress.len(), 1);
        assert_eq!(board.qc_in_progress.len(), 1);
        assert_eq!(board.ready_for_delivery.len(), 1);
    }
}
