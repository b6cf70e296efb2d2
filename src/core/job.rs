//! Bulk re-sort jobs and their state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a bulk re-sort job.
///
/// Transitions: `Pending → InProgress → {Completed, Failed, Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether the job has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// A trackable bulk re-sort over the inventory.
///
/// Progress fields are written exclusively by the resort task driving
/// the job; everyone else only reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResortJob {
    pub id: Uuid,
    pub status: JobStatus,
    pub total_cards: usize,
    pub processed_cards: usize,
    /// Cards whose storage location actually changed
    pub moved_cards: usize,
    /// Per-card evaluation errors accumulated across the run
    pub error_count: usize,
    pub phase: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl ResortJob {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            total_cards: 0,
            processed_cards: 0,
            moved_cards: 0,
            error_count: 0,
            phase: "pending".to_string(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            failure_reason: None,
        }
    }

    /// Move to `InProgress` once the snapshot is taken and the card
    /// count is known
    pub fn start(&mut self, total_cards: usize) {
        self.status = JobStatus::InProgress;
        self.total_cards = total_cards;
        self.phase = "evaluating".to_string();
        self.started_at = Some(Utc::now());
    }

    /// Fold one committed batch into the progress counters
    pub fn record_batch(&mut self, processed: usize, moved: usize, errors: usize) {
        self.processed_cards += processed;
        self.moved_cards += moved;
        self.error_count += errors;
    }

    pub fn mark_completed(&mut self) {
        self.status = JobStatus::Completed;
        self.phase = "completed".to_string();
        self.completed_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, reason: &str) {
        self.status = JobStatus::Failed;
        self.phase = "failed".to_string();
        self.failure_reason = Some(reason.to_string());
        self.completed_at = Some(Utc::now());
    }

    pub fn mark_cancelled(&mut self) {
        self.status = JobStatus::Cancelled;
        self.phase = "cancelled".to_string();
        self.completed_at = Some(Utc::now());
    }
}

impl Default for ResortJob {
    fn default() -> Self {
        Self::new()
    }
}
