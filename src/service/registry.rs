//! Job registry: single-flight guard and live progress for resort jobs
//!
//! At most one bulk re-sort may be in progress per process. The guard is
//! an explicit active-job slot checked and set atomically under one
//! lock, not an implicit lock scattered through handlers. Cancellation
//! is cooperative: a flag the resort task checks between batches.

use crate::core::error::SortError;
use crate::core::job::{JobStatus, ResortJob};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Handle held by the resort task driving a job
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub job_id: Uuid,
    cancel: Arc<AtomicBool>,
}

impl JobHandle {
    /// Whether cancellation was requested; checked between batches
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

struct ActiveJob {
    id: Uuid,
    cancel: Arc<AtomicBool>,
}

#[derive(Default)]
struct Inner {
    active: Option<ActiveJob>,
    jobs: HashMap<Uuid, ResortJob>,
}

/// In-process registry of resort jobs
#[derive(Default)]
pub struct JobRegistry {
    inner: Mutex<Inner>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim the active-job slot and create a pending job.
    ///
    /// A second trigger while a job is active is rejected with a
    /// conflict, never queued.
    pub fn begin(&self) -> Result<JobHandle, SortError> {
        let mut inner = self.lock();
        if let Some(active) = &inner.active {
            return Err(SortError::Conflict(format!(
                "a re-sort job ({}) is already in progress",
                active.id
            )));
        }

        let job = ResortJob::new();
        let cancel = Arc::new(AtomicBool::new(false));
        let handle = JobHandle {
            job_id: job.id,
            cancel: Arc::clone(&cancel),
        };
        inner.active = Some(ActiveJob { id: job.id, cancel });
        inner.jobs.insert(job.id, job);
        Ok(handle)
    }

    /// Transition a pending job to in-progress
    pub fn start(&self, id: Uuid, total_cards: usize) {
        let mut inner = self.lock();
        if let Some(job) = inner.jobs.get_mut(&id) {
            job.start(total_cards);
        }
    }

    /// Fold one committed batch into the job's progress
    pub fn record_batch(&self, id: Uuid, processed: usize, moved: usize, errors: usize) {
        let mut inner = self.lock();
        if let Some(job) = inner.jobs.get_mut(&id) {
            job.record_batch(processed, moved, errors);
        }
    }

    pub fn complete(&self, id: Uuid) {
        self.finish(id, |job| job.mark_completed());
    }

    pub fn fail(&self, id: Uuid, reason: &str) {
        self.finish(id, |job| job.mark_failed(reason));
    }

    pub fn mark_cancelled(&self, id: Uuid) {
        self.finish(id, |job| job.mark_cancelled());
    }

    /// Request cooperative cancellation of the active job
    pub fn request_cancel(&self, id: Uuid) -> Result<(), SortError> {
        let inner = self.lock();
        let Some(job) = inner.jobs.get(&id) else {
            return Err(SortError::NotFound {
                kind: "resort job",
                id,
            });
        };
        if job.status.is_terminal() {
            return Err(SortError::Conflict(format!(
                "re-sort job {} is not in progress",
                id
            )));
        }
        if let Some(active) = &inner.active {
            if active.id == id {
                active.cancel.store(true, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Current state of a job, if known
    pub fn get(&self, id: &Uuid) -> Option<ResortJob> {
        self.lock().jobs.get(id).cloned()
    }

    /// Whether any job is currently active
    pub fn has_active(&self) -> bool {
        self.lock().active.is_some()
    }

    fn finish(&self, id: Uuid, transition: impl FnOnce(&mut ResortJob)) {
        let mut inner = self.lock();
        if let Some(job) = inner.jobs.get_mut(&id) {
            transition(job);
        }
        if inner.active.as_ref().is_some_and(|a| a.id == id) {
            inner.active = None;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let registry = JobRegistry::new();
        let handle = registry.begin().unwrap();

        let err = registry.begin().unwrap_err();
        assert!(matches!(err, SortError::Conflict(_)));

        registry.complete(handle.job_id);
        assert!(!registry.has_active());
        // Slot is free again
        registry.begin().unwrap();
    }

    #[test]
    fn test_progress_tracking() {
        let registry = JobRegistry::new();
        let handle = registry.begin().unwrap();

        registry.start(handle.job_id, 100);
        registry.record_batch(handle.job_id, 50, 3, 1);

        let job = registry.get(&handle.job_id).unwrap();
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.total_cards, 100);
        assert_eq!(job.processed_cards, 50);
        assert_eq!(job.moved_cards, 3);
        assert_eq!(job.error_count, 1);
    }

    #[test]
    fn test_cancel_sets_flag() {
        let registry = JobRegistry::new();
        let handle = registry.begin().unwrap();
        registry.start(handle.job_id, 10);

        assert!(!handle.is_cancelled());
        registry.request_cancel(handle.job_id).unwrap();
        assert!(handle.is_cancelled());

        registry.mark_cancelled(handle.job_id);
        let job = registry.get(&handle.job_id).unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(!registry.has_active());
    }

    #[test]
    fn test_cancel_unknown_job() {
        let registry = JobRegistry::new();
        assert!(matches!(
            registry.request_cancel(Uuid::new_v4()),
            Err(SortError::NotFound { .. })
        ));
    }

    #[test]
    fn test_cancel_finished_job_conflicts() {
        let registry = JobRegistry::new();
        let handle = registry.begin().unwrap();
        registry.complete(handle.job_id);

        assert!(matches!(
            registry.request_cancel(handle.job_id),
            Err(SortError::Conflict(_))
        ));
    }

    #[test]
    fn test_failure_preserves_job_record() {
        let registry = JobRegistry::new();
        let handle = registry.begin().unwrap();
        registry.start(handle.job_id, 10);
        registry.record_batch(handle.job_id, 5, 2, 0);
        registry.fail(handle.job_id, "batch persistence failed");

        let job = registry.get(&handle.job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.processed_cards, 5);
        assert_eq!(job.failure_reason.as_deref(), Some("batch persistence failed"));
        assert!(!registry.has_active());
    }
}
