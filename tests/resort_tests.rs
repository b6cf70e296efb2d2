//! Bulk re-sort behavior: completion, idempotence, single-flight,
//! cancellation, and bounded-retry failure handling.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use cardsort::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Inventory wrapper whose batched writes fail after a configurable
/// number of successful batches.
struct FlakyInventoryStore {
    inner: InMemoryInventoryStore,
    successful_batches: usize,
    attempts: AtomicUsize,
}

impl FlakyInventoryStore {
    fn new(inner: InMemoryInventoryStore, successful_batches: usize) -> Self {
        Self {
            inner,
            successful_batches,
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl InventoryStore for FlakyInventoryStore {
    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }

    async fn list_page(&self, offset: usize, limit: usize) -> Result<Vec<CardRecord>> {
        self.inner.list_page(offset, limit).await
    }

    async fn get(&self, id: &Uuid) -> Result<Option<CardRecord>> {
        self.inner.get(id).await
    }

    async fn create(&self, card: CardRecord) -> Result<CardRecord> {
        self.inner.create(card).await
    }

    async fn apply_assignments(&self, assignments: &[Assignment]) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.successful_batches {
            return Err(anyhow!("simulated write failure"));
        }
        self.inner.apply_assignments(assignments).await
    }
}

fn fast_config(batch_size: usize) -> AutoSortConfig {
    AutoSortConfig {
        batch_size,
        max_batch_retries: 2,
        retry_backoff: Duration::from_millis(1),
        persist_timeout: Duration::from_secs(1),
    }
}

async fn seed_cards(inventory: &InMemoryInventoryStore, count: usize) {
    for i in 0..count {
        let mut card = CardRecord::new(&format!("card {}", i), "MOM", "rare");
        card.id = Uuid::from_u128(i as u128 + 1);
        inventory.create(card).await.unwrap();
    }
}

async fn catch_all_rule(service: &Arc<AutoSortService>, location: Uuid) {
    service
        .create_rule(RuleDraft {
            name: "catch-all".into(),
            priority: 1,
            expression: "true".into(),
            storage_location_id: location,
            enabled: true,
        })
        .await
        .unwrap();
}

async fn wait_terminal(service: &Arc<AutoSortService>, job_id: Uuid) -> ResortJob {
    for _ in 0..500 {
        if let Ok(job) = service.job(&job_id) {
            if job.status.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("re-sort job did not reach a terminal state");
}

#[tokio::test]
async fn resort_moves_all_matching_cards() {
    let locations = InMemoryLocationStore::new();
    let location = locations.add(StorageLocation::new("Box 1"));
    let inventory = InMemoryInventoryStore::new();
    seed_cards(&inventory, 25).await;

    let service = Arc::new(AutoSortService::with_config(
        Arc::new(InMemoryRuleStore::new()),
        Arc::new(inventory.clone()),
        Arc::new(locations),
        fast_config(10),
    ));
    catch_all_rule(&service, location).await;

    let job_id = service.trigger_resort().unwrap();
    let job = wait_terminal(&service, job_id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.total_cards, 25);
    assert_eq!(job.processed_cards, 25);
    assert_eq!(job.moved_cards, 25);
    assert_eq!(job.error_count, 0);

    for card in inventory.list_page(0, 100).await.unwrap() {
        assert_eq!(card.storage_location_id, Some(location));
    }
}

#[tokio::test]
async fn repeat_resort_is_idempotent() {
    let locations = InMemoryLocationStore::new();
    let location = locations.add(StorageLocation::new("Box 1"));
    let inventory = InMemoryInventoryStore::new();
    seed_cards(&inventory, 12).await;

    let service = Arc::new(AutoSortService::with_config(
        Arc::new(InMemoryRuleStore::new()),
        Arc::new(inventory),
        Arc::new(locations),
        fast_config(5),
    ));
    catch_all_rule(&service, location).await;

    let first = wait_terminal(&service, service.trigger_resort().unwrap()).await;
    assert_eq!(first.moved_cards, 12);

    // Nothing changed between runs: identical placements, zero moves
    let second = wait_terminal(&service, service.trigger_resort().unwrap()).await;
    assert_eq!(second.status, JobStatus::Completed);
    assert_eq!(second.processed_cards, 12);
    assert_eq!(second.moved_cards, 0);
}

#[tokio::test]
async fn no_match_unassigns_previously_placed_cards() {
    let locations = InMemoryLocationStore::new();
    locations.add(StorageLocation::new("Box 1"));
    let inventory = InMemoryInventoryStore::new();

    let mut card = CardRecord::new("Orphan", "MOM", "common");
    card.storage_location_id = Some(Uuid::new_v4());
    let card_id = card.id;
    inventory.create(card).await.unwrap();

    // No rules at all: every card resolves to no match
    let service = Arc::new(AutoSortService::with_config(
        Arc::new(InMemoryRuleStore::new()),
        Arc::new(inventory.clone()),
        Arc::new(locations),
        fast_config(10),
    ));

    let job = wait_terminal(&service, service.trigger_resort().unwrap()).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.moved_cards, 1);
    assert_eq!(
        inventory.get(&card_id).await.unwrap().unwrap().storage_location_id,
        None
    );
}

#[tokio::test]
async fn concurrent_trigger_is_rejected_not_queued() {
    let locations = InMemoryLocationStore::new();
    let location = locations.add(StorageLocation::new("Box 1"));
    let inventory = InMemoryInventoryStore::new();
    seed_cards(&inventory, 5).await;

    let service = Arc::new(AutoSortService::with_config(
        Arc::new(InMemoryRuleStore::new()),
        Arc::new(inventory),
        Arc::new(locations),
        fast_config(5),
    ));
    catch_all_rule(&service, location).await;

    let job_id = service.trigger_resort().unwrap();
    // The spawned job has not yielded to completion yet on the test
    // runtime, so the slot is still held
    let err = service.trigger_resort().unwrap_err();
    assert!(matches!(err, SortError::Conflict(_)));

    let job = wait_terminal(&service, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);

    // Slot released: a new job may start
    let second = service.trigger_resort().unwrap();
    wait_terminal(&service, second).await;
}

#[tokio::test]
async fn cancellation_stops_between_batches() {
    let locations = InMemoryLocationStore::new();
    let location = locations.add(StorageLocation::new("Box 1"));
    let inventory = InMemoryInventoryStore::new();
    seed_cards(&inventory, 20).await;

    let service = Arc::new(AutoSortService::with_config(
        Arc::new(InMemoryRuleStore::new()),
        Arc::new(inventory),
        Arc::new(locations),
        fast_config(5),
    ));
    catch_all_rule(&service, location).await;

    let job_id = service.trigger_resort().unwrap();
    // Cancel before the spawned task gets a chance to run: it must
    // observe the flag at its first batch boundary and stop cleanly
    service.cancel_resort(job_id).unwrap();

    let job = wait_terminal(&service, job_id).await;
    assert_eq!(job.status, JobStatus::Cancelled);
    // Whatever was processed happened in whole batches
    assert_eq!(job.processed_cards % 5, 0);
}

#[tokio::test]
async fn retry_exhaustion_fails_job_and_keeps_committed_batches() {
    let locations = InMemoryLocationStore::new();
    let location = locations.add(StorageLocation::new("Box 1"));
    let inner = InMemoryInventoryStore::new();
    seed_cards(&inner, 10).await;
    // First batch commits, every later write attempt fails
    let flaky = FlakyInventoryStore::new(inner.clone(), 1);

    let service = Arc::new(AutoSortService::with_config(
        Arc::new(InMemoryRuleStore::new()),
        Arc::new(flaky),
        Arc::new(locations),
        fast_config(5),
    ));
    catch_all_rule(&service, location).await;

    let job = wait_terminal(&service, service.trigger_resort().unwrap()).await;
    assert_eq!(job.status, JobStatus::Failed);
    let reason = job.failure_reason.unwrap();
    assert!(reason.contains("after 2 attempts"), "reason: {}", reason);

    // The first batch's placements survive the failure
    let placed = inner
        .list_page(0, 100)
        .await
        .unwrap()
        .iter()
        .filter(|c| c.storage_location_id == Some(location))
        .count();
    assert_eq!(placed, 5);
}

#[tokio::test]
async fn rule_edits_do_not_affect_in_flight_job() {
    let locations = InMemoryLocationStore::new();
    let location_a = locations.add(StorageLocation::new("A"));
    let location_b = locations.add(StorageLocation::new("B"));
    let inventory = InMemoryInventoryStore::new();
    seed_cards(&inventory, 8).await;

    let service = Arc::new(AutoSortService::with_config(
        Arc::new(InMemoryRuleStore::new()),
        Arc::new(inventory.clone()),
        Arc::new(locations),
        fast_config(4),
    ));
    catch_all_rule(&service, location_a).await;

    let job_id = service.trigger_resort().unwrap();
    // Edit the rule set while the job is pending: the job snapshotted
    // nothing yet, but will snapshot exactly once when it starts.
    // Re-pointing the rule before the job runs means the job uses the
    // new target; a second edit after completion must not re-run it.
    let rules = service.list_rules().await.unwrap();
    service
        .update_rule(
            rules[0].id,
            RuleDraft {
                name: "catch-all".into(),
                priority: 1,
                expression: "true".into(),
                storage_location_id: location_b,
                enabled: true,
            },
        )
        .await
        .unwrap();

    let job = wait_terminal(&service, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);

    // Every card landed in exactly one location, decided by the single
    // snapshot the job took at start
    let cards = inventory.list_page(0, 100).await.unwrap();
    let distinct: std::collections::HashSet<_> =
        cards.iter().map(|c| c.storage_location_id).collect();
    assert_eq!(distinct.len(), 1);
}
