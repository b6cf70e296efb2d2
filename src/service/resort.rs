//! The bulk re-sort loop
//!
//! Runs as a background task owned by the job registry. The rule set is
//! snapshotted once at job start; later rule edits do not affect the
//! job. Inventory is streamed in fixed-size batches with one batched
//! write per batch, bounded retries, and a cooperative cancellation
//! check between batches. Failed jobs keep every batch already
//! committed; there is no job-wide rollback.

use crate::core::card::EvaluationContext;
use crate::engine::matcher::find_placement;
use crate::service::autosort::AutoSortService;
use crate::service::registry::JobHandle;
use crate::storage::Assignment;
use std::sync::Arc;

/// Drive one resort job to a terminal state
pub(crate) async fn run(service: Arc<AutoSortService>, handle: JobHandle) {
    let job_id = handle.job_id;

    let snapshot = match service.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::error!(job_id = %job_id, error = %err, "re-sort failed to snapshot rules");
            service.registry.fail(job_id, &err.to_string());
            return;
        }
    };

    let total = match service.inventory.count().await {
        Ok(total) => total,
        Err(err) => {
            tracing::error!(job_id = %job_id, error = %err, "re-sort failed to count inventory");
            service.registry.fail(job_id, &err.to_string());
            return;
        }
    };

    service.registry.start(job_id, total);
    tracing::info!(
        job_id = %job_id,
        total_cards = total,
        rules = snapshot.len(),
        "bulk re-sort started"
    );

    let batch_size = service.config.batch_size;
    let mut offset = 0;

    loop {
        if handle.is_cancelled() {
            tracing::info!(job_id = %job_id, processed = offset, "re-sort cancelled");
            service.registry.mark_cancelled(job_id);
            return;
        }

        let batch = match service.inventory.list_page(offset, batch_size).await {
            Ok(batch) => batch,
            Err(err) => {
                tracing::error!(job_id = %job_id, error = %err, "re-sort failed to read inventory");
                service.registry.fail(job_id, &err.to_string());
                return;
            }
        };
        if batch.is_empty() {
            break;
        }

        let mut changes = Vec::new();
        let mut errors = 0;
        for card in &batch {
            let ctx = EvaluationContext::from_card(card);
            let outcome = find_placement(&snapshot, &ctx);
            errors += outcome.diagnostics.len();
            let target = outcome.placement.map(|p| p.storage_location_id);
            // Only persist actual moves; a repeat run over unchanged
            // rules and cards writes nothing
            if target != card.storage_location_id {
                changes.push(Assignment {
                    card_id: card.id,
                    storage_location_id: target,
                });
            }
        }

        if !changes.is_empty() {
            if let Err(reason) = persist_with_retry(&service, &changes).await {
                tracing::error!(job_id = %job_id, error = %reason, "re-sort batch failed");
                service.registry.fail(job_id, &reason);
                return;
            }
        }

        service
            .registry
            .record_batch(job_id, batch.len(), changes.len(), errors);
        tracing::debug!(
            job_id = %job_id,
            processed = offset + batch.len(),
            moved = changes.len(),
            "re-sort batch committed"
        );
        offset += batch.len();
    }

    service.registry.complete(job_id);
    tracing::info!(job_id = %job_id, processed = offset, "bulk re-sort completed");
}

/// Persist one batch with bounded retries and a per-attempt timeout
async fn persist_with_retry(
    service: &AutoSortService,
    changes: &[Assignment],
) -> Result<(), String> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = tokio::time::timeout(
            service.config.persist_timeout,
            service.inventory.apply_assignments(changes),
        )
        .await;

        let error = match result {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => err.to_string(),
            Err(_) => "persistence timed out".to_string(),
        };

        if attempt >= service.config.max_batch_retries {
            return Err(format!(
                "batch persistence failed after {} attempts: {}",
                attempt, error
            ));
        }

        tracing::warn!(attempt, error = %error, "batch persistence failed, retrying");
        tokio::time::sleep(service.config.retry_backoff).await;
    }
}
