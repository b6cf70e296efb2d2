//! The AutoSort service: rule management, single-card assignment, and
//! bulk re-sort orchestration
//!
//! Both operating modes go through the same engine call: build a
//! snapshot, build a context per card, take the first match. The
//! single-card path runs synchronously on the caller's task; the bulk
//! path runs as a background task owned by the job registry.

use crate::core::card::{CardRecord, EvaluationContext};
use crate::core::error::SortError;
use crate::core::job::ResortJob;
use crate::core::rule::{PriorityUpdate, SortingRule, StorageLocation};
use crate::engine::cache::AstCache;
use crate::engine::matcher::find_placement;
use crate::engine::snapshot::RuleSetSnapshot;
use crate::expr::validate::ensure_valid;
use crate::service::registry::JobRegistry;
use crate::service::resort;
use crate::storage::{InventoryStore, LocationStore, RuleStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Tuning knobs for the bulk re-sort loop
#[derive(Debug, Clone)]
pub struct AutoSortConfig {
    /// Cards per batch; one batched write per batch
    pub batch_size: usize,
    /// Attempts per batch before the job fails
    pub max_batch_retries: u32,
    /// Delay between persistence retries
    pub retry_backoff: Duration,
    /// Per-attempt timeout on the batched write
    pub persist_timeout: Duration,
}

impl Default for AutoSortConfig {
    fn default() -> Self {
        Self {
            batch_size: 200,
            max_batch_retries: 3,
            retry_backoff: Duration::from_millis(250),
            persist_timeout: Duration::from_secs(10),
        }
    }
}

/// Request body for creating or replacing a rule
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDraft {
    pub name: String,
    pub priority: i32,
    pub expression: String,
    pub storage_location_id: Uuid,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Result of a one-off evaluation (the UI's live rule tester)
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateOutcome {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<StorageLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Orchestrates rule management and card placement
pub struct AutoSortService {
    pub(crate) rules: Arc<dyn RuleStore>,
    pub(crate) inventory: Arc<dyn InventoryStore>,
    pub(crate) locations: Arc<dyn LocationStore>,
    pub(crate) registry: Arc<JobRegistry>,
    pub(crate) cache: Arc<AstCache>,
    pub(crate) config: AutoSortConfig,
}

impl AutoSortService {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        inventory: Arc<dyn InventoryStore>,
        locations: Arc<dyn LocationStore>,
    ) -> Self {
        Self::with_config(rules, inventory, locations, AutoSortConfig::default())
    }

    pub fn with_config(
        rules: Arc<dyn RuleStore>,
        inventory: Arc<dyn InventoryStore>,
        locations: Arc<dyn LocationStore>,
        config: AutoSortConfig,
    ) -> Self {
        Self {
            rules,
            inventory,
            locations,
            registry: Arc::new(JobRegistry::new()),
            cache: Arc::new(AstCache::new()),
            config,
        }
    }

    /// Build a fresh snapshot of the enabled rule set.
    ///
    /// Snapshots are cheap: the rule list is one store read and parsed
    /// ASTs come from the cache, so priority reorders and edits take
    /// effect on the very next call.
    pub(crate) async fn snapshot(&self) -> Result<RuleSetSnapshot, SortError> {
        let rules = self.rules.list().await?;
        Ok(RuleSetSnapshot::build(rules, &self.cache))
    }

    // === Rule management ===

    /// List all rules in evaluation order
    pub async fn list_rules(&self) -> Result<Vec<SortingRule>, SortError> {
        let mut rules = self.rules.list().await?;
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));
        Ok(rules)
    }

    /// Create a rule. The expression must validate and the target
    /// location must exist; otherwise nothing is persisted.
    pub async fn create_rule(&self, draft: RuleDraft) -> Result<SortingRule, SortError> {
        ensure_valid(&draft.expression)?;
        self.ensure_location(&draft.storage_location_id).await?;

        let mut rule = SortingRule::new(
            &draft.name,
            draft.priority,
            &draft.expression,
            draft.storage_location_id,
        );
        rule.enabled = draft.enabled;

        let rule = self.rules.create(rule).await?;
        tracing::info!(rule_id = %rule.id, name = %rule.name, "sorting rule created");
        Ok(rule)
    }

    /// Replace a rule. Same gating as create; the AST cache entry is
    /// superseded via the bumped `updated_at`.
    pub async fn update_rule(&self, id: Uuid, draft: RuleDraft) -> Result<SortingRule, SortError> {
        let Some(mut rule) = self.rules.get(&id).await? else {
            return Err(SortError::NotFound {
                kind: "sorting rule",
                id,
            });
        };

        ensure_valid(&draft.expression)?;
        self.ensure_location(&draft.storage_location_id).await?;

        rule.name = draft.name;
        rule.priority = draft.priority;
        rule.expression = draft.expression;
        rule.storage_location_id = draft.storage_location_id;
        rule.enabled = draft.enabled;
        rule.touch();

        let rule = self.rules.update(&id, rule).await?;
        tracing::info!(rule_id = %rule.id, "sorting rule updated");
        Ok(rule)
    }

    /// Delete a rule; it is excluded from all future snapshots
    pub async fn delete_rule(&self, id: Uuid) -> Result<(), SortError> {
        if self.rules.get(&id).await?.is_none() {
            return Err(SortError::NotFound {
                kind: "sorting rule",
                id,
            });
        }
        self.rules.delete(&id).await?;
        self.cache.invalidate(&id);
        tracing::info!(rule_id = %id, "sorting rule deleted");
        Ok(())
    }

    /// Apply a batch of priority changes (drag-to-reorder)
    pub async fn update_priorities(
        &self,
        updates: &[PriorityUpdate],
    ) -> Result<usize, SortError> {
        let updated = self.rules.update_priorities(updates).await?;
        tracing::info!(updated, "rule priorities updated");
        Ok(updated)
    }

    /// Validate expression text without persisting or evaluating it
    pub fn validate_expression(&self, text: &str) -> crate::expr::validate::Validity {
        crate::expr::validate::validate(text)
    }

    // === Placement ===

    /// Add a card to inventory, assigning a storage location via the
    /// rule engine when the record does not already specify one.
    pub async fn add_card(&self, mut card: CardRecord) -> Result<CardRecord, SortError> {
        if card.storage_location_id.is_none() {
            let snapshot = self.snapshot().await?;
            let ctx = EvaluationContext::from_card(&card);
            let outcome = find_placement(&snapshot, &ctx);
            for diagnostic in &outcome.diagnostics {
                tracing::debug!(
                    card_id = %card.id,
                    rule_id = %diagnostic.rule_id,
                    error = %diagnostic.message,
                    "rule skipped during assignment"
                );
            }
            card.storage_location_id = outcome.placement.map(|p| p.storage_location_id);
        }
        Ok(self.inventory.create(card).await?)
    }

    /// Evaluate a raw attribute record against the current rule set
    /// (the live rule tester; also the internal single-card path).
    pub async fn evaluate_card(
        &self,
        card_data: &serde_json::Value,
    ) -> Result<EvaluateOutcome, SortError> {
        let snapshot = self.snapshot().await?;
        let ctx = EvaluationContext::from_json(card_data);
        let outcome = find_placement(&snapshot, &ctx);

        let error = if outcome.diagnostics.is_empty() {
            None
        } else {
            Some(
                outcome
                    .diagnostics
                    .iter()
                    .map(|d| format!("rule '{}': {}", d.rule_name, d.message))
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        };

        let storage_location = match &outcome.placement {
            Some(placement) => self.locations.get(&placement.storage_location_id).await?,
            None => None,
        };

        Ok(EvaluateOutcome {
            matched: outcome.matched(),
            storage_location,
            error,
        })
    }

    // === Bulk re-sort ===

    /// Trigger a bulk re-sort as a background task.
    ///
    /// Returns the job id immediately; rejects with a conflict when a
    /// job is already in flight.
    pub fn trigger_resort(self: &Arc<Self>) -> Result<Uuid, SortError> {
        let handle = self.registry.begin()?;
        let job_id = handle.job_id;
        let service = Arc::clone(self);
        tokio::spawn(async move {
            resort::run(service, handle).await;
        });
        Ok(job_id)
    }

    /// Request cooperative cancellation of a running job
    pub fn cancel_resort(&self, id: Uuid) -> Result<(), SortError> {
        self.registry.request_cancel(id)
    }

    /// Live state of a resort job
    pub fn job(&self, id: &Uuid) -> Result<ResortJob, SortError> {
        self.registry.get(id).ok_or(SortError::NotFound {
            kind: "resort job",
            id: *id,
        })
    }

    /// The job registry (for boundary integrations)
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    async fn ensure_location(&self, id: &Uuid) -> Result<(), SortError> {
        if self.locations.exists(id).await? {
            Ok(())
        } else {
            Err(SortError::NotFound {
                kind: "storage location",
                id: *id,
            })
        }
    }
}
