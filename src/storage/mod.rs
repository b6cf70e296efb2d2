//! Storage traits for rules, inventory and locations
//!
//! The subsystem is agnostic to the underlying persistence mechanism;
//! real backends live in the surrounding application. The in-memory
//! implementations here back tests and development.

use crate::core::card::CardRecord;
use crate::core::rule::{PriorityUpdate, SortingRule, StorageLocation};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod in_memory;

pub use in_memory::{InMemoryInventoryStore, InMemoryLocationStore, InMemoryRuleStore};

/// One location change produced by a re-sort batch.
///
/// `storage_location_id: None` clears the assignment (the card became
/// unassigned because no rule matched).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub card_id: Uuid,
    pub storage_location_id: Option<Uuid>,
}

/// Persistence for sorting rules
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Persist a new rule
    async fn create(&self, rule: SortingRule) -> Result<SortingRule>;

    /// Get a rule by id
    async fn get(&self, id: &Uuid) -> Result<Option<SortingRule>>;

    /// List all rules, in no particular order
    async fn list(&self) -> Result<Vec<SortingRule>>;

    /// Replace an existing rule
    async fn update(&self, id: &Uuid, rule: SortingRule) -> Result<SortingRule>;

    /// Delete a rule; deleted rules are excluded from future snapshots
    async fn delete(&self, id: &Uuid) -> Result<()>;

    /// Apply a batch of priority changes (drag-to-reorder), returning
    /// the number of rules actually updated
    async fn update_priorities(&self, updates: &[PriorityUpdate]) -> Result<usize>;
}

/// Persistence for inventory cards
///
/// Paged listing must use a stable order so a re-sort job can stream
/// the whole inventory in disjoint batches.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Total number of cards
    async fn count(&self) -> Result<usize>;

    /// One stable-ordered page of cards
    async fn list_page(&self, offset: usize, limit: usize) -> Result<Vec<CardRecord>>;

    /// Get a card by id
    async fn get(&self, id: &Uuid) -> Result<Option<CardRecord>>;

    /// Persist a new card
    async fn create(&self, card: CardRecord) -> Result<CardRecord>;

    /// Apply a batch of location changes atomically (per batch, not per
    /// card)
    async fn apply_assignments(&self, assignments: &[Assignment]) -> Result<()>;
}

/// Read access to storage locations (owned by an external subsystem)
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Get a location by id
    async fn get(&self, id: &Uuid) -> Result<Option<StorageLocation>>;

    /// Whether a location exists
    async fn exists(&self, id: &Uuid) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}
