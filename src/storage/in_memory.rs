//! In-memory store implementations for testing and development

use crate::core::card::CardRecord;
use crate::core::rule::{PriorityUpdate, SortingRule, StorageLocation};
use crate::storage::{Assignment, InventoryStore, LocationStore, RuleStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory rule store. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryRuleStore {
    rules: Arc<RwLock<HashMap<Uuid, SortingRule>>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn create(&self, rule: SortingRule) -> Result<SortingRule> {
        let mut rules = self
            .rules
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        rules.insert(rule.id, rule.clone());

        Ok(rule)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<SortingRule>> {
        let rules = self
            .rules
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(rules.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<SortingRule>> {
        let rules = self
            .rules
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(rules.values().cloned().collect())
    }

    async fn update(&self, id: &Uuid, rule: SortingRule) -> Result<SortingRule> {
        let mut rules = self
            .rules
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        rules.get_mut(id).ok_or_else(|| anyhow!("Rule not found"))?;

        rules.insert(*id, rule.clone());

        Ok(rule)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut rules = self
            .rules
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        rules.remove(id);

        Ok(())
    }

    async fn update_priorities(&self, updates: &[PriorityUpdate]) -> Result<usize> {
        let mut rules = self
            .rules
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let mut updated = 0;
        for update in updates {
            if let Some(rule) = rules.get_mut(&update.id) {
                rule.priority = update.priority;
                rule.touch();
                updated += 1;
            }
        }

        Ok(updated)
    }
}

/// In-memory inventory store.
///
/// Cards live in a BTreeMap keyed by id, giving `list_page` a stable
/// ascending-id order for free.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    cards: Arc<RwLock<BTreeMap<Uuid, CardRecord>>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn count(&self) -> Result<usize> {
        let cards = self
            .cards
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(cards.len())
    }

    async fn list_page(&self, offset: usize, limit: usize) -> Result<Vec<CardRecord>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(cards.values().skip(offset).take(limit).cloned().collect())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<CardRecord>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(cards.get(id).cloned())
    }

    async fn create(&self, card: CardRecord) -> Result<CardRecord> {
        let mut cards = self
            .cards
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        cards.insert(card.id, card.clone());

        Ok(card)
    }

    async fn apply_assignments(&self, assignments: &[Assignment]) -> Result<()> {
        let mut cards = self
            .cards
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        for assignment in assignments {
            if let Some(card) = cards.get_mut(&assignment.card_id) {
                card.storage_location_id = assignment.storage_location_id;
                card.touch();
            }
        }

        Ok(())
    }
}

/// In-memory location store
#[derive(Clone, Default)]
pub struct InMemoryLocationStore {
    locations: Arc<RwLock<HashMap<Uuid, StorageLocation>>>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a location, returning its id
    pub fn add(&self, location: StorageLocation) -> Uuid {
        let id = location.id;
        if let Ok(mut locations) = self.locations.write() {
            locations.insert(id, location);
        }
        id
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn get(&self, id: &Uuid) -> Result<Option<StorageLocation>> {
        let locations = self
            .locations
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(locations.get(id).cloned())
    }
}
