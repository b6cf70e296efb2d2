//! Sorting rules and storage locations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, priority-ordered expression mapping to a target storage
/// location.
///
/// Lower priority values are evaluated first; equal priorities break
/// ties by ascending rule id. Disabled rules are excluded from every
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortingRule {
    pub id: Uuid,
    pub name: String,
    pub priority: i32,
    /// Rule expression text; validated before the rule can be persisted
    pub expression: String,
    pub storage_location_id: Uuid,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SortingRule {
    pub fn new(name: &str, priority: i32, expression: &str, storage_location_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            priority,
            expression: expression.to_string(),
            storage_location_id,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the modification timestamp.
    ///
    /// This also serves as the cache version for the rule's parsed AST:
    /// any edit that touches the rule forces a re-parse on next use.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// One entry of a batch priority update (drag-to-reorder)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityUpdate {
    pub id: Uuid,
    pub priority: i32,
}

/// A physical storage location (binder, box, shelf).
///
/// Owned by the storage-location CRUD subsystem; this crate only needs
/// existence checks and names for placement responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: Uuid,
    pub name: String,
}

impl StorageLocation {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }
}
