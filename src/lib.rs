//! # cardsort
//!
//! Sorting rule engine and AutoSort service for card collection
//! inventories.
//!
//! Collectors describe where cards belong with small boolean
//! expressions (`rarity == "mythic" AND colors contains "R"`) attached
//! to priority-ordered rules, each pointing at a physical storage
//! location. The engine applies those rules in two modes:
//!
//! - **Single-card assignment**: when a card enters the inventory
//!   without an explicit location, the first matching rule decides
//!   where it goes — synchronously, on the caller's task.
//! - **Bulk re-sort**: a background job that re-evaluates the whole
//!   collection in batches, tracking progress and tolerating
//!   cancellation, with at most one job in flight.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cardsort::prelude::*;
//!
//! let locations = InMemoryLocationStore::new();
//! let binder = locations.add(StorageLocation::new("Mythic Binder"));
//!
//! let service = Arc::new(AutoSortService::new(
//!     Arc::new(InMemoryRuleStore::new()),
//!     Arc::new(InMemoryInventoryStore::new()),
//!     Arc::new(locations),
//! ));
//!
//! service.create_rule(RuleDraft {
//!     name: "mythics".into(),
//!     priority: 1,
//!     expression: "rarity == \"mythic\"".into(),
//!     storage_location_id: binder,
//!     enabled: true,
//! }).await?;
//!
//! let card = service.add_card(CardRecord::new("Etali", "MOM", "mythic")).await?;
//! assert_eq!(card.storage_location_id, Some(binder));
//!
//! let app = build_router(AppState { service });
//! ```

pub mod core;
pub mod engine;
pub mod expr;
pub mod server;
pub mod service;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        card::{CardRecord, EvaluationContext},
        error::{EvaluationError, ParseError, SortError},
        field::{CardField, FieldType, FieldValue},
        job::{JobStatus, ResortJob},
        rule::{PriorityUpdate, SortingRule, StorageLocation},
    };

    // === Expression Language ===
    pub use crate::expr::{
        ast::{CompareOp, Expr, Literal},
        eval::evaluate,
        parser::parse,
        validate::{Validity, validate},
    };

    // === Engine ===
    pub use crate::engine::{
        cache::AstCache,
        matcher::{MatchOutcome, Placement, RuleDiagnostic, find_placement},
        snapshot::{RuleSetSnapshot, SnapshotRule},
    };

    // === Service ===
    pub use crate::service::{
        autosort::{AutoSortConfig, AutoSortService, EvaluateOutcome, RuleDraft},
        registry::{JobHandle, JobRegistry},
    };

    // === Storage ===
    pub use crate::storage::{
        Assignment, InMemoryInventoryStore, InMemoryLocationStore, InMemoryRuleStore,
        InventoryStore, LocationStore, RuleStore,
    };

    // === Server ===
    pub use crate::server::{AppState, build_router};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
