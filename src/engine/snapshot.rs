//! Immutable, ordered snapshots of the enabled rule set
//!
//! A snapshot is taken once at the start of every bulk job and of every
//! single-card assignment, and is never mutated in place. Rule edits
//! made while a job is running produce a new snapshot for later calls
//! and leave in-flight work untouched.

use crate::core::rule::SortingRule;
use crate::engine::cache::AstCache;
use crate::expr::ast::Expr;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// One enabled rule inside a snapshot, with its parsed expression
#[derive(Debug, Clone)]
pub struct SnapshotRule {
    pub id: Uuid,
    pub name: String,
    pub priority: i32,
    pub storage_location_id: Uuid,
    pub ast: Arc<Expr>,
}

/// An ordered, immutable sequence of enabled rules.
///
/// Ordering is ascending priority (lower value = evaluated first),
/// breaking ties by ascending rule id.
#[derive(Debug, Clone)]
pub struct RuleSetSnapshot {
    rules: Vec<SnapshotRule>,
    pub taken_at: DateTime<Utc>,
}

impl RuleSetSnapshot {
    /// Build a snapshot from the current rule list.
    ///
    /// Disabled rules are dropped. A rule whose expression no longer
    /// parses (which validation should have prevented) is skipped with
    /// a warning rather than poisoning the snapshot.
    pub fn build(mut rules: Vec<SortingRule>, cache: &AstCache) -> Self {
        rules.retain(|rule| rule.enabled);
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));

        let mut snapshot_rules = Vec::with_capacity(rules.len());
        for rule in rules {
            match cache.get_or_parse(&rule) {
                Ok(ast) => snapshot_rules.push(SnapshotRule {
                    id: rule.id,
                    name: rule.name,
                    priority: rule.priority,
                    storage_location_id: rule.storage_location_id,
                    ast,
                }),
                Err(err) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        rule_name = %rule.name,
                        error = %err,
                        "skipping rule with unparseable expression"
                    );
                }
            }
        }

        Self {
            rules: snapshot_rules,
            taken_at: Utc::now(),
        }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[SnapshotRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_with_id(id: u128, priority: i32) -> SortingRule {
        let mut rule = SortingRule::new("r", priority, "true", Uuid::new_v4());
        rule.id = Uuid::from_u128(id);
        rule
    }

    #[test]
    fn test_snapshot_orders_by_priority() {
        let cache = AstCache::new();
        let rules = vec![
            rule_with_id(1, 30),
            rule_with_id(2, 10),
            rule_with_id(3, 20),
        ];
        let snapshot = RuleSetSnapshot::build(rules, &cache);
        let priorities: Vec<i32> = snapshot.rules().iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![10, 20, 30]);
    }

    #[test]
    fn test_equal_priorities_break_ties_by_id() {
        let cache = AstCache::new();
        let rules = vec![rule_with_id(10, 5), rule_with_id(7, 5)];
        let snapshot = RuleSetSnapshot::build(rules, &cache);
        let ids: Vec<Uuid> = snapshot.rules().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(7), Uuid::from_u128(10)]);
    }

    #[test]
    fn test_disabled_rules_excluded() {
        let cache = AstCache::new();
        let mut disabled = rule_with_id(1, 1);
        disabled.enabled = false;
        let snapshot = RuleSetSnapshot::build(vec![disabled, rule_with_id(2, 2)], &cache);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.rules()[0].id, Uuid::from_u128(2));
    }

    #[test]
    fn test_unparseable_rule_skipped() {
        let cache = AstCache::new();
        let mut broken = rule_with_id(1, 1);
        broken.expression = "rarity ==".to_string();
        let snapshot = RuleSetSnapshot::build(vec![broken, rule_with_id(2, 2)], &cache);
        assert_eq!(snapshot.len(), 1);
    }
}
