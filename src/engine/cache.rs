//! Cache of parsed rule ASTs keyed by rule identity and version
//!
//! Parsing is cheap but not free, and bulk re-sorts evaluate the same
//! rule set against thousands of cards. The cache is read-mostly shared
//! state: entries are replaced wholesale when a rule's `updated_at`
//! changes and removed on delete; a stale entry is never partially
//! updated.

use crate::core::error::ParseError;
use crate::core::rule::SortingRule;
use crate::expr::ast::Expr;
use crate::expr::parser::parse;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct CachedAst {
    version: DateTime<Utc>,
    ast: Arc<Expr>,
}

/// Shared cache of parsed expressions, keyed by rule id
#[derive(Debug, Default)]
pub struct AstCache {
    entries: RwLock<HashMap<Uuid, CachedAst>>,
}

impl AstCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached AST for a rule, re-parsing when the cached
    /// version no longer matches the rule's `updated_at`.
    pub fn get_or_parse(&self, rule: &SortingRule) -> Result<Arc<Expr>, ParseError> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = entries.get(&rule.id) {
                if cached.version == rule.updated_at {
                    return Ok(Arc::clone(&cached.ast));
                }
            }
        }

        let ast = Arc::new(parse(&rule.expression)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            rule.id,
            CachedAst {
                version: rule.updated_at,
                ast: Arc::clone(&ast),
            },
        );
        Ok(ast)
    }

    /// Drop a rule's entry (rule deleted)
    pub fn invalidate(&self, id: &Uuid) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(id);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_returns_same_ast() {
        let cache = AstCache::new();
        let rule = SortingRule::new("r", 1, "rarity == \"rare\"", Uuid::new_v4());

        let first = cache.get_or_parse(&rule).unwrap();
        let second = cache.get_or_parse(&rule).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_edit_invalidates_entry() {
        let cache = AstCache::new();
        let mut rule = SortingRule::new("r", 1, "rarity == \"rare\"", Uuid::new_v4());

        let before = cache.get_or_parse(&rule).unwrap();

        rule.expression = "rarity == \"mythic\"".to_string();
        rule.touch();

        let after = cache.get_or_parse(&rule).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = AstCache::new();
        let rule = SortingRule::new("r", 1, "true", Uuid::new_v4());

        cache.get_or_parse(&rule).unwrap();
        assert_eq!(cache.len(), 1);

        cache.invalidate(&rule.id);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_parse_error_propagates() {
        let cache = AstCache::new();
        let rule = SortingRule::new("broken", 1, "rarity ==", Uuid::new_v4());
        assert!(cache.get_or_parse(&rule).is_err());
        assert!(cache.is_empty());
    }
}
