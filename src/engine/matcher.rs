//! First-match rule scan over a snapshot
//!
//! The first rule (in snapshot order) whose expression evaluates `true`
//! wins. A rule that errors during evaluation is treated as non-matching
//! for that card and recorded as a diagnostic; the scan continues.

use crate::core::card::EvaluationContext;
use crate::engine::snapshot::RuleSetSnapshot;
use crate::expr::eval::evaluate;
use serde::Serialize;
use uuid::Uuid;

/// A winning rule's placement decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub rule_id: Uuid,
    pub storage_location_id: Uuid,
}

/// A per-rule, per-card evaluation failure. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDiagnostic {
    pub rule_id: Uuid,
    pub rule_name: String,
    pub message: String,
}

/// Result of matching one card against a snapshot
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// The first matching rule's placement, or None for no match
    /// (the card stays, or becomes, unassigned)
    pub placement: Option<Placement>,
    /// Evaluation errors encountered along the way
    pub diagnostics: Vec<RuleDiagnostic>,
}

impl MatchOutcome {
    pub fn matched(&self) -> bool {
        self.placement.is_some()
    }
}

/// Scan the snapshot in order and return the first match
pub fn find_placement(snapshot: &RuleSetSnapshot, ctx: &EvaluationContext) -> MatchOutcome {
    let mut diagnostics = Vec::new();

    for rule in snapshot.rules() {
        match evaluate(&rule.ast, ctx) {
            Ok(true) => {
                return MatchOutcome {
                    placement: Some(Placement {
                        rule_id: rule.id,
                        storage_location_id: rule.storage_location_id,
                    }),
                    diagnostics,
                };
            }
            Ok(false) => {}
            Err(err) => {
                diagnostics.push(RuleDiagnostic {
                    rule_id: rule.id,
                    rule_name: rule.name.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    MatchOutcome {
        placement: None,
        diagnostics,
    }
}
