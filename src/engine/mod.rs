//! Rule engine: parsed-AST cache, rule-set snapshots, first-match scan

pub mod cache;
pub mod matcher;
pub mod snapshot;

pub use cache::AstCache;
pub use matcher::{MatchOutcome, Placement, RuleDiagnostic, find_placement};
pub use snapshot::{RuleSetSnapshot, SnapshotRule};
