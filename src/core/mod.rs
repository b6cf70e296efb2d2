//! Core domain types: cards, rules, jobs, fields and the error taxonomy

pub mod card;
pub mod error;
pub mod field;
pub mod job;
pub mod rule;

pub use card::{CardRecord, EvaluationContext};
pub use error::{EvaluationError, ParseError, SortError};
pub use field::{CardField, FieldType, FieldValue};
pub use job::{JobStatus, ResortJob};
pub use rule::{PriorityUpdate, SortingRule, StorageLocation};
