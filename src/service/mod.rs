//! AutoSort orchestration: the service, the resort loop, and the job
//! registry

pub mod autosort;
pub mod registry;
pub(crate) mod resort;

pub use autosort::{AutoSortConfig, AutoSortService, EvaluateOutcome, RuleDraft};
pub use registry::{JobHandle, JobRegistry};
