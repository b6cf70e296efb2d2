//! Router builder for the sorting-rule subsystem
//!
//! Routes exposed:
//! - GET    /sorting-rules                  - List rules in evaluation order
//! - POST   /sorting-rules                  - Create a rule (validated)
//! - PUT    /sorting-rules/{id}             - Replace a rule (validated)
//! - DELETE /sorting-rules/{id}             - Delete a rule
//! - POST   /sorting-rules/validate         - Validate expression text
//! - POST   /sorting-rules/evaluate         - Live rule tester
//! - POST   /sorting-rules/batch/priorities - Batch priority reorder
//! - POST   /inventory/resort               - Trigger a bulk re-sort
//! - GET    /resort-jobs/{id}               - Job status and progress
//! - POST   /resort-jobs/{id}/cancel        - Cooperative cancellation

use crate::server::handlers::{
    AppState, cancel_job, create_rule, delete_rule, evaluate_card, get_job, list_rules,
    trigger_resort, update_priorities, update_rule, validate_expression,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the subsystem router with tracing and CORS layers applied
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/sorting-rules", get(list_rules).post(create_rule))
        .route("/sorting-rules/validate", post(validate_expression))
        .route("/sorting-rules/evaluate", post(evaluate_card))
        .route("/sorting-rules/batch/priorities", post(update_priorities))
        .route("/sorting-rules/{id}", put(update_rule).delete(delete_rule))
        .route("/inventory/resort", post(trigger_resort))
        .route("/resort-jobs/{id}", get(get_job))
        .route("/resort-jobs/{id}/cancel", post(cancel_job))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
