//! HTTP handlers for the sorting-rule and re-sort endpoints
//!
//! Handlers are thin adapters over [`AutoSortService`]; all policy
//! (validation gating, single-flight, snapshotting) lives in the
//! service layer.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::SortError;
use crate::core::job::ResortJob;
use crate::core::rule::{PriorityUpdate, SortingRule};
use crate::expr::validate::Validity;
use crate::service::autosort::{AutoSortService, EvaluateOutcome, RuleDraft};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AutoSortService>,
}

/// Request body for expression validation
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub expression: String,
}

/// Request body for the live rule tester
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub card_data: serde_json::Value,
}

/// Request body for batch priority updates
#[derive(Debug, Deserialize)]
pub struct BatchPrioritiesRequest {
    pub updates: Vec<PriorityUpdate>,
}

/// Response for batch priority updates
#[derive(Debug, Serialize)]
pub struct BatchPrioritiesResponse {
    pub updated_count: usize,
}

/// Response for a triggered re-sort
#[derive(Debug, Serialize)]
pub struct ResortResponse {
    pub job_id: Uuid,
}

/// GET /sorting-rules
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<Vec<SortingRule>>, SortError> {
    let rules = state.service.list_rules().await?;
    Ok(Json(rules))
}

/// POST /sorting-rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(draft): Json<RuleDraft>,
) -> Result<(StatusCode, Json<SortingRule>), SortError> {
    let rule = state.service.create_rule(draft).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// PUT /sorting-rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<RuleDraft>,
) -> Result<Json<SortingRule>, SortError> {
    let rule = state.service.update_rule(id, draft).await?;
    Ok(Json(rule))
}

/// DELETE /sorting-rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, SortError> {
    state.service.delete_rule(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sorting-rules/validate
///
/// Always 200: an invalid expression is a successful validation request
/// with `valid: false`.
pub async fn validate_expression(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Json<Validity> {
    Json(state.service.validate_expression(&request.expression))
}

/// POST /sorting-rules/evaluate
pub async fn evaluate_card(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateOutcome>, SortError> {
    let outcome = state.service.evaluate_card(&request.card_data).await?;
    Ok(Json(outcome))
}

/// POST /sorting-rules/batch/priorities
pub async fn update_priorities(
    State(state): State<AppState>,
    Json(request): Json<BatchPrioritiesRequest>,
) -> Result<Json<BatchPrioritiesResponse>, SortError> {
    let updated_count = state.service.update_priorities(&request.updates).await?;
    Ok(Json(BatchPrioritiesResponse { updated_count }))
}

/// POST /inventory/resort
pub async fn trigger_resort(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ResortResponse>), SortError> {
    let job_id = state.service.trigger_resort()?;
    Ok((StatusCode::ACCEPTED, Json(ResortResponse { job_id })))
}

/// GET /resort-jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResortJob>, SortError> {
    let job = state.service.job(&id)?;
    Ok(Json(job))
}

/// POST /resort-jobs/{id}/cancel
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, SortError> {
    state.service.cancel_resort(id)?;
    Ok(StatusCode::ACCEPTED)
}
