//! Typed error handling for the sorting-rule subsystem
//!
//! # Error Categories
//!
//! - [`ParseError`]: malformed expression syntax
//! - [`SortError::Validation`]: unknown field or type-incompatible operator
//! - [`EvaluationError`]: runtime type mismatch on a specific card's data
//! - [`SortError::Conflict`]: a re-sort job is already in progress
//! - [`SortError::NotFound`]: referenced rule, location or job is missing
//!
//! Parse and validation errors block persistence of the offending rule.
//! Evaluation errors are recovered per card inside the engine and only
//! surface here when the caller asked for a single evaluation directly.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Malformed expression syntax, with a source offset where available
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub offset: Option<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }

    pub fn at(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset: Some(offset),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} at position {}", self.message, offset),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Runtime type mismatch while evaluating a comparison against a card's
/// actual data.
///
/// Static validation checks *declared* field types; this error covers
/// the cases where the runtime value diverges (legacy data coming in
/// through the raw-attribute path).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error(
        "field '{field}' holds a {value_type} value, operator '{op}' expects {literal_type}"
    )]
    TypeMismatch {
        field: String,
        op: &'static str,
        value_type: &'static str,
        literal_type: &'static str,
    },

    #[error("list literal for field '{field}' must contain only strings")]
    NonTextListElement { field: String },
}

/// The main error type for the sorting-rule subsystem
#[derive(Debug)]
pub enum SortError {
    /// Malformed expression syntax
    Parse(ParseError),

    /// Unknown field or type-incompatible operator in an expression
    Validation(String),

    /// Runtime type mismatch during a direct evaluation
    Evaluation(EvaluationError),

    /// A bulk re-sort job is already in progress
    Conflict(String),

    /// Referenced rule, storage location or job does not exist
    NotFound { kind: &'static str, id: Uuid },

    /// Storage backend failure
    Storage(anyhow::Error),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortError::Parse(e) => write!(f, "{}", e),
            SortError::Validation(msg) => write!(f, "{}", msg),
            SortError::Evaluation(e) => write!(f, "{}", e),
            SortError::Conflict(msg) => write!(f, "{}", msg),
            SortError::NotFound { kind, id } => {
                write!(f, "{} with id '{}' not found", kind, id)
            }
            SortError::Storage(e) => write!(f, "storage error: {}", e),
            SortError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for SortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SortError::Parse(e) => Some(e),
            SortError::Evaluation(e) => Some(e),
            SortError::Storage(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<ParseError> for SortError {
    fn from(e: ParseError) -> Self {
        SortError::Parse(e)
    }
}

impl From<EvaluationError> for SortError {
    fn from(e: EvaluationError) -> Self {
        SortError::Evaluation(e)
    }
}

impl From<anyhow::Error> for SortError {
    fn from(e: anyhow::Error) -> Self {
        SortError::Storage(e)
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SortError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SortError::Parse(_) => StatusCode::BAD_REQUEST,
            SortError::Validation(_) => StatusCode::BAD_REQUEST,
            SortError::Evaluation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SortError::Conflict(_) => StatusCode::CONFLICT,
            SortError::NotFound { .. } => StatusCode::NOT_FOUND,
            SortError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SortError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SortError::Parse(_) => "PARSE_ERROR",
            SortError::Validation(_) => "VALIDATION_ERROR",
            SortError::Evaluation(_) => "EVALUATION_ERROR",
            SortError::Conflict(_) => "RESORT_CONFLICT",
            SortError::NotFound { .. } => "NOT_FOUND",
            SortError::Storage(_) => "STORAGE_ERROR",
            SortError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            SortError::Parse(ParseError {
                offset: Some(offset),
                ..
            }) => Some(serde_json::json!({ "offset": offset })),
            SortError::NotFound { kind, id } => Some(serde_json::json!({
                "kind": kind,
                "id": id.to_string()
            })),
            _ => None,
        }
    }
}

impl IntoResponse for SortError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}
