//! Expression evaluation against a single card's attributes
//!
//! Evaluation is a pure function of (AST, context). `AND`/`OR` short
//! circuit. A comparison on an absent field is `false` — absence is not
//! a match. A literal whose type is incompatible with the field's
//! *actual* runtime value is an [`EvaluationError`]; the engine treats
//! that as non-matching for the rule and keeps scanning.

use crate::core::card::EvaluationContext;
use crate::core::error::EvaluationError;
use crate::core::field::FieldValue;
use crate::expr::ast::{CompareOp, Expr, Literal};

/// Evaluate an expression against one card's context
pub fn evaluate(expr: &Expr, ctx: &EvaluationContext) -> Result<bool, EvaluationError> {
    match expr {
        Expr::Literal(value) => Ok(*value),
        Expr::Not(child) => Ok(!evaluate(child, ctx)?),
        Expr::And(children) => {
            for child in children {
                if !evaluate(child, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expr::Or(children) => {
            for child in children {
                if evaluate(child, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expr::Comparison { field, op, value } => {
            // Absent field: not a match, not an error
            let Some(actual) = ctx.get(field) else {
                return Ok(false);
            };
            compare(field, *op, actual, value)
        }
    }
}

fn compare(
    field: &str,
    op: CompareOp,
    actual: &FieldValue,
    literal: &Literal,
) -> Result<bool, EvaluationError> {
    match op {
        CompareOp::Eq => equals(field, op, actual, literal),
        CompareOp::Ne => equals(field, op, actual, literal).map(|eq| !eq),
        CompareOp::Gt | CompareOp::Ge | CompareOp::Lt | CompareOp::Le => {
            let (FieldValue::Number(lhs), Literal::Number(rhs)) = (actual, literal) else {
                return Err(mismatch(field, op, actual, literal));
            };
            Ok(match op {
                CompareOp::Gt => lhs > rhs,
                CompareOp::Ge => lhs >= rhs,
                CompareOp::Lt => lhs < rhs,
                CompareOp::Le => lhs <= rhs,
                _ => unreachable!(),
            })
        }
        CompareOp::Contains => {
            let (FieldValue::List(items), Literal::Text(needle)) = (actual, literal) else {
                return Err(mismatch(field, op, actual, literal));
            };
            Ok(items.iter().any(|item| item == needle))
        }
        CompareOp::In => {
            let (FieldValue::List(items), Literal::List(candidates)) = (actual, literal) else {
                return Err(mismatch(field, op, actual, literal));
            };
            let mut texts = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                match candidate {
                    Literal::Text(s) => texts.push(s),
                    _ => {
                        return Err(EvaluationError::NonTextListElement {
                            field: field.to_string(),
                        });
                    }
                }
            }
            Ok(items.iter().any(|item| texts.iter().any(|t| *t == item)))
        }
    }
}

fn equals(
    field: &str,
    op: CompareOp,
    actual: &FieldValue,
    literal: &Literal,
) -> Result<bool, EvaluationError> {
    match (actual, literal) {
        // Case-sensitive exact match by design
        (FieldValue::Text(a), Literal::Text(b)) => Ok(a == b),
        (FieldValue::Number(a), Literal::Number(b)) => Ok(a == b),
        (FieldValue::List(items), Literal::List(candidates)) => {
            let mut texts = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                match candidate {
                    Literal::Text(s) => texts.push(s.clone()),
                    _ => {
                        return Err(EvaluationError::NonTextListElement {
                            field: field.to_string(),
                        });
                    }
                }
            }
            // Unordered comparison: ["R","G"] equals ["G","R"]
            let mut lhs = items.clone();
            let mut rhs = texts;
            lhs.sort();
            rhs.sort();
            Ok(lhs == rhs)
        }
        _ => Err(mismatch(field, op, actual, literal)),
    }
}

fn mismatch(field: &str, op: CompareOp, actual: &FieldValue, literal: &Literal) -> EvaluationError {
    EvaluationError::TypeMismatch {
        field: field.to_string(),
        op: op.symbol(),
        value_type: actual.type_name(),
        literal_type: literal.type_name(),
    }
}
