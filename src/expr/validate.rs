//! Static validation of rule expressions against the field schema
//!
//! Validation never executes an expression against card data. It checks
//! syntax (via the parser), field names, and operator/type compatibility
//! using each field's *declared* type. Runtime divergence is handled
//! separately by the evaluator.

use crate::core::error::SortError;
use crate::core::field::{CardField, FieldType};
use crate::expr::ast::{CompareOp, Expr, Literal};
use crate::expr::parser::parse;
use serde::Serialize;

/// Result of a validation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validity {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Validity {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn invalid(error: String) -> Self {
        Self {
            valid: false,
            error: Some(error),
        }
    }
}

/// Validate expression text: syntax, field names, type compatibility
pub fn validate(text: &str) -> Validity {
    let expr = match parse(text) {
        Ok(expr) => expr,
        Err(err) => return Validity::invalid(err.to_string()),
    };
    match check(&expr) {
        Ok(()) => Validity::ok(),
        Err(message) => Validity::invalid(message),
    }
}

/// Validate and map failures onto the subsystem error taxonomy; used to
/// gate rule create/update.
pub fn ensure_valid(text: &str) -> Result<(), SortError> {
    let expr = parse(text)?;
    check(&expr).map_err(SortError::Validation)
}

/// Walk a parsed expression and check every comparison against the
/// declared schema
pub fn check(expr: &Expr) -> Result<(), String> {
    match expr {
        Expr::Literal(_) => Ok(()),
        Expr::Not(child) => check(child),
        Expr::And(children) | Expr::Or(children) => {
            for child in children {
                check(child)?;
            }
            Ok(())
        }
        Expr::Comparison { field, op, value } => check_comparison(field, *op, value),
    }
}

fn check_comparison(field: &str, op: CompareOp, value: &Literal) -> Result<(), String> {
    let Some(card_field) = CardField::from_name(field) else {
        return Err(format!("unknown field '{}'", field));
    };
    let field_type = card_field.field_type();

    if op.is_ordering() {
        if field_type != FieldType::Numeric {
            return Err(format!(
                "operator '{}' requires a numeric field, but '{}' is {}",
                op.symbol(),
                field,
                field_type.name()
            ));
        }
        if !matches!(value, Literal::Number(_)) {
            return Err(format!(
                "operator '{}' on field '{}' requires a number literal, found {}",
                op.symbol(),
                field,
                value.type_name()
            ));
        }
        return Ok(());
    }

    if op.is_membership() {
        if field_type != FieldType::List {
            return Err(format!(
                "operator '{}' requires a list field, but '{}' is {}",
                op.symbol(),
                field,
                field_type.name()
            ));
        }
        return match (op, value) {
            (CompareOp::Contains, Literal::Text(_)) => Ok(()),
            (CompareOp::Contains, other) => Err(format!(
                "'contains' on field '{}' requires a string literal, found {}",
                field,
                other.type_name()
            )),
            (CompareOp::In, Literal::List(items)) => {
                if items.iter().all(|i| matches!(i, Literal::Text(_))) {
                    Ok(())
                } else {
                    Err(format!(
                        "'in' list for field '{}' must contain only strings",
                        field
                    ))
                }
            }
            (CompareOp::In, other) => Err(format!(
                "'in' on field '{}' requires a list literal, found {}",
                field,
                other.type_name()
            )),
            _ => unreachable!("membership covers exactly contains and in"),
        };
    }

    // Equality / inequality: the literal type must match the declared
    // field type
    let compatible = matches!(
        (field_type, value),
        (FieldType::Text, Literal::Text(_))
            | (FieldType::Numeric, Literal::Number(_))
            | (FieldType::List, Literal::List(_))
    );
    if compatible {
        Ok(())
    } else {
        Err(format!(
            "operator '{}' on {} field '{}' is incompatible with a {} literal",
            op.symbol(),
            field_type.name(),
            field,
            value.type_name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_expressions() {
        assert!(validate("rarity == \"mythic\"").valid);
        assert!(validate("rarity == \"mythic\" AND colors contains \"R\"").valid);
        assert!(validate("price > 10 OR quantity >= 4").valid);
        assert!(validate("finishes in [\"foil\"]").valid);
        assert!(validate("NOT (set_code == \"MOM\")").valid);
        assert!(validate("true").valid);
    }

    #[test]
    fn test_syntax_error_reported() {
        let result = validate("rarity ==");
        assert!(!result.valid);
        assert!(!result.error.unwrap().is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = validate("power == \"3\"");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("unknown field 'power'"));
    }

    #[test]
    fn test_ordering_on_text_field_rejected() {
        let result = validate("rarity > \"common\"");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("requires a numeric field"));
    }

    #[test]
    fn test_ordering_with_text_literal_rejected() {
        let result = validate("price > \"ten\"");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("number literal"));
    }

    #[test]
    fn test_membership_on_scalar_field_rejected() {
        let result = validate("rarity contains \"myth\"");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("requires a list field"));

        let result = validate("price in [\"1\"]");
        assert!(!result.valid);
    }

    #[test]
    fn test_in_requires_string_elements() {
        let result = validate("colors in [1, 2]");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("only strings"));
    }

    #[test]
    fn test_equality_type_mismatch_rejected() {
        let result = validate("price == \"3.50\"");
        assert!(!result.valid);

        let result = validate("name == 7");
        assert!(!result.valid);
    }

    #[test]
    fn test_error_nested_inside_logical_found() {
        let result = validate("rarity == \"rare\" AND bogus == 1");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("bogus"));
    }

    #[test]
    fn test_ensure_valid_maps_errors() {
        assert!(matches!(
            ensure_valid("rarity =="),
            Err(SortError::Parse(_))
        ));
        assert!(matches!(
            ensure_valid("bogus == 1"),
            Err(SortError::Validation(_))
        ));
        assert!(ensure_valid("rarity == \"rare\"").is_ok());
    }
}
