//! Abstract syntax tree for rule expressions
//!
//! Expressions form a small, closed grammar: comparisons between a card
//! field and a literal, combined with boolean operators. The tree is
//! immutable once parsed and owned by the rule that produced it.

use serde::{Deserialize, Serialize};

/// A parsed rule expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Boolean literal: `true` or `false` (catch-all rules)
    Literal(bool),
    /// Field comparison: `rarity == "mythic"`, `colors contains "R"`
    Comparison {
        /// Field name as written; resolved against the schema at
        /// validation/evaluation time, not at parse time
        field: String,
        op: CompareOp,
        value: Literal,
    },
    /// Logical AND over two or more children, short-circuiting
    And(Vec<Expr>),
    /// Logical OR over two or more children, short-circuiting
    Or(Vec<Expr>),
    /// Logical NOT of a single child
    Not(Box<Expr>),
}

/// The fixed set of comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>` (numeric fields only)
    Gt,
    /// `>=` (numeric fields only)
    Ge,
    /// `<` (numeric fields only)
    Lt,
    /// `<=` (numeric fields only)
    Le,
    /// `contains` — scalar element match against a list field
    Contains,
    /// `in` — list-literal intersection against a list field
    In,
}

impl CompareOp {
    /// Parse a symbolic operator token
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            _ => None,
        }
    }

    /// The operator as written in expressions
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Contains => "contains",
            CompareOp::In => "in",
        }
    }

    /// `>`, `>=`, `<`, `<=`
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Ge | CompareOp::Lt | CompareOp::Le
        )
    }

    /// `contains`, `in`
    pub fn is_membership(&self) -> bool {
        matches!(self, CompareOp::Contains | CompareOp::In)
    }
}

/// A literal operand in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Quoted string: `"mythic"` or `'mythic'`
    Text(String),
    /// Integer or decimal number
    Number(f64),
    /// Bracketed list of scalars: `["rare", "mythic"]`
    List(Vec<Literal>),
}

impl Literal {
    /// Literal type name, used in validation and evaluation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Text(_) => "text",
            Literal::Number(_) => "number",
            Literal::List(_) => "list",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols() {
        assert_eq!(CompareOp::from_symbol("=="), Some(CompareOp::Eq));
        assert_eq!(CompareOp::from_symbol("!="), Some(CompareOp::Ne));
        assert_eq!(CompareOp::from_symbol(">="), Some(CompareOp::Ge));
        assert_eq!(CompareOp::from_symbol("=>"), None);

        assert_eq!(CompareOp::Contains.symbol(), "contains");
        assert!(CompareOp::Gt.is_ordering());
        assert!(!CompareOp::Eq.is_ordering());
        assert!(CompareOp::In.is_membership());
        assert!(!CompareOp::Le.is_membership());
    }

    #[test]
    fn test_literal_type_names() {
        assert_eq!(Literal::Text("x".into()).type_name(), "text");
        assert_eq!(Literal::Number(1.0).type_name(), "number");
        assert_eq!(Literal::List(vec![]).type_name(), "list");
    }
}
