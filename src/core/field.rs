//! Card field schema and runtime field values
//!
//! Rule expressions can only reference the fixed set of fields declared
//! here. Each field carries a declared type used by static validation;
//! the runtime value a card actually holds may diverge (legacy data), in
//! which case the evaluator reports a type mismatch.

use serde::{Deserialize, Serialize};

/// Declared type of a card field, used for static validation of
/// rule expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form text (name, rarity, oracle text, ...)
    Text,
    /// Numeric value (price, quantity, mana value)
    Numeric,
    /// List of strings (colors, finishes)
    List,
}

impl FieldType {
    /// Human-readable name, used in validation error messages
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Numeric => "numeric",
            FieldType::List => "list",
        }
    }
}

/// The fixed schema of card fields addressable from rule expressions.
///
/// Unknown field names are a validation error, never silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Name,
    SetCode,
    Rarity,
    Colors,
    ManaCost,
    ManaValue,
    TypeLine,
    OracleText,
    Finishes,
    Price,
    Quantity,
}

impl CardField {
    /// Every field in the schema, in canonical order
    pub const ALL: [CardField; 11] = [
        CardField::Name,
        CardField::SetCode,
        CardField::Rarity,
        CardField::Colors,
        CardField::ManaCost,
        CardField::ManaValue,
        CardField::TypeLine,
        CardField::OracleText,
        CardField::Finishes,
        CardField::Price,
        CardField::Quantity,
    ];

    /// Resolve a field from its expression-language identifier.
    /// Accepts common aliases alongside the canonical snake_case name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(CardField::Name),
            "set_code" | "set" => Some(CardField::SetCode),
            "rarity" => Some(CardField::Rarity),
            "colors" => Some(CardField::Colors),
            "mana_cost" => Some(CardField::ManaCost),
            "mana_value" | "cmc" => Some(CardField::ManaValue),
            "type_line" => Some(CardField::TypeLine),
            "oracle_text" => Some(CardField::OracleText),
            "finishes" => Some(CardField::Finishes),
            "price" => Some(CardField::Price),
            "quantity" => Some(CardField::Quantity),
            _ => None,
        }
    }

    /// Canonical name used as the evaluation-context key
    pub fn canonical_name(&self) -> &'static str {
        match self {
            CardField::Name => "name",
            CardField::SetCode => "set_code",
            CardField::Rarity => "rarity",
            CardField::Colors => "colors",
            CardField::ManaCost => "mana_cost",
            CardField::ManaValue => "mana_value",
            CardField::TypeLine => "type_line",
            CardField::OracleText => "oracle_text",
            CardField::Finishes => "finishes",
            CardField::Price => "price",
            CardField::Quantity => "quantity",
        }
    }

    /// The field's declared type in the schema
    pub fn field_type(&self) -> FieldType {
        match self {
            CardField::Name
            | CardField::SetCode
            | CardField::Rarity
            | CardField::ManaCost
            | CardField::TypeLine
            | CardField::OracleText => FieldType::Text,
            CardField::ManaValue | CardField::Price | CardField::Quantity => FieldType::Numeric,
            CardField::Colors | CardField::Finishes => FieldType::List,
        }
    }
}

/// A runtime field value inside an evaluation context.
///
/// Absent fields (e.g. a card with no price) are simply missing from the
/// context rather than represented as a null variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl FieldValue {
    /// Get the value as text if it is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a number if it is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a list if it is one
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Runtime type name, used in evaluation error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::List(_) => "list",
        }
    }
}
