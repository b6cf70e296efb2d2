//! Inventory card records and per-card evaluation contexts

use crate::core::field::{CardField, FieldValue};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A single inventory row: one physical card (or stack of identical
/// cards) with its catalog attributes and its current storage location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: Uuid,
    pub name: String,
    pub set_code: String,
    pub rarity: String,
    pub colors: Vec<String>,
    pub mana_cost: String,
    pub mana_value: f64,
    pub type_line: String,
    pub oracle_text: String,
    pub finishes: Vec<String>,
    /// Market price; optional since not every card has pricing data
    pub price: Option<f64>,
    pub quantity: i64,
    /// Physical storage location, None while unassigned
    pub storage_location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CardRecord {
    /// Create a record with the identifying attributes set and everything
    /// else defaulted. Remaining fields are public for direct assignment.
    pub fn new(name: &str, set_code: &str, rarity: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            set_code: set_code.to_string(),
            rarity: rarity.to_string(),
            colors: Vec::new(),
            mana_cost: String::new(),
            mana_value: 0.0,
            type_line: String::new(),
            oracle_text: String::new(),
            finishes: Vec::new(),
            price: None,
            quantity: 1,
            storage_location_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A flat, read-only mapping from card field names to typed values.
///
/// Built fresh per card per evaluation and never mutated while an
/// expression is being walked. Absent fields (a card with no price) are
/// simply missing from the map.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    fields: IndexMap<String, FieldValue>,
}

impl EvaluationContext {
    /// Empty context; mainly useful in tests
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a typed inventory record.
    ///
    /// All fields carry their declared types here; divergence between
    /// declared and runtime types can only enter through [`from_json`].
    ///
    /// [`from_json`]: EvaluationContext::from_json
    pub fn from_card(card: &CardRecord) -> Self {
        let mut ctx = Self::new();
        ctx.set("name", FieldValue::Text(card.name.clone()));
        ctx.set("set_code", FieldValue::Text(card.set_code.clone()));
        ctx.set("rarity", FieldValue::Text(card.rarity.clone()));
        ctx.set("colors", FieldValue::List(card.colors.clone()));
        ctx.set("mana_cost", FieldValue::Text(card.mana_cost.clone()));
        ctx.set("mana_value", FieldValue::Number(card.mana_value));
        ctx.set("type_line", FieldValue::Text(card.type_line.clone()));
        ctx.set("oracle_text", FieldValue::Text(card.oracle_text.clone()));
        ctx.set("finishes", FieldValue::List(card.finishes.clone()));
        if let Some(price) = card.price {
            ctx.set("price", FieldValue::Number(price));
        }
        ctx.set("quantity", FieldValue::Number(card.quantity as f64));
        ctx
    }

    /// Build a context from a raw attribute record (the live rule tester
    /// path). Keys are canonicalized through the field schema where they
    /// resolve; values keep whatever runtime type the JSON carries, so a
    /// string where a number is declared surfaces as an evaluation error
    /// later rather than being coerced here.
    pub fn from_json(card_data: &Value) -> Self {
        let mut ctx = Self::new();
        let Some(object) = card_data.as_object() else {
            return ctx;
        };
        for (key, value) in object {
            let name = CardField::from_name(key)
                .map(|f| f.canonical_name().to_string())
                .unwrap_or_else(|| key.clone());
            if let Some(field_value) = json_to_field_value(value) {
                ctx.set(&name, field_value);
            }
        }
        ctx
    }

    /// Insert a field value. Contexts are only built up front; evaluation
    /// never mutates them.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// Look up a field by name; None means the field is absent
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn json_to_field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::Array(items) => {
            let strings: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect();
            Some(FieldValue::List(strings))
        }
        // null, booleans and nested objects have no field representation;
        // the field stays absent
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_from_card() {
        let mut card = CardRecord::new("Lightning Bolt", "MOM", "common");
        card.colors = vec!["R".to_string()];
        card.price = Some(1.5);

        let ctx = EvaluationContext::from_card(&card);
        assert_eq!(
            ctx.get("name"),
            Some(&FieldValue::Text("Lightning Bolt".to_string()))
        );
        assert_eq!(
            ctx.get("colors"),
            Some(&FieldValue::List(vec!["R".to_string()]))
        );
        assert_eq!(ctx.get("price"), Some(&FieldValue::Number(1.5)));
        assert_eq!(ctx.get("quantity"), Some(&FieldValue::Number(1.0)));
    }

    #[test]
    fn test_missing_price_is_absent() {
        let card = CardRecord::new("Island", "MOM", "common");
        let ctx = EvaluationContext::from_card(&card);
        assert_eq!(ctx.get("price"), None);
    }

    #[test]
    fn test_context_from_json_canonicalizes_aliases() {
        let ctx = EvaluationContext::from_json(&json!({
            "set": "MOM",
            "cmc": 3,
            "colors": ["R", "G"],
        }));
        assert_eq!(
            ctx.get("set_code"),
            Some(&FieldValue::Text("MOM".to_string()))
        );
        assert_eq!(ctx.get("mana_value"), Some(&FieldValue::Number(3.0)));
        assert_eq!(
            ctx.get("colors"),
            Some(&FieldValue::List(vec!["R".to_string(), "G".to_string()]))
        );
    }

    #[test]
    fn test_context_from_json_keeps_divergent_types() {
        // Legacy data: price stored as a string
        let ctx = EvaluationContext::from_json(&json!({"price": "3.50"}));
        assert_eq!(ctx.get("price"), Some(&FieldValue::Text("3.50".to_string())));
    }

    #[test]
    fn test_context_from_non_object_is_empty() {
        let ctx = EvaluationContext::from_json(&json!(["not", "an", "object"]));
        assert!(ctx.is_empty());
    }
}
