//! Response resolver: (intent, entities) -> reply text.
//!
//! Menu/product entities take priority over the intent. Each entity becomes a
//! product fragment (or a generic acknowledgement), fragments are joined by a
//! blank line, and the order call-to-action is appended when the intent was
//! "place order". Without product entities the intent template is returned
//! verbatim, falling back to the default entry.

use serde::Deserialize;

use crate::templates::{IntentTemplate, MenuItemTemplate, ORDER_CALL_TO_ACTION, PLACE_ORDER_INTENT};

/// Entity categories that mark a menu/product reference (case-insensitive).
pub const PRODUCT_CATEGORIES: &[&str] = &["Plato", "MenuItem", "Producto", "Bebida"];

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Classifier-extracted span tagged with a category. Extra fields on the wire are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entity {
    pub category: String,
    pub text: String,
}

impl Entity {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }

    pub fn is_product(&self) -> bool {
        PRODUCT_CATEGORIES
            .iter()
            .any(|c| c.eq_ignore_ascii_case(self.category.trim()))
    }
}

/// Resolve a reply. Pure; never fails.
pub fn resolve(intent: Option<&str>, entities: &[Entity]) -> String {
    let products: Vec<&str> = entities
        .iter()
        .filter(|e| e.is_product())
        .map(|e| e.text.as_str())
        .collect();

    if products.is_empty() {
        let template = IntentTemplate::from_label(intent);
        tracing::debug!(
            "[MESA] Intent-only reply: {:?} -> {}",
            intent,
            template.label()
        );
        return template.text().to_string();
    }

    tracing::debug!(
        "[MESA] Entity-priority reply for {} product entities (intent {:?} ignored)",
        products.len(),
        intent
    );

    let mut reply = products
        .iter()
        .map(|text| entity_fragment(text))
        .collect::<Vec<_>>()
        .join(FRAGMENT_SEPARATOR);

    if intent == Some(PLACE_ORDER_INTENT) {
        reply.push_str(ORDER_CALL_TO_ACTION);
    }
    reply
}

/// Product fragment for one entity text, or the generic acknowledgement.
pub fn entity_fragment(text: &str) -> String {
    match MenuItemTemplate::lookup(text) {
        Some(item) => item.fragment().to_string(),
        None => format!("{} - ¡Excelente elección!", text.trim()),
    }
}
