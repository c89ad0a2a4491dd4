//! Menu structure
//!
//! Turns positioned OCR fragments into ordered, sectioned menu items.

pub mod merger;
pub mod rules;

pub use merger::{MergeEvent, MergeOutcome, Merger};
pub use rules::{classify, Classification, PendingItem};

use serde::{Deserialize, Serialize};

/// Section assigned to items that appear before any section header
pub const DEFAULT_SECTION: &str = "General";

/// One structured menu entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Text of the nearest section header above this item
    pub section: String,
    /// Item name
    pub name: String,
    /// First description line found below the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price, if one was found next to or below the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl MenuItem {
    pub fn new(section: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            name: name.into(),
            description: None,
            price: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

/// Payload handed to downstream consumers.
///
/// An empty `items` list means nothing was extracted; it is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuResponse {
    pub items: Vec<MenuItem>,
}

impl MenuResponse {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted() {
        let response = MenuResponse::new(vec![MenuItem::new(DEFAULT_SECTION, "Burger").with_price(22.0)]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "items": [{ "section": "General", "name": "Burger", "price": 22.0 }]
            })
        );
    }

    #[test]
    fn test_response_deserializes_with_missing_optionals() {
        let json = r#"{"items":[{"section":"MAINS","name":"Steak"}]}"#;
        let response: MenuResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.items, vec![MenuItem::new("MAINS", "Steak")]);
    }

    #[test]
    fn test_empty_response() {
        let response = MenuResponse::default();
        assert!(response.is_empty());
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"items":[]}"#);
    }
}
