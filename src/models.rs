//! Core data models used throughout Showroom.
//!
//! These types represent the catalog items, conversation turns, and chat
//! outcomes that flow through the retrieval and chat pipeline.

use serde::{Deserialize, Serialize};

/// A single catalog entry, immutable after load.
///
/// Owned by the [`CatalogStore`](crate::catalog::CatalogStore); every other
/// component sees it read-only. Field names mirror the catalog JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub materials: String,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub asset_urls: Vec<String>,
}

impl CatalogItem {
    /// All text fields joined and lowercased, for substring matching.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.name,
            self.description,
            self.category,
            self.manufacturer,
            self.materials,
            self.tags.join(" ")
        )
        .to_lowercase()
    }

    /// Labeled concatenation of the salient fields, used as embedding input.
    ///
    /// The labels bias the embedding toward catalog semantics rather than
    /// raw word co-occurrence.
    pub fn embedding_text(&self) -> String {
        format!(
            "{}. {} {} Category: {}. Materials: {}. Manufacturer: {}. Tags: {}",
            self.name,
            self.short_description,
            self.description,
            self.category,
            self.materials,
            self.manufacturer,
            self.tags.join(", ")
        )
    }
}

/// One conversation turn as sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// The outcome of a chat turn: the phrased reply plus any matched products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub reply: String,
    pub products: Vec<CatalogItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> CatalogItem {
        CatalogItem {
            id: 1,
            name: "Sedia Nordica".to_string(),
            manufacturer: "Acme".to_string(),
            category: "Sedie".to_string(),
            description: "Una sedia in legno chiaro".to_string(),
            short_description: "Sedia scandinava".to_string(),
            materials: "legno".to_string(),
            dimensions: "45x45x80".to_string(),
            tags: vec!["legno".to_string(), "nordico".to_string()],
            image_urls: vec![],
            asset_urls: vec![],
        }
    }

    #[test]
    fn test_searchable_text_is_lowercase_and_joined() {
        let text = item().searchable_text();
        assert!(text.contains("sedia nordica"));
        assert!(text.contains("sedie"));
        assert!(text.contains("acme"));
        assert!(text.contains("nordico"));
        assert_eq!(text, text.to_lowercase());
    }

    #[test]
    fn test_embedding_text_carries_labels() {
        let text = item().embedding_text();
        assert!(text.contains("Category: Sedie"));
        assert!(text.contains("Materials: legno"));
        assert!(text.contains("Manufacturer: Acme"));
    }

    #[test]
    fn test_item_deserializes_with_missing_fields() {
        let item: CatalogItem = serde_json::from_str(r#"{"id": 7, "name": "Lampada"}"#).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.name, "Lampada");
        assert!(item.tags.is_empty());
        assert!(item.category.is_empty());
    }
}
