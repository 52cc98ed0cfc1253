//! In-memory catalog store.
//!
//! The catalog is loaded once at process start from a JSON file and never
//! mutated afterwards. A missing or unparseable file degrades to an empty
//! catalog with a warning — product search simply returns nothing — rather
//! than failing startup.

use std::collections::HashMap;
use std::path::Path;

use crate::models::CatalogItem;

/// Read-only owner of all [`CatalogItem`]s.
pub struct CatalogStore {
    items: Vec<CatalogItem>,
    by_id: HashMap<u32, usize>,
}

impl CatalogStore {
    /// Build a store from already-loaded items.
    ///
    /// Duplicate ids violate the catalog invariant; the first occurrence
    /// wins and later ones are dropped with a warning.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut deduped: Vec<CatalogItem> = Vec::with_capacity(items.len());
        let mut by_id = HashMap::with_capacity(items.len());

        for item in items {
            if by_id.contains_key(&item.id) {
                eprintln!("Warning: duplicate catalog id {} skipped", item.id);
                continue;
            }
            by_id.insert(item.id, deduped.len());
            deduped.push(item);
        }

        Self {
            items: deduped,
            by_id,
        }
    }

    /// Load the catalog from a JSON file of `CatalogItem` records.
    ///
    /// Absence or parse failure yields an empty catalog, not an error.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<Vec<CatalogItem>>(&data) {
                Ok(items) => Self::new(items),
                Err(e) => {
                    eprintln!("Failed to parse catalog {}: {}", path.display(), e);
                    Self::new(Vec::new())
                }
            },
            Err(e) => {
                eprintln!("Failed to read catalog {}: {}", path.display(), e);
                Self::new(Vec::new())
            }
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&CatalogItem> {
        self.by_id.get(&id).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
