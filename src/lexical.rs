//! Lexical (substring) matching over the catalog.
//!
//! Tokenizes the query by whitespace, drops tokens too short to carry
//! signal, and keeps items whose searchable text contains **every**
//! remaining token as a case-insensitive substring. The conjunctive policy
//! trades recall for precision on multi-word queries: `"sedia legno"`
//! must not surface items that only mention `"sedia"`.
//!
//! Items whose `category` contains the full query verbatim are ordered
//! before other matches.

use crate::models::CatalogItem;

/// Lowercased query tokens longer than `min_token_len - 1` characters.
pub fn meaningful_tokens(query: &str, min_token_len: usize) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.len() >= min_token_len)
        .map(|t| t.to_string())
        .collect()
}

/// Select catalog items matching all meaningful query tokens.
///
/// Category-verbatim matches come first; within each group, catalog order
/// is preserved. An empty query (or one with no meaningful tokens) yields
/// no matches.
pub fn lexical_match<'a>(
    query: &str,
    catalog: &'a [CatalogItem],
    min_token_len: usize,
) -> Vec<&'a CatalogItem> {
    let tokens = meaningful_tokens(query, min_token_len);
    if tokens.is_empty() {
        return Vec::new();
    }

    let query_lower = query.trim().to_lowercase();
    let mut category_hits = Vec::new();
    let mut other_hits = Vec::new();

    for item in catalog {
        let text = item.searchable_text();
        if !tokens.iter().all(|t| text.contains(t.as_str())) {
            continue;
        }
        if item.category.to_lowercase().contains(&query_lower) {
            category_hits.push(item);
        } else {
            other_hits.push(item);
        }
    }

    category_hits.extend(other_hits);
    category_hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, name: &str, category: &str, materials: &str) -> CatalogItem {
        CatalogItem {
            id,
            name: name.to_string(),
            manufacturer: String::new(),
            category: category.to_string(),
            description: String::new(),
            short_description: String::new(),
            materials: materials.to_string(),
            dimensions: String::new(),
            tags: vec![],
            image_urls: vec![],
            asset_urls: vec![],
        }
    }

    #[test]
    fn test_meaningful_tokens_drop_short_ones() {
        let tokens = meaningful_tokens("la Sedia di legno", 3);
        assert_eq!(tokens, vec!["sedia", "legno"]);
    }

    #[test]
    fn test_conjunctive_policy_excludes_partial_matches() {
        let catalog = vec![
            item(1, "Sedia Nordica", "Sedie", "legno"),
            item(2, "Sedia Urbana", "Sedie", "metallo"),
        ];
        let hits = lexical_match("sedia legno", &catalog, 3);
        let ids: Vec<u32> = hits.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1], "item matching only 'sedia' must be excluded");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let catalog = vec![item(1, "Sedia Nordica", "Sedie", "legno")];
        let hits = lexical_match("SEDIA", &catalog, 3);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_category_verbatim_match_comes_first() {
        let catalog = vec![
            item(1, "Tavolo con sedie incluse", "Tavoli", "legno"),
            item(2, "Sedia Nordica", "sedie", "legno"),
        ];
        let hits = lexical_match("sedie", &catalog, 3);
        let ids: Vec<u32> = hits.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_empty_query_yields_no_matches() {
        let catalog = vec![item(1, "Sedia Nordica", "Sedie", "legno")];
        assert!(lexical_match("", &catalog, 3).is_empty());
        assert!(lexical_match("a b", &catalog, 3).is_empty());
    }
}
