//! Hybrid retrieval engine: lexical matching plus embedding-similarity
//! search, merged and ranked.
//!
//! # Algorithm
//!
//! 1. Run the lexical matcher for an initial candidate set.
//! 2. If lexical hits fall below `semantic_threshold`, run semantic
//!    search: embed the query once, score every catalog item's cached
//!    vector with cosine similarity, keep the top `semantic_top_k`.
//! 3. Merge lexical-before-semantic, deduplicating by id (first wins).
//! 4. Score each candidate: +3 category contains the full query, +2 per
//!    tag containing any query token, +2 name contains the full query,
//!    +1 description contains the full query. Stable sort descending, so
//!    ties preserve merge order.
//! 5. Truncate to `final_limit`.
//!
//! Every provider failure degrades rather than fails: a dead embedding
//! service means lexical-only results, a single bad item is skipped for
//! this call and retried by the next search that needs it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::EmbeddingCache;
use crate::catalog::CatalogStore;
use crate::config::{Config, RetrievalConfig};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::lexical::{lexical_match, meaningful_tokens};
use crate::models::CatalogItem;
use crate::similarity::cosine_similarity;

/// Orchestrates lexical and semantic retrieval over one catalog.
///
/// The caches and provider are injected so tests (and the server) control
/// their lifetimes; the engine itself holds no request state and is cheap
/// to share behind an `Arc`.
pub struct RetrievalEngine {
    catalog: Arc<CatalogStore>,
    embeddings: Arc<EmbeddingCache>,
    provider: Arc<dyn EmbeddingProvider>,
    params: RetrievalConfig,
    throttle: Duration,
}

impl RetrievalEngine {
    pub fn new(
        catalog: Arc<CatalogStore>,
        embeddings: Arc<EmbeddingCache>,
        provider: Arc<dyn EmbeddingProvider>,
        config: &Config,
    ) -> Self {
        Self {
            catalog,
            embeddings,
            provider,
            params: config.retrieval.clone(),
            throttle: Duration::from_millis(config.embedding.throttle_ms),
        }
    }

    /// Search the catalog, returning at most `final_limit` items with no
    /// duplicate ids.
    pub async fn search(&self, query: &str) -> Vec<CatalogItem> {
        if self.catalog.is_empty() {
            return Vec::new();
        }

        let lexical = lexical_match(query, self.catalog.items(), self.params.min_token_len);

        let mut candidates: Vec<&CatalogItem> = lexical;
        if candidates.len() < self.params.semantic_threshold {
            match self.semantic_candidates(query).await {
                Ok(semantic) => candidates.extend(semantic),
                Err(e) => {
                    eprintln!("Semantic search unavailable, serving lexical-only: {}", e);
                }
            }
        }

        // Dedupe by id, first occurrence wins (lexical before semantic).
        let mut seen: HashSet<u32> = HashSet::new();
        let mut merged: Vec<&CatalogItem> = Vec::with_capacity(candidates.len());
        for item in candidates {
            if seen.insert(item.id) {
                merged.push(item);
            }
        }

        let tokens = meaningful_tokens(query, self.params.min_token_len);
        let query_lower = query.trim().to_lowercase();

        let mut scored: Vec<(i64, &CatalogItem)> = merged
            .into_iter()
            .map(|item| (relevance_score(item, &query_lower, &tokens), item))
            .collect();
        // Stable sort: ties keep merge order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored.truncate(self.params.final_limit);
        scored.into_iter().map(|(_, item)| item.clone()).collect()
    }

    /// Embed the query and rank all catalog items by cosine similarity.
    ///
    /// The query embedding is computed fresh per call — verbatim query
    /// repeats are already absorbed by the response cache upstream. Items
    /// whose embedding cannot be obtained are skipped for this call only.
    async fn semantic_candidates(&self, query: &str) -> Result<Vec<&CatalogItem>> {
        let query_vec = self.provider.embed(query).await?;

        let mut scored: Vec<(f32, &CatalogItem)> = Vec::new();

        for item in self.catalog.items() {
            let was_cached = self.embeddings.contains(item.id);

            let vec = match self
                .embeddings
                .get_or_compute(item, self.provider.as_ref())
                .await
            {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("Skipping item {} from semantic results: {}", item.id, e);
                    continue;
                }
            };

            // Pause between fresh provider calls to stay under the rate
            // limit; cache hits cost nothing and need no pause.
            if !was_cached && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }

            match cosine_similarity(&query_vec, &vec) {
                Ok(sim) => scored.push((sim, item)),
                Err(e) => {
                    eprintln!("Skipping item {} from semantic results: {}", item.id, e);
                }
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.params.semantic_top_k);

        Ok(scored.into_iter().map(|(_, item)| item).collect())
    }
}

/// Relevance score for final ranking of merged candidates.
///
/// Full-query bonuses only apply to non-empty queries; `str::contains("")`
/// is vacuously true and would award every item.
fn relevance_score(item: &CatalogItem, query_lower: &str, tokens: &[String]) -> i64 {
    let mut score = 0i64;

    if !query_lower.is_empty() {
        if item.category.to_lowercase().contains(query_lower) {
            score += 3;
        }
        if item.name.to_lowercase().contains(query_lower) {
            score += 2;
        }
        if item.description.to_lowercase().contains(query_lower) {
            score += 1;
        }
    }

    for tag in &item.tags {
        let tag_lower = tag.to_lowercase();
        if tokens.iter().any(|t| tag_lower.contains(t.as_str())) {
            score += 2;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogConfig, ServerConfig};
    use crate::error::Error;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic provider: texts mentioning "nordic" point one way,
    /// everything else the other, so similarity ranking is predictable.
    struct StubProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubProvider {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Provider("scripted outage".to_string()));
            }
            if text.to_lowercase().contains("nordic") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![0.0, 1.0])
            }
        }
    }

    fn item(id: u32, name: &str, category: &str, tags: &[&str], materials: &str) -> CatalogItem {
        CatalogItem {
            id,
            name: name.to_string(),
            manufacturer: "Acme".to_string(),
            category: category.to_string(),
            description: format!("{} di qualità", name),
            short_description: String::new(),
            materials: materials.to_string(),
            dimensions: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image_urls: vec![],
            asset_urls: vec![],
        }
    }

    fn test_config() -> Config {
        Config {
            catalog: CatalogConfig {
                path: "unused.json".into(),
            },
            retrieval: RetrievalConfig::default(),
            embedding: crate::config::EmbeddingConfig {
                throttle_ms: 0,
                ..Default::default()
            },
            chat: Default::default(),
            intent: Default::default(),
            cache: Default::default(),
            server: ServerConfig {
                bind: "127.0.0.1:0".to_string(),
            },
        }
    }

    fn engine(items: Vec<CatalogItem>, provider: Arc<StubProvider>) -> RetrievalEngine {
        RetrievalEngine::new(
            Arc::new(CatalogStore::new(items)),
            Arc::new(EmbeddingCache::new()),
            provider,
            &test_config(),
        )
    }

    #[tokio::test]
    async fn test_search_caps_results_and_dedupes() {
        let items: Vec<CatalogItem> = (1..=15)
            .map(|i| {
                item(
                    i,
                    &format!("Sedia modello {}", i),
                    "Sedie",
                    &["legno"],
                    "legno",
                )
            })
            .collect();
        let engine = engine(items, Arc::new(StubProvider::new()));

        let results = engine.search("sedia").await;
        assert!(results.len() <= 10);

        let mut ids: Vec<u32> = results.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), results.len(), "no duplicate ids allowed");
    }

    #[tokio::test]
    async fn test_sedia_legno_end_to_end() {
        let items = vec![
            item(1, "Sedia Nordica", "Sedie", &["legno", "nordico"], "legno"),
            item(2, "Sedia Urbana", "Sedie", &["metallo"], "metallo"),
            item(3, "Tavolo Rustico", "Tavoli", &["legno"], "legno"),
        ];
        let engine = engine(items, Arc::new(StubProvider::new()));

        let results = engine.search("sedia legno").await;
        assert!(!results.is_empty());
        assert_eq!(results[0].id, 1, "item 1 matches both tokens and ranks first");
    }

    #[tokio::test]
    async fn test_empty_catalog_returns_nothing_without_provider_calls() {
        let provider = Arc::new(StubProvider::new());
        let engine = engine(vec![], provider.clone());

        let results = engine.search("sedia").await;
        assert!(results.is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_outage_degrades_to_lexical_only() {
        let items = vec![
            item(1, "Sedia Nordica", "Sedie", &["legno"], "legno"),
            item(2, "Lampada Alba", "Lampade", &["vetro"], "vetro"),
        ];
        let engine = engine(items, Arc::new(StubProvider::failing()));

        let results = engine.search("sedia").await;
        let ids: Vec<u32> = results.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1], "lexical ranking still applies");
    }

    #[tokio::test]
    async fn test_semantic_skipped_when_lexical_set_is_large() {
        let items: Vec<CatalogItem> = (1..=6)
            .map(|i| {
                item(
                    i,
                    &format!("Sedia {}", i),
                    "Sedie",
                    &["legno"],
                    "legno",
                )
            })
            .collect();
        let provider = Arc::new(StubProvider::new());
        let engine = engine(items, provider.clone());

        let results = engine.search("sedia").await;
        assert_eq!(results.len(), 6);
        assert_eq!(
            provider.calls(),
            0,
            "enough lexical hits means no embedding calls"
        );
    }

    #[tokio::test]
    async fn test_semantic_results_surface_without_lexical_match() {
        // Query shares no substring with the item, but the stub provider
        // maps both to the same direction.
        let items = vec![
            item(1, "Poltrona Nordic", "Poltrone", &[], "tessuto"),
            item(2, "Scrivania Lineare", "Scrivanie", &[], "metallo"),
        ];
        let engine = engine(items, Arc::new(StubProvider::new()));

        let results = engine.search("nordic hygge").await;
        assert!(!results.is_empty());
        assert_eq!(results[0].id, 1);
    }

    #[tokio::test]
    async fn test_category_match_outranks_otherwise_equal_item() {
        // Both items match lexically; only item 2's category contains the
        // query, which must place it strictly first.
        let items = vec![
            item(1, "Set lampade da studio", "Accessori", &[], "vetro"),
            item(2, "Lampade a sospensione", "Lampade", &[], "vetro"),
        ];
        let engine = engine(items, Arc::new(StubProvider::new()));

        let results = engine.search("lampade").await;
        assert_eq!(results[0].id, 2);
    }

    #[test]
    fn test_relevance_score_components() {
        let it = item(1, "Sedia Nordica", "Sedie", &["legno", "nordico"], "legno");
        let tokens = meaningful_tokens("sedie legno", 3);
        // category (+3) + tag "legno" (+2); name/description lack the full
        // query string.
        assert_eq!(relevance_score(&it, "sedie", &tokens), 3 + 2);
        // Empty query awards no full-string bonuses.
        assert_eq!(relevance_score(&it, "", &[]), 0);
    }
}
