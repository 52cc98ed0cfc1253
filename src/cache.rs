//! Shared caches for the retrieval pipeline.
//!
//! Two caches back the chat flow, both explicitly owned and injected into
//! their consumers (never ambient globals) so tests can substitute fresh
//! instances per case:
//!
//! - [`EmbeddingCache`] — per-catalog-item embedding vectors, computed
//!   lazily and memoized for process lifetime. Never evicted: the catalog
//!   is bounded, so growth is bounded too. An LRU bound is the documented
//!   extension point if that assumption changes.
//! - [`ResponseCache`] — memoizes whole chat-turn outcomes keyed by the
//!   conversation content, with a fixed TTL. Expiry is enforced lazily on
//!   read rather than via per-insert deletion timers.
//!
//! Both use `std::sync::RwLock` around a `HashMap`; no guard is ever held
//! across an await point. Concurrent population of the same item id is
//! last-write-wins, which is safe because the computation is deterministic
//! per model.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::models::{CatalogItem, ChatOutcome, ChatTurn};

// ============ Embedding cache ============

/// Lazily-populated map from catalog item id to embedding vector.
pub struct EmbeddingCache {
    vectors: RwLock<HashMap<u32, Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self {
            vectors: RwLock::new(HashMap::new()),
        }
    }

    /// Return the memoized vector for `item`, computing it on first use.
    ///
    /// The embedding input is the item's labeled field concatenation
    /// ([`CatalogItem::embedding_text`]). On provider failure the error is
    /// returned and nothing is cached, so the item is retried by the next
    /// search that needs it.
    pub async fn get_or_compute(
        &self,
        item: &CatalogItem,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Vec<f32>> {
        if let Some(vec) = self.vectors.read().unwrap().get(&item.id) {
            return Ok(vec.clone());
        }

        let vec = provider.embed(&item.embedding_text()).await?;
        self.vectors.write().unwrap().insert(item.id, vec.clone());
        Ok(vec)
    }

    /// True when a vector for `id` is already cached. Used to decide
    /// whether a catalog sweep needs to throttle before the next item.
    pub fn contains(&self, id: u32) -> bool {
        self.vectors.read().unwrap().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.vectors.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.read().unwrap().is_empty()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

// ============ Response cache ============

struct CachedOutcome {
    outcome: ChatOutcome,
    expires_at: Instant,
}

/// TTL cache for complete chat-turn outcomes.
///
/// Keys derive deterministically from the ordered turn sequence (role and
/// content only); a stale entry is never served.
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedOutcome>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the cached outcome for a conversation, if fresh.
    ///
    /// Expired entries are removed on the spot.
    pub fn get(&self, turns: &[ChatTurn]) -> Option<ChatOutcome> {
        let key = conversation_key(turns);

        {
            let entries = self.entries.read().unwrap();
            match entries.get(&key) {
                Some(cached) if cached.expires_at > Instant::now() => {
                    return Some(cached.outcome.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Stale: drop it under the write lock, re-checking freshness in
        // case a concurrent put replaced the entry in between.
        let mut entries = self.entries.write().unwrap();
        if let Some(cached) = entries.get(&key) {
            if cached.expires_at > Instant::now() {
                return Some(cached.outcome.clone());
            }
            entries.remove(&key);
        }
        None
    }

    /// Store an outcome for a conversation, stamping the expiry deadline.
    pub fn put(&self, turns: &[ChatTurn], outcome: ChatOutcome) {
        let key = conversation_key(turns);
        self.entries.write().unwrap().insert(
            key,
            CachedOutcome {
                outcome,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

/// Deterministic digest of an ordered turn sequence.
///
/// Hashes role and content only — no timestamps or client identifiers —
/// with a field separator so `("ab", "c")` and `("a", "bc")` cannot
/// collide.
pub fn conversation_key(turns: &[ChatTurn]) -> String {
    let mut hasher = Sha256::new();
    for turn in turns {
        hasher.update(turn.role.as_bytes());
        hasher.update([0x1f]);
        hasher.update(turn.content.as_bytes());
        hasher.update([0x1e]);
    }
    format!("{:x}", hasher.finalize())
}
