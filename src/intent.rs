//! Product-intent classification.
//!
//! Decides whether a user utterance should trigger catalog retrieval. Two
//! strategies, selected once per process via `[intent] strategy`:
//!
//! - **keywords** (default) — membership test against a fixed keyword set.
//!   Deterministic, zero latency and cost, lower recall: a paraphrase that
//!   avoids every keyword is missed.
//! - **model** — one chat-completion call constrained to a binary answer.
//!   Higher recall at non-zero latency and cost; degrades to `false` on
//!   provider failure rather than propagating it.

use std::sync::Arc;

use crate::chat::ChatProvider;
use crate::config::IntentConfig;
use crate::error::{Error, Result};
use crate::models::ChatTurn;

/// Keywords whose presence marks an utterance as product-related.
/// Covers search verbs plus the catalog's product domains.
const PRODUCT_KEYWORDS: &[&str] = &[
    "prodotto",
    "prodotti",
    "materiale",
    "materiali",
    "cerca",
    "trovare",
    "mostrami",
    "consigli",
    "sedia",
    "tavolo",
    "lampada",
    "divano",
    "parquet",
    "mattone",
    "finestra",
    "porta",
    "isolante",
    "sanitario",
];

const CLASSIFIER_PROMPT: &str = "You are a binary classifier. The user message may or may not be a \
     request concerning physical products, materials, or furnishings from \
     an architecture and design catalog. Answer with exactly one word: \
     'yes' or 'no'.";

enum Strategy {
    Keywords,
    Model(Arc<dyn ChatProvider>),
}

/// Classifies utterances as product-related or not.
pub struct IntentClassifier {
    strategy: Strategy,
}

impl IntentClassifier {
    /// Deterministic keyword-set classifier.
    pub fn keywords() -> Self {
        Self {
            strategy: Strategy::Keywords,
        }
    }

    /// Model-backed classifier using a binary chat-completion call.
    pub fn model(chat: Arc<dyn ChatProvider>) -> Self {
        Self {
            strategy: Strategy::Model(chat),
        }
    }

    /// Build the classifier named by the configuration.
    pub fn from_config(config: &IntentConfig, chat: Arc<dyn ChatProvider>) -> Result<Self> {
        match config.strategy.as_str() {
            "keywords" => Ok(Self::keywords()),
            "model" => Ok(Self::model(chat)),
            other => Err(Error::InvalidInput(format!(
                "unknown intent strategy: {}",
                other
            ))),
        }
    }

    /// True when the utterance concerns the product catalog.
    pub async fn is_product_intent(&self, utterance: &str) -> bool {
        match &self.strategy {
            Strategy::Keywords => keyword_intent(utterance),
            Strategy::Model(chat) => model_intent(chat.as_ref(), utterance).await,
        }
    }
}

fn keyword_intent(utterance: &str) -> bool {
    let lower = utterance.to_lowercase();
    PRODUCT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// A classification failure means we simply do not enrich the reply with
/// products, never that the chat turn fails.
async fn model_intent(chat: &dyn ChatProvider, utterance: &str) -> bool {
    let turns = [ChatTurn {
        role: "user".to_string(),
        content: utterance.to_string(),
    }];

    match chat.complete(CLASSIFIER_PROMPT, &turns).await {
        Ok(answer) => {
            let answer = answer.trim().to_lowercase();
            answer.starts_with("yes") || answer.starts_with("si") || answer.starts_with("sì")
        }
        Err(e) => {
            eprintln!("Intent classification failed, assuming no product intent: {}", e);
            false
        }
    }
}
