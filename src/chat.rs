//! Chat provider abstraction and the chat-turn orchestration.
//!
//! The [`ChatProvider`] trait wraps the text-generation service used to
//! phrase final replies (and, optionally, to classify intent). The
//! [`run_chat_turn`] function ties the whole pipeline together: response
//! cache, intent classification, hybrid retrieval, reply generation.
//!
//! A chat-provider failure while phrasing the final reply is the one
//! unrecoverable path in the system — there is nothing to degrade to —
//! and surfaces as [`Error::Provider`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::intent::IntentClassifier;
use crate::models::{ChatOutcome, ChatTurn};
use crate::search::RetrievalEngine;

/// System prompt for plain conversational replies.
const ASSISTANT_PROMPT: &str = "You are an AI assistant specialized in architecture and design. \
     Answer as an expert in the field, offering practical advice on \
     materials, suppliers, and design solutions.";

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4"`).
    fn model_name(&self) -> &str;

    /// Generate a completion for the given system prompt and turns.
    /// Fails with [`Error::Provider`] on transport or service failure.
    async fn complete(&self, system_prompt: &str, turns: &[ChatTurn]) -> Result<String>;
}

// ============ OpenAI Provider ============

/// Chat provider using the OpenAI chat completions API.
///
/// Requires the `OPENAI_API_KEY` environment variable to be set.
pub struct OpenAiChatProvider {
    model: String,
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiChatProvider {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Provider("OPENAI_API_KEY environment variable not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            client,
            api_key,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiChatProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system_prompt: &str, turns: &[ChatTurn]) -> Result<String> {
        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": system_prompt,
        })];
        for turn in turns {
            messages.push(serde_json::json!({
                "role": turn.role,
                "content": turn.content,
            }));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "OpenAI chat API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response.json().await?;
        json.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.pointer("/message/content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                Error::Provider("invalid chat response: missing choices[0].message.content".to_string())
            })
    }
}

// ============ Chat turn orchestration ============

/// Everything [`run_chat_turn`] needs, bundled for injection.
pub struct ChatPipeline {
    pub engine: Arc<RetrievalEngine>,
    pub intent: IntentClassifier,
    pub chat: Arc<dyn ChatProvider>,
    pub responses: Arc<ResponseCache>,
}

/// Process one chat turn: cache lookup, intent detection, retrieval,
/// reply phrasing, cache store.
///
/// # Errors
///
/// - [`Error::InvalidInput`] when the turn list is empty.
/// - [`Error::Provider`] when the final reply cannot be generated.
pub async fn run_chat_turn(pipeline: &ChatPipeline, turns: &[ChatTurn]) -> Result<ChatOutcome> {
    if turns.is_empty() {
        return Err(Error::InvalidInput("messages must not be empty".to_string()));
    }

    if let Some(cached) = pipeline.responses.get(turns) {
        return Ok(cached);
    }

    let last_user_turn = turns
        .iter()
        .rev()
        .find(|t| t.role == "user")
        .map(|t| t.content.as_str())
        .unwrap_or_default();

    let mut products = Vec::new();
    if pipeline.intent.is_product_intent(last_user_turn).await {
        products = pipeline.engine.search(last_user_turn).await;
    }

    let reply = if products.is_empty() {
        pipeline.chat.complete(ASSISTANT_PROMPT, turns).await?
    } else {
        let prompt = format!(
            "{} I found {} catalog products relevant to the user's request. \
             Briefly describe them in an architectural context, referring to \
             their characteristics. Do not list full technical details; the \
             products are shown to the user in a separate panel.",
            ASSISTANT_PROMPT,
            products.len()
        );
        pipeline.chat.complete(&prompt, turns).await?
    };

    let outcome = ChatOutcome { reply, products };
    pipeline.responses.put(turns, outcome.clone());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EmbeddingCache;
    use crate::catalog::CatalogStore;
    use crate::config::{CatalogConfig, Config, ServerConfig};
    use crate::embedding::DisabledProvider;
    use crate::models::CatalogItem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedChat {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedChat {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedChat {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _system_prompt: &str, _turns: &[ChatTurn]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Provider("scripted outage".to_string()))
            } else {
                Ok("Ecco la mia risposta.".to_string())
            }
        }
    }

    fn catalog_item() -> CatalogItem {
        CatalogItem {
            id: 1,
            name: "Sedia Nordica".to_string(),
            manufacturer: "Acme".to_string(),
            category: "Sedie".to_string(),
            description: "Sedia in legno chiaro".to_string(),
            short_description: String::new(),
            materials: "legno".to_string(),
            dimensions: String::new(),
            tags: vec!["legno".to_string()],
            image_urls: vec![],
            asset_urls: vec![],
        }
    }

    fn test_config() -> Config {
        Config {
            catalog: CatalogConfig {
                path: "unused.json".into(),
            },
            retrieval: Default::default(),
            embedding: Default::default(),
            chat: Default::default(),
            intent: Default::default(),
            cache: Default::default(),
            server: ServerConfig {
                bind: "127.0.0.1:0".to_string(),
            },
        }
    }

    fn pipeline(chat: Arc<ScriptedChat>, items: Vec<CatalogItem>) -> ChatPipeline {
        let config = test_config();
        let engine = RetrievalEngine::new(
            Arc::new(CatalogStore::new(items)),
            Arc::new(EmbeddingCache::new()),
            Arc::new(DisabledProvider),
            &config,
        );
        ChatPipeline {
            engine: Arc::new(engine),
            intent: IntentClassifier::keywords(),
            chat: chat.clone(),
            responses: Arc::new(ResponseCache::new(Duration::from_secs(60))),
        }
    }

    fn turn(content: &str) -> ChatTurn {
        ChatTurn {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_turns_are_invalid() {
        let chat = Arc::new(ScriptedChat::new(false));
        let pipeline = pipeline(chat, vec![]);
        assert!(matches!(
            run_chat_turn(&pipeline, &[]).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_product_intent_attaches_products() {
        let chat = Arc::new(ScriptedChat::new(false));
        let pipeline = pipeline(chat, vec![catalog_item()]);

        let turns = vec![turn("sedia legno")];
        let outcome = run_chat_turn(&pipeline, &turns).await.unwrap();
        assert_eq!(outcome.products.len(), 1);
        assert_eq!(outcome.products[0].id, 1);
        assert!(!outcome.reply.is_empty());
    }

    #[tokio::test]
    async fn test_non_product_chat_has_no_products() {
        let chat = Arc::new(ScriptedChat::new(false));
        let pipeline = pipeline(chat, vec![catalog_item()]);

        let turns = vec![turn("che tempo fa oggi?")];
        let outcome = run_chat_turn(&pipeline, &turns).await.unwrap();
        assert!(outcome.products.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_conversation_hits_response_cache() {
        let chat = Arc::new(ScriptedChat::new(false));
        let pipeline = pipeline(chat.clone(), vec![catalog_item()]);

        let turns = vec![turn("sedia legno")];
        let first = run_chat_turn(&pipeline, &turns).await.unwrap();
        let second = run_chat_turn(&pipeline, &turns).await.unwrap();

        assert_eq!(first.reply, second.reply);
        assert_eq!(
            chat.calls.load(Ordering::SeqCst),
            1,
            "second turn must be served from the response cache"
        );
    }

    #[tokio::test]
    async fn test_reply_failure_surfaces_as_provider_error() {
        let chat = Arc::new(ScriptedChat::new(true));
        let pipeline = pipeline(chat, vec![catalog_item()]);

        let turns = vec![turn("che tempo fa oggi?")];
        assert!(matches!(
            run_chat_turn(&pipeline, &turns).await,
            Err(Error::Provider(_))
        ));
    }
}
