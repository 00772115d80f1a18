//! Completion client for persona replies.
//!
//! Wraps a `BoxLlmProvider` behind an initialise-once slot. Every failure
//! (uninitialised client, transport, HTTP status, body parse) is returned as
//! a `CompletionError` carrying the persona id so the orchestrator can
//! attribute it. Nothing here panics, retries or caches.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{Instrument, debug, info_span, warn};

use collective_types::config::DEFAULT_MAX_TOKENS;
use collective_types::llm::{CompletionRequest, LlmError, Message};
use collective_types::persona::{BotPersona, PersonaId};

use crate::llm::box_provider::BoxLlmProvider;
use crate::prompt::PromptBuilder;

/// Reply used when the provider answers without any text.
pub const FALLBACK_REPLY: &str = "I apologize, but I cannot respond right now.";

/// Why a single persona's completion failed.
#[derive(Debug, Clone, Error)]
pub enum CompletionErrorKind {
    #[error("completion client not initialized")]
    NotInitialized,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// A failed completion, attributed to the persona it was made for.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct CompletionError {
    pub persona_id: PersonaId,
    pub kind: CompletionErrorKind,
}

struct ProviderSlot {
    provider: Arc<BoxLlmProvider>,
    model_id: String,
    max_tokens: u32,
}

/// Issues one LLM completion per persona reply.
///
/// Cloning produces a shared view: re-initialising through any clone affects
/// every holder. Calls in flight keep the provider they started with.
#[derive(Clone, Default)]
pub struct CompletionClient {
    slot: Arc<RwLock<Option<ProviderSlot>>>,
}

impl CompletionClient {
    /// Create an uninitialised client. Calls fail with `NotInitialized`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that is already initialised.
    pub fn with_provider(provider: BoxLlmProvider, model_id: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(ProviderSlot {
                provider: Arc::new(provider),
                model_id: model_id.into(),
                max_tokens: DEFAULT_MAX_TOKENS,
            }))),
        }
    }

    /// Install (or replace) the provider and model used for completions.
    pub async fn initialize(
        &self,
        provider: BoxLlmProvider,
        model_id: impl Into<String>,
        max_tokens: u32,
    ) {
        let model_id = model_id.into();
        debug!(provider = provider.name(), model = %model_id, max_tokens, "completion client initialized");
        *self.slot.write().await = Some(ProviderSlot {
            provider: Arc::new(provider),
            model_id,
            max_tokens,
        });
    }

    /// Remove the provider. Subsequent calls fail with `NotInitialized`.
    pub async fn reset(&self) {
        *self.slot.write().await = None;
    }

    pub async fn is_initialized(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Name and model of the installed provider, if any.
    pub async fn describe(&self) -> Option<(String, String)> {
        self.slot
            .read()
            .await
            .as_ref()
            .map(|s| (s.provider.name().to_string(), s.model_id.clone()))
    }

    /// Generate `persona`'s reply to `utterance` given its rendered `prompt`.
    ///
    /// Issues exactly one provider call. An empty reply is replaced by
    /// [`FALLBACK_REPLY`]; the returned text is trimmed.
    pub async fn complete(
        &self,
        persona: &BotPersona,
        prompt: &str,
        utterance: &str,
    ) -> Result<String, CompletionError> {
        let (provider, model_id, max_tokens) = {
            let guard = self.slot.read().await;
            match guard.as_ref() {
                Some(slot) => (slot.provider.clone(), slot.model_id.clone(), slot.max_tokens),
                None => {
                    warn!(persona_id = %persona.id, "completion requested before initialization");
                    return Err(CompletionError {
                        persona_id: persona.id,
                        kind: CompletionErrorKind::NotInitialized,
                    });
                }
            }
        };

        let request = CompletionRequest {
            model: model_id,
            messages: vec![Message::user(PromptBuilder::final_turn(
                prompt, persona, utterance,
            ))],
            max_tokens,
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            persona_id = %persona.id,
            persona_name = %persona.name,
        );

        match provider.complete(&request).instrument(span).await {
            Ok(response) => {
                debug!(
                    persona_id = %persona.id,
                    output_tokens = response.usage.output_tokens,
                    "completion received"
                );
                let text = if response.content.is_empty() {
                    FALLBACK_REPLY
                } else {
                    response.content.as_str()
                };
                Ok(text.trim().to_string())
            }
            Err(e) => {
                warn!(persona_id = %persona.id, error = %e, "completion failed");
                Err(CompletionError {
                    persona_id: persona.id,
                    kind: CompletionErrorKind::Llm(e),
                })
            }
        }
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient").finish_non_exhaustive()
    }
}
