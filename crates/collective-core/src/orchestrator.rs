//! Response orchestration: one completion per active persona, all at once.
//!
//! `ResponseOrchestrator` builds every persona's prompt from the same
//! history and room snapshot, polls all completions concurrently on the
//! caller's task and waits for every one of them. A failing persona becomes
//! an error-bearing `BotResponse`; it never fails or cancels the batch.

use std::collections::HashSet;
use std::future::Future;

use futures_util::future::join_all;
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span};

use collective_types::message::Message;
use collective_types::persona::{BotPersona, PersonaId};
use collective_types::response::BotResponse;
use collective_types::room::RoomSettings;

use crate::completion::CompletionClient;
use crate::prompt::PromptBuilder;

/// Faults of the dispatch call itself, as opposed to per-persona failures.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("persona {0} appears more than once in the dispatch set")]
    DuplicatePersona(PersonaId),
}

/// Anything that can turn one human turn into per-persona responses.
///
/// The chat session is generic over this so tests can inject dispatchers
/// that fault or answer from a script.
pub trait ResponseDispatcher: Send + Sync {
    /// Produce one response per persona, in input order.
    fn dispatch(
        &self,
        history: &[Message],
        active_personas: &[BotPersona],
        room: &RoomSettings,
        utterance: &str,
    ) -> impl Future<Output = Result<Vec<BotResponse>, OrchestratorError>> + Send;
}

/// Fans a human turn out to every active persona through a `CompletionClient`.
#[derive(Debug, Clone)]
pub struct ResponseOrchestrator {
    client: CompletionClient,
}

impl ResponseOrchestrator {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Shared handle to the underlying completion client.
    pub fn client(&self) -> &CompletionClient {
        &self.client
    }

    async fn respond(
        &self,
        history: &[Message],
        persona: &BotPersona,
        room: &RoomSettings,
        utterance: &str,
    ) -> BotResponse {
        let prompt = PromptBuilder::build(history, persona, room);
        match self.client.complete(persona, &prompt, utterance).await {
            Ok(content) => BotResponse::success(persona.id, content),
            Err(e) => BotResponse::failure(e.persona_id, e.to_string()),
        }
    }
}

impl ResponseDispatcher for ResponseOrchestrator {
    async fn dispatch(
        &self,
        history: &[Message],
        active_personas: &[BotPersona],
        room: &RoomSettings,
        utterance: &str,
    ) -> Result<Vec<BotResponse>, OrchestratorError> {
        if active_personas.is_empty() {
            debug!("no active personas, skipping dispatch");
            return Ok(Vec::new());
        }

        let mut seen = HashSet::with_capacity(active_personas.len());
        for persona in active_personas {
            if !seen.insert(persona.id) {
                return Err(OrchestratorError::DuplicatePersona(persona.id));
            }
        }

        let span = info_span!(
            "collective.dispatch",
            persona_count = active_personas.len(),
            history_len = history.len(),
            room = %room.name,
        );

        async {
            let responses = join_all(
                active_personas
                    .iter()
                    .map(|persona| self.respond(history, persona, room, utterance)),
            )
            .await;

            let failed = responses.iter().filter(|r| r.is_error()).count();
            info!(
                succeeded = responses.len() - failed,
                failed, "dispatch complete"
            );
            Ok(responses)
        }
        .instrument(span)
        .await
    }
}
