//! Chat session: the transcript and the send/merge cycle.
//!
//! A session owns the ordered message log. `send_message` appends the human
//! turn, hands a snapshot to the dispatcher, then merges the per-persona
//! results back into the log and folds any failures into one error string.

use tracing::{debug, info, warn};

use collective_types::message::Message;
use collective_types::persona::BotPersona;
use collective_types::room::RoomSettings;

use crate::orchestrator::ResponseDispatcher;

/// Sender label for a reply whose persona is no longer in the snapshot.
pub const UNKNOWN_BOT_SENDER: &str = "Bot";

/// Default display name for human messages.
pub const DEFAULT_HUMAN_NAME: &str = "Human";

/// Where the session is in its send cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponses,
}

/// What a single `send_message` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The dispatcher returned. `appended` bot messages were added and
    /// `failed` personas reported errors.
    Completed { appended: usize, failed: usize },
    /// The dispatcher itself faulted; no bot messages were added.
    Faulted,
}

/// An interactive chat session over a `ResponseDispatcher`.
pub struct ChatSession<D> {
    dispatcher: D,
    human_name: String,
    messages: Vec<Message>,
    state: SessionState,
    error: Option<String>,
}

impl<D: ResponseDispatcher> ChatSession<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            human_name: DEFAULT_HUMAN_NAME.to_string(),
            messages: Vec::new(),
            state: SessionState::Idle,
            error: None,
        }
    }

    /// Use `name` as the sender of human messages.
    pub fn with_human_name(mut self, name: impl Into<String>) -> Self {
        self.human_name = name.into();
        self
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn human_name(&self) -> &str {
        &self.human_name
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::AwaitingResponses
    }

    /// Append a pre-built message to the log.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Empty the transcript. Loading and error state are left alone.
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Send a human message and collect replies from the active personas.
    ///
    /// `personas` may contain inactive entries; only active ones are
    /// dispatched. Both snapshots are only read.
    pub async fn send_message(
        &mut self,
        content: &str,
        personas: &[BotPersona],
        room: &RoomSettings,
    ) -> SendOutcome {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return SendOutcome::Ignored;
        }

        self.error = None;
        self.messages
            .push(Message::human(trimmed, self.human_name.clone()));

        let active: Vec<BotPersona> = personas.iter().filter(|p| p.is_active).cloned().collect();
        debug!(active = active.len(), "dispatching human message");

        self.state = SessionState::AwaitingResponses;
        let result = self
            .dispatcher
            .dispatch(&self.messages, &active, room, content)
            .await;
        self.state = SessionState::Idle;

        let responses = match result {
            Ok(responses) => responses,
            Err(e) => {
                warn!(error = %e, "dispatch faulted");
                self.error = Some(e.to_string());
                return SendOutcome::Faulted;
            }
        };

        let mut appended = 0;
        let mut errors = Vec::new();
        for response in responses {
            if let Some(err) = response.error {
                errors.push(err);
                continue;
            }
            let text = response.content.trim();
            if text.is_empty() {
                continue;
            }
            let sender = active
                .iter()
                .find(|p| p.id == response.bot_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| UNKNOWN_BOT_SENDER.to_string());
            self.messages.push(Message::bot(text, sender, response.bot_id));
            appended += 1;
        }

        let failed = errors.len();
        if !errors.is_empty() {
            self.error = Some(format!(
                "Some bots failed to respond: {}",
                errors.join(", ")
            ));
        }

        info!(appended, failed, "human turn complete");
        SendOutcome::Completed { appended, failed }
    }
}
