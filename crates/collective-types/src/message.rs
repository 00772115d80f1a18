//! Chat transcript message types.
//!
//! Messages are immutable once created and form an append-only transcript
//! owned by the chat session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::persona::PersonaId;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Human,
    Bot,
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderType::Human => write!(f, "human"),
            SenderType::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(SenderType::Human),
            "bot" => Ok(SenderType::Bot),
            other => Err(format!("invalid sender type: '{other}'")),
        }
    }
}

/// A single message in the room transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    /// Display name of the author at the time the message was created.
    pub sender: String,
    pub sender_type: SenderType,
    pub timestamp: DateTime<Utc>,
    /// Persona that produced this message (bot messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<PersonaId>,
}

impl Message {
    /// Create a human-authored message stamped with the current time.
    pub fn human(content: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            content: content.into(),
            sender: sender.into(),
            sender_type: SenderType::Human,
            timestamp: Utc::now(),
            bot_id: None,
        }
    }

    /// Create a bot-authored message stamped with the current time.
    pub fn bot(content: impl Into<String>, sender: impl Into<String>, bot_id: PersonaId) -> Self {
        Self {
            id: Uuid::now_v7(),
            content: content.into(),
            sender: sender.into(),
            sender_type: SenderType::Bot,
            timestamp: Utc::now(),
            bot_id: Some(bot_id),
        }
    }

    pub fn is_human(&self) -> bool {
        self.sender_type == SenderType::Human
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_type_roundtrip() {
        for st in [SenderType::Human, SenderType::Bot] {
            let parsed: SenderType = st.to_string().parse().unwrap();
            assert_eq!(st, parsed);
        }
    }

    #[test]
    fn test_sender_type_serde() {
        let json = serde_json::to_string(&SenderType::Bot).unwrap();
        assert_eq!(json, "\"bot\"");
    }

    #[test]
    fn test_human_message_has_no_bot_id() {
        let msg = Message::human("hi", "Human");
        assert!(msg.is_human());
        assert!(msg.bot_id.is_none());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["senderType"], "human");
        assert!(json.get("botId").is_none());
    }

    #[test]
    fn test_bot_message_carries_persona() {
        let id = PersonaId::new();
        let msg = Message::bot("Hello!", "Alex", id);
        assert_eq!(msg.sender_type, SenderType::Bot);
        assert_eq!(msg.bot_id, Some(id));
        assert_eq!(msg.sender, "Alex");
    }
}
