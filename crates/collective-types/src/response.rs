//! Per-persona dispatch results.

use serde::{Deserialize, Serialize};

use crate::persona::PersonaId;

/// The outcome of one persona's completion within a dispatch.
///
/// Transient: consumed immediately by the chat session to build zero or
/// one transcript message. A failure is carried as data in `error`; in that
/// case `content` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotResponse {
    pub content: String,
    pub bot_id: PersonaId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BotResponse {
    pub fn success(bot_id: PersonaId, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            bot_id,
            error: None,
        }
    }

    pub fn failure(bot_id: PersonaId, error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            bot_id,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_empty_content() {
        let resp = BotResponse::failure(PersonaId::new(), "boom");
        assert!(resp.is_error());
        assert!(resp.content.is_empty());
    }

    #[test]
    fn test_success_serializes_without_error() {
        let resp = BotResponse::success(PersonaId::new(), "hi");
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["content"], "hi");
    }
}
