//! Bot persona types.
//!
//! A persona is one configured bot identity in the room: a display name,
//! free-text personality, a system prompt, and an active flag that gates
//! whether the persona replies to the next human turn.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a persona, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(pub Uuid);

impl PersonaId {
    /// Create a new PersonaId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a PersonaId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PersonaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PersonaId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A bot persona participating in the room.
///
/// Every field except `id` may be edited while the room is running.
/// Names are freeform and may repeat across personas; `id` is the only
/// stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotPersona {
    /// Records saved without a usable id get a fresh one on load.
    #[serde(default, deserialize_with = "lenient_persona_id")]
    pub id: PersonaId,
    pub name: String,
    /// Short free-text description of how the persona behaves.
    pub personality: String,
    /// Standing instructions rendered verbatim into every prompt.
    pub system_prompt: String,
    /// Only active personas are asked to reply.
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Accept any stored id value; anything that is not a UUID string becomes a
/// fresh id instead of failing the whole record.
fn lenient_persona_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PersonaId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StoredId {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<StoredId>::deserialize(deserializer)? {
        Some(StoredId::Text(text)) => text.trim().parse::<PersonaId>().unwrap_or_default(),
        Some(StoredId::Other(_)) | None => PersonaId::new(),
    })
}

impl BotPersona {
    /// Build a persona with a fresh id from creation fields.
    pub fn from_new(new: NewPersona) -> Self {
        Self {
            id: PersonaId::new(),
            name: new.name,
            personality: new.personality,
            system_prompt: new.system_prompt,
            is_active: new.is_active,
            avatar: new.avatar,
        }
    }

    /// Apply a partial update in place. `None` fields are left untouched.
    pub fn apply(&mut self, update: PersonaUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(personality) = update.personality {
            self.personality = personality;
        }
        if let Some(system_prompt) = update.system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
    }
}

/// Fields for creating a persona. The id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPersona {
    pub name: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

fn default_active() -> bool {
    true
}

impl NewPersona {
    /// A blank, active persona with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: String::new(),
            system_prompt: String::new(),
            is_active: true,
            avatar: None,
        }
    }
}

/// Partial update for a persona. All fields are optional.
///
/// `avatar` is doubly optional: `Some(None)` clears the avatar.
#[derive(Debug, Clone, Default)]
pub struct PersonaUpdate {
    pub name: Option<String>,
    pub personality: Option<String>,
    pub system_prompt: Option<String>,
    pub is_active: Option<bool>,
    pub avatar: Option<Option<String>>,
}

/// A persona template from the built-in catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotTemplate {
    pub id: String,
    pub name: String,
    pub personality: String,
    pub system_prompt: String,
}

impl BotTemplate {
    /// Creation fields for an active persona derived from this template.
    ///
    /// A non-blank `custom_name` replaces the template's name.
    pub fn instantiate(&self, custom_name: Option<&str>) -> NewPersona {
        let name = custom_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
            .to_string();
        NewPersona {
            name,
            personality: self.personality.clone(),
            system_prompt: self.system_prompt.clone(),
            is_active: true,
            avatar: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> BotTemplate {
        BotTemplate {
            id: "sage".to_string(),
            name: "Sage".to_string(),
            personality: "Calm".to_string(),
            system_prompt: "You are Sage.".to_string(),
        }
    }

    #[test]
    fn test_persona_id_display_and_parse() {
        let id = PersonaId::new();
        let parsed: PersonaId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_persona_serializes_camel_case() {
        let persona = BotPersona::from_new(NewPersona::named("Alex"));
        let json = serde_json::to_value(&persona).unwrap();
        assert_eq!(json["name"], "Alex");
        assert_eq!(json["isActive"], true);
        assert!(json.get("systemPrompt").is_some());
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut persona = BotPersona::from_new(NewPersona::named("Alex"));
        let id = persona.id;
        persona.apply(PersonaUpdate {
            personality: Some("Curious".to_string()),
            is_active: Some(false),
            ..Default::default()
        });
        assert_eq!(persona.id, id);
        assert_eq!(persona.name, "Alex");
        assert_eq!(persona.personality, "Curious");
        assert!(!persona.is_active);
    }

    #[test]
    fn test_apply_clears_avatar() {
        let mut persona = BotPersona::from_new(NewPersona {
            avatar: Some("🦉".to_string()),
            ..NewPersona::named("Owl")
        });
        persona.apply(PersonaUpdate {
            avatar: Some(None),
            ..Default::default()
        });
        assert!(persona.avatar.is_none());
    }

    #[test]
    fn test_template_instantiate_custom_name() {
        let new = template().instantiate(Some("  Oracle "));
        assert_eq!(new.name, "Oracle");
        assert_eq!(new.system_prompt, "You are Sage.");
        assert!(new.is_active);
    }

    #[test]
    fn test_template_instantiate_blank_name_uses_template() {
        assert_eq!(template().instantiate(Some("   ")).name, "Sage");
        assert_eq!(template().instantiate(None).name, "Sage");
    }

    #[test]
    fn test_new_persona_defaults_from_json() {
        let new: NewPersona = serde_json::from_str(r#"{"name":"Rook"}"#).unwrap();
        assert!(new.is_active);
        assert!(new.personality.is_empty());
    }

    #[test]
    fn test_persona_without_id_gets_fresh_one() {
        let json = r#"{"name":"Old","personality":"","systemPrompt":"","isActive":true}"#;
        let a: BotPersona = serde_json::from_str(json).unwrap();
        let b: BotPersona = serde_json::from_str(json).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_unusable_ids_are_replaced() {
        for id in [r#""""#, r#""not-a-uuid""#, "42", "null"] {
            let json = format!(
                r#"{{"id":{id},"name":"Zed","personality":"","systemPrompt":"","isActive":true}}"#
            );
            let persona: BotPersona = serde_json::from_str(&json).unwrap();
            assert_eq!(persona.name, "Zed");
        }
    }

    #[test]
    fn test_valid_id_is_kept() {
        let id = PersonaId::new();
        let json = format!(
            r#"{{"id":"{id}","name":"Yara","personality":"","systemPrompt":"","isActive":false}}"#
        );
        let persona: BotPersona = serde_json::from_str(&json).unwrap();
        assert_eq!(persona.id, id);
    }
}
