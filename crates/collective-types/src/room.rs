//! Room settings and presets.
//!
//! The room is the shared stage every persona speaks on: its setting and
//! context text are rendered into each persona's prompt. Cosmetic fields
//! (color, background) are carried for the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single active room configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Where the conversation takes place (e.g. "Medieval tavern").
    pub setting: String,
    /// Additional context that influences bot behavior.
    pub context: String,
    /// Advisory cap on active personas; not enforced by dispatch.
    pub max_bots: u32,
    /// Hex color for theming.
    pub primary_color: String,
    /// URL for a background image.
    pub background_image: String,
    pub created_at: DateTime<Utc>,
}

impl RoomSettings {
    /// Build fresh settings (new id, `created_at = now`) from a preset.
    pub fn from_preset(preset: &RoomPreset) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: preset.name.clone(),
            description: preset.description.clone(),
            setting: preset.setting.clone(),
            context: preset.context.clone(),
            max_bots: preset.max_bots,
            primary_color: preset.primary_color.clone(),
            background_image: preset.background_image.clone(),
            created_at: Utc::now(),
        }
    }

    /// Replace every field from a preset while keeping `id` and `created_at`.
    pub fn adopt_preset(&mut self, preset: &RoomPreset) {
        let replacement = Self {
            id: self.id,
            created_at: self.created_at,
            ..Self::from_preset(preset)
        };
        *self = replacement;
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: RoomSettingsUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(setting) = update.setting {
            self.setting = setting;
        }
        if let Some(context) = update.context {
            self.context = context;
        }
        if let Some(max_bots) = update.max_bots {
            self.max_bots = max_bots;
        }
        if let Some(primary_color) = update.primary_color {
            self.primary_color = primary_color;
        }
        if let Some(background_image) = update.background_image {
            self.background_image = background_image;
        }
    }
}

/// Partial update for room settings. Identity fields are not updatable.
#[derive(Debug, Clone, Default)]
pub struct RoomSettingsUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub setting: Option<String>,
    pub context: Option<String>,
    pub max_bots: Option<u32>,
    pub primary_color: Option<String>,
    pub background_image: Option<String>,
}

/// A built-in room configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPreset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub setting: String,
    pub context: String,
    pub max_bots: u32,
    pub primary_color: String,
    #[serde(default)]
    pub background_image: String,
}
