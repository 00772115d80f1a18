//! Built-in persona and room catalogues.
//!
//! Shipped as JSON under `data/` and parsed once on first use.

use std::sync::LazyLock;

use serde::Deserialize;
use tracing::error;

use collective_types::persona::{BotTemplate, NewPersona};
use collective_types::room::RoomPreset;

const DEFAULT_BOTS_JSON: &str = include_str!("../../data/default_bots.json");
const BOT_TEMPLATES_JSON: &str = include_str!("../../data/bot_templates.json");
const ROOM_PRESETS_JSON: &str = include_str!("../../data/room_presets.json");

/// Id of the preset used for fresh rooms and unknown preset ids.
pub const DEFAULT_PRESET_ID: &str = "default";

#[derive(Deserialize)]
struct DefaultBotsFile {
    bots: Vec<NewPersona>,
}

#[derive(Deserialize)]
struct TemplatesFile {
    templates: Vec<BotTemplate>,
}

#[derive(Deserialize)]
struct PresetsFile {
    default: RoomPreset,
    presets: Vec<RoomPreset>,
}

/// The parsed built-in catalogues.
#[derive(Debug, Clone)]
pub struct Catalogue {
    pub default_bots: Vec<NewPersona>,
    pub templates: Vec<BotTemplate>,
    pub default_preset: RoomPreset,
    pub presets: Vec<RoomPreset>,
}

static BUILTIN: LazyLock<Catalogue> = LazyLock::new(|| {
    Catalogue::parse(DEFAULT_BOTS_JSON, BOT_TEMPLATES_JSON, ROOM_PRESETS_JSON).unwrap_or_else(
        |e| {
            error!(error = %e, "built-in catalogue is malformed, starting with an empty one");
            Catalogue::empty()
        },
    )
});

impl Catalogue {
    /// The catalogue compiled into the crate.
    pub fn builtin() -> &'static Catalogue {
        &BUILTIN
    }

    /// Parse the three catalogue documents.
    pub fn parse(bots: &str, templates: &str, presets: &str) -> Result<Self, serde_json::Error> {
        let bots: DefaultBotsFile = serde_json::from_str(bots)?;
        let templates: TemplatesFile = serde_json::from_str(templates)?;
        let presets: PresetsFile = serde_json::from_str(presets)?;
        Ok(Self {
            default_bots: bots.bots,
            templates: templates.templates,
            default_preset: presets.default,
            presets: presets.presets,
        })
    }

    fn empty() -> Self {
        Self {
            default_bots: Vec::new(),
            templates: Vec::new(),
            default_preset: RoomPreset {
                id: DEFAULT_PRESET_ID.to_string(),
                name: "The Collective".to_string(),
                description: String::new(),
                setting: String::new(),
                context: String::new(),
                max_bots: 5,
                primary_color: String::new(),
                background_image: String::new(),
            },
            presets: Vec::new(),
        }
    }

    pub fn template(&self, id: &str) -> Option<&BotTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Look up a preset by id. `"default"` names the default preset.
    pub fn preset(&self, id: &str) -> Option<&RoomPreset> {
        if id == self.default_preset.id {
            return Some(&self.default_preset);
        }
        self.presets.iter().find(|p| p.id == id)
    }
}
