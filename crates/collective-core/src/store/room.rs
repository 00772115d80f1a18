//! Room configuration store.

use tracing::{debug, info, warn};

use collective_types::error::RepositoryError;
use collective_types::room::{RoomPreset, RoomSettings, RoomSettingsUpdate};

use super::defaults::Catalogue;
use crate::storage::kv_store::{KvStore, load_json, save_json};

/// Storage key for the room settings.
pub const ROOM_SETTINGS_KEY: &str = "collective-room-settings";

/// Holds the single active `RoomSettings`.
#[derive(Debug, Clone)]
pub struct RoomStore {
    settings: RoomSettings,
}

impl RoomStore {
    /// Fresh settings built from the default preset.
    pub fn with_default() -> Self {
        Self {
            settings: RoomSettings::from_preset(&Catalogue::builtin().default_preset),
        }
    }

    pub fn from_settings(settings: RoomSettings) -> Self {
        Self { settings }
    }

    /// Load persisted settings, falling back to the default preset.
    pub async fn load<S: KvStore + ?Sized>(store: &S) -> Self {
        match load_json::<RoomSettings, _>(store, ROOM_SETTINGS_KEY).await {
            Ok(Some(settings)) => {
                debug!(room = %settings.name, "loaded room settings");
                Self { settings }
            }
            Ok(None) => Self::with_default(),
            Err(e) => {
                warn!(error = %e, "failed to load room settings, using default");
                Self::with_default()
            }
        }
    }

    pub async fn persist<S: KvStore + ?Sized>(&self, store: &S) -> Result<(), RepositoryError> {
        save_json(store, ROOM_SETTINGS_KEY, &self.settings).await
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> RoomSettings {
        self.settings.clone()
    }

    pub fn current(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn update(&mut self, update: RoomSettingsUpdate) {
        self.settings.apply(update);
    }

    /// Replace the settings from a preset, keeping `id` and `created_at`.
    ///
    /// An unknown preset id falls back to the default preset. Returns the
    /// preset actually applied.
    pub fn apply_preset(&mut self, preset_id: &str) -> &'static RoomPreset {
        let catalogue = Catalogue::builtin();
        let preset = catalogue.preset(preset_id).unwrap_or_else(|| {
            warn!(preset_id, "unknown room preset, applying default");
            &catalogue.default_preset
        });
        self.settings.adopt_preset(preset);
        info!(preset = %preset.id, room = %self.settings.name, "room preset applied");
        preset
    }

    pub fn reset_to_default(&mut self) {
        self.settings
            .adopt_preset(&Catalogue::builtin().default_preset);
    }

    pub fn presets(&self) -> &'static [RoomPreset] {
        &Catalogue::builtin().presets
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::with_default()
    }
}
