//! Persona store: the room's roster of bot personas.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use collective_types::error::{PersonaError, RepositoryError};
use collective_types::persona::{BotPersona, BotTemplate, NewPersona, PersonaId, PersonaUpdate};

use super::defaults::Catalogue;
use crate::storage::kv_store::{KvStore, load_json, save_json};

/// Storage key for the persona list.
pub const PERSONAS_KEY: &str = "collective-bots";

/// Ordered set of personas with CRUD operations.
///
/// Pure in-memory data; `load` and `persist` move it through a `KvStore`.
#[derive(Debug, Clone)]
pub struct PersonaStore {
    personas: Vec<BotPersona>,
}

impl PersonaStore {
    /// A store seeded with the built-in default personas, each with a fresh id.
    pub fn with_defaults() -> Self {
        Self {
            personas: default_personas(),
        }
    }

    /// A store holding `personas` in order. A persona whose id repeats an
    /// earlier one gets a fresh id.
    pub fn from_personas(personas: Vec<BotPersona>) -> Self {
        Self {
            personas: with_unique_ids(personas),
        }
    }

    /// Load the persisted roster, falling back to the defaults when nothing
    /// is stored or the stored value cannot be read.
    pub async fn load<S: KvStore + ?Sized>(store: &S) -> Self {
        match load_json::<Vec<BotPersona>, _>(store, PERSONAS_KEY).await {
            Ok(Some(personas)) => {
                debug!(count = personas.len(), "loaded personas");
                Self::from_personas(personas)
            }
            Ok(None) => Self::with_defaults(),
            Err(e) => {
                warn!(error = %e, "failed to load personas, using defaults");
                Self::with_defaults()
            }
        }
    }

    /// Write the roster back to the store.
    pub async fn persist<S: KvStore + ?Sized>(&self, store: &S) -> Result<(), RepositoryError> {
        save_json(store, PERSONAS_KEY, &self.personas).await
    }

    pub fn list(&self) -> &[BotPersona] {
        &self.personas
    }

    pub fn get(&self, id: PersonaId) -> Option<&BotPersona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Snapshot of the active personas in roster order.
    pub fn active(&self) -> Vec<BotPersona> {
        self.personas.iter().filter(|p| p.is_active).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Append a new persona and return its id.
    pub fn add(&mut self, new: NewPersona) -> PersonaId {
        let persona = BotPersona::from_new(new);
        let id = persona.id;
        info!(persona_id = %id, name = %persona.name, "persona added");
        self.personas.push(persona);
        id
    }

    /// Add an active persona from a catalogue template.
    pub fn add_from_template(
        &mut self,
        template_id: &str,
        custom_name: Option<&str>,
    ) -> Result<PersonaId, PersonaError> {
        let template = Catalogue::builtin()
            .template(template_id)
            .ok_or_else(|| PersonaError::TemplateNotFound(template_id.to_string()))?;
        Ok(self.add(template.instantiate(custom_name)))
    }

    /// Apply a partial update to one persona.
    pub fn update(&mut self, id: PersonaId, update: PersonaUpdate) -> Result<(), PersonaError> {
        let persona = self
            .personas
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PersonaError::NotFound(id))?;
        persona.apply(update);
        debug!(persona_id = %id, "persona updated");
        Ok(())
    }

    pub fn set_active(&mut self, id: PersonaId, active: bool) -> Result<(), PersonaError> {
        self.update(
            id,
            PersonaUpdate {
                is_active: Some(active),
                ..Default::default()
            },
        )
    }

    /// Remove a persona and return it.
    pub fn remove(&mut self, id: PersonaId) -> Result<BotPersona, PersonaError> {
        let index = self
            .personas
            .iter()
            .position(|p| p.id == id)
            .ok_or(PersonaError::NotFound(id))?;
        let removed = self.personas.remove(index);
        info!(persona_id = %id, name = %removed.name, "persona removed");
        Ok(removed)
    }

    /// Replace the roster with freshly seeded defaults.
    pub fn reset_to_defaults(&mut self) {
        self.personas = default_personas();
    }

    /// The built-in template catalogue.
    pub fn templates(&self) -> &'static [BotTemplate] {
        &Catalogue::builtin().templates
    }
}

impl Default for PersonaStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn with_unique_ids(mut personas: Vec<BotPersona>) -> Vec<BotPersona> {
    let mut seen = HashSet::with_capacity(personas.len());
    for persona in &mut personas {
        while !seen.insert(persona.id) {
            let fresh = PersonaId::new();
            warn!(old_id = %persona.id, new_id = %fresh, name = %persona.name, "duplicate persona id reassigned");
            persona.id = fresh;
        }
    }
    personas
}

fn default_personas() -> Vec<BotPersona> {
    Catalogue::builtin()
        .default_bots
        .iter()
        .cloned()
        .map(BotPersona::from_new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryKvStore;

    #[test]
    fn test_defaults_get_fresh_ids() {
        let a = PersonaStore::with_defaults();
        let b = PersonaStore::with_defaults();
        assert!(!a.is_empty());
        assert_ne!(a.list()[0].id, b.list()[0].id);
    }

    #[test]
    fn test_active_filters_in_order() {
        let mut store = PersonaStore::from_personas(Vec::new());
        let a = store.add(NewPersona::named("A"));
        let b = store.add(NewPersona::named("B"));
        let c = store.add(NewPersona::named("C"));
        store.set_active(b, false).unwrap();

        let active: Vec<PersonaId> = store.active().iter().map(|p| p.id).collect();
        assert_eq!(active, vec![a, c]);
    }

    #[test]
    fn test_add_from_template_with_custom_name() {
        let mut store = PersonaStore::from_personas(Vec::new());
        let template = store.templates()[0].clone();

        let id = store
            .add_from_template(&template.id, Some("Custom"))
            .unwrap();
        let persona = store.get(id).unwrap();
        assert_eq!(persona.name, "Custom");
        assert_eq!(persona.system_prompt, template.system_prompt);
        assert!(persona.is_active);

        let id = store.add_from_template(&template.id, None).unwrap();
        assert_eq!(store.get(id).unwrap().name, template.name);
    }

    #[test]
    fn test_unknown_template_rejected() {
        let mut store = PersonaStore::from_personas(Vec::new());
        let err = store.add_from_template("no-such-template", None).unwrap_err();
        assert!(matches!(err, PersonaError::TemplateNotFound(id) if id == "no-such-template"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_and_remove_unknown_id() {
        let mut store = PersonaStore::from_personas(Vec::new());
        let ghost = PersonaId::new();
        assert!(matches!(
            store.update(ghost, PersonaUpdate::default()),
            Err(PersonaError::NotFound(_))
        ));
        assert!(matches!(store.remove(ghost), Err(PersonaError::NotFound(_))));
    }

    #[test]
    fn test_update_and_remove() {
        let mut store = PersonaStore::from_personas(Vec::new());
        let id = store.add(NewPersona::named("Before"));
        store
            .update(
                id,
                PersonaUpdate {
                    name: Some("After".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.get(id).unwrap().name, "After");

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.name, "After");
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_edits() {
        let mut store = PersonaStore::from_personas(Vec::new());
        let id = store.add(NewPersona::named("Alex"));
        let snapshot = store.active();

        store.remove(id).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "Alex");
    }

    #[tokio::test]
    async fn test_persist_and_load_roundtrip() {
        let kv = InMemoryKvStore::new();
        let mut store = PersonaStore::from_personas(Vec::new());
        let id = store.add(NewPersona::named("Kept"));
        store.persist(&kv).await.unwrap();

        let loaded = PersonaStore::load(&kv).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.list()[0].id, id);
    }

    #[tokio::test]
    async fn test_load_missing_or_corrupt_falls_back_to_defaults() {
        let kv = InMemoryKvStore::new();
        let loaded = PersonaStore::load(&kv).await;
        assert_eq!(loaded.len(), Catalogue::builtin().default_bots.len());

        kv.set(PERSONAS_KEY, &serde_json::json!("not a list"))
            .await
            .unwrap();
        let loaded = PersonaStore::load(&kv).await;
        assert_eq!(loaded.len(), Catalogue::builtin().default_bots.len());
    }

    #[tokio::test]
    async fn test_load_assigns_missing_ids() {
        let kv = InMemoryKvStore::new();
        kv.set(
            PERSONAS_KEY,
            &serde_json::json!([
                {"name": "Legacy", "personality": "", "systemPrompt": "", "isActive": true}
            ]),
        )
        .await
        .unwrap();

        let loaded = PersonaStore::load(&kv).await;
        assert_eq!(loaded.list()[0].name, "Legacy");
        assert!(loaded.get(loaded.list()[0].id).is_some());
    }

    #[tokio::test]
    async fn test_load_keeps_roster_with_empty_id() {
        let kv = InMemoryKvStore::new();
        let yara = PersonaId::new();
        kv.set(
            PERSONAS_KEY,
            &serde_json::json!([
                {"id": "", "name": "Zed", "personality": "", "systemPrompt": "", "isActive": true},
                {"id": yara.to_string(), "name": "Yara", "personality": "", "systemPrompt": "", "isActive": true}
            ]),
        )
        .await
        .unwrap();

        let loaded = PersonaStore::load(&kv).await;
        let names: Vec<&str> = loaded.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Yara"]);
        assert_eq!(loaded.list()[1].id, yara);
        assert_ne!(loaded.list()[0].id, yara);
    }

    #[tokio::test]
    async fn test_load_reassigns_duplicate_ids() {
        let kv = InMemoryKvStore::new();
        let shared = PersonaId::new();
        kv.set(
            PERSONAS_KEY,
            &serde_json::json!([
                {"id": shared.to_string(), "name": "First", "personality": "", "systemPrompt": "", "isActive": true},
                {"id": shared.to_string(), "name": "Second", "personality": "", "systemPrompt": "", "isActive": true}
            ]),
        )
        .await
        .unwrap();

        let loaded = PersonaStore::load(&kv).await;
        let ids: Vec<PersonaId> = loaded.active().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], shared);
        assert_ne!(ids[1], shared);
    }

    #[test]
    fn test_from_personas_reassigns_duplicate_ids() {
        let original = BotPersona::from_new(NewPersona::named("Alex"));
        let copy = BotPersona {
            name: "Alex Copy".to_string(),
            ..original.clone()
        };

        let store = PersonaStore::from_personas(vec![original.clone(), copy]);
        assert_eq!(store.list()[0].id, original.id);
        assert_ne!(store.list()[1].id, original.id);
        assert_eq!(store.list()[1].name, "Alex Copy");
    }
}
