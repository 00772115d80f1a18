//! JSON-file implementation of the `KvStore` port.
//!
//! Each key is stored as `{dir}/{key}.json`. Writes go to a temporary file
//! in the same directory first and are then renamed over the target, so a
//! crash never leaves a half-written value behind.

use std::path::{Path, PathBuf};

use tracing::debug;

use collective_core::storage::kv_store::KvStore;
use collective_types::error::RepositoryError;

/// A `KvStore` that keeps one pretty-printed JSON file per key.
#[derive(Debug, Clone)]
pub struct JsonFileKvStore {
    dir: PathBuf,
}

impl JsonFileKvStore {
    /// Store files under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`, after validating the key.
    fn path_for(&self, key: &str) -> Result<PathBuf, RepositoryError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(RepositoryError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> RepositoryError {
    RepositoryError::Io(format!("{}: {err}", path.display()))
}

impl KvStore for JsonFileKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        let path = self.path_for(key)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&path, err)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RepositoryError::Serialization(format!("{}: {e}", path.display())))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let path = self.path_for(key)?;
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let tmp = self
            .dir
            .join(format!(".{key}.json.{}.tmp", uuid::Uuid::now_v7()));
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&path, e));
        }

        debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    use collective_core::store::persona::PersonaStore;
    use collective_core::store::room::RoomStore;

    #[tokio::test]
    async fn test_set_get_delete() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileKvStore::new(tmp.path().join("state"));

        assert!(store.get("collective-bots").await.unwrap().is_none());

        store
            .set("collective-bots", &json!([{"name": "Alex"}]))
            .await
            .unwrap();
        assert_eq!(
            store.get("collective-bots").await.unwrap(),
            Some(json!([{"name": "Alex"}]))
        );
        assert!(tmp.path().join("state/collective-bots.json").exists());

        store.delete("collective-bots").await.unwrap();
        store.delete("collective-bots").await.unwrap();
        assert!(store.get("collective-bots").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileKvStore::new(tmp.path());

        store.set("k", &json!(1)).await.unwrap();
        store.set("k", &json!(2)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));

        let entries: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["k.json".to_string()]);
    }

    #[tokio::test]
    async fn test_rejects_bad_keys() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileKvStore::new(tmp.path());

        for key in ["", "../escape", "a/b", ".hidden", "spaces here"] {
            let err = store.set(key, &json!(null)).await.unwrap_err();
            assert!(matches!(err, RepositoryError::InvalidKey(_)), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("broken.json"), "{not json").unwrap();
        let store = JsonFileKvStore::new(tmp.path());

        let err = store.get("broken").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_stores_persist_across_instances() {
        let tmp = TempDir::new().unwrap();

        let mut personas = PersonaStore::with_defaults();
        let template_id = personas.templates()[0].id.clone();
        personas.add_from_template(&template_id, Some("Nova")).unwrap();
        let mut room = RoomStore::with_default();
        room.apply_preset("tavern");
        {
            let store = JsonFileKvStore::new(tmp.path());
            personas.persist(&store).await.unwrap();
            room.persist(&store).await.unwrap();
        }

        let store = JsonFileKvStore::new(tmp.path());
        let loaded_personas = PersonaStore::load(&store).await;
        let loaded_room = RoomStore::load(&store).await;
        assert_eq!(loaded_personas.list(), personas.list());
        assert_eq!(loaded_room.settings(), room.settings());
    }
}
