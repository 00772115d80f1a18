//! Key-value store trait.
//!
//! Stores arbitrary JSON values under fixed string keys.

use serde::Serialize;
use serde::de::DeserializeOwned;

use collective_types::error::RepositoryError;

/// Trait for persistent key-value storage of JSON values.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, RepositoryError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(&self, key: &str)
    -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Read and decode a typed value. `Ok(None)` when the key is absent.
pub async fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, RepositoryError>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RepositoryError::Serialization(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

/// Encode and write a typed value.
pub async fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), RepositoryError>
where
    T: Serialize + ?Sized,
    S: KvStore + ?Sized,
{
    let value = serde_json::to_value(value)
        .map_err(|e| RepositoryError::Serialization(format!("{key}: {e}")))?;
    store.set(key, &value).await
}
