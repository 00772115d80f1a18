//! Application state wiring the stores, config and completion client.
//!
//! `AppState` pins the generic core types to the concrete infra
//! implementations: a JSON-file `KvStore` under the data directory and the
//! Bedrock provider behind the shared `CompletionClient`.

use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use collective_core::chat::session::ChatSession;
use collective_core::completion::CompletionClient;
use collective_core::orchestrator::ResponseOrchestrator;
use collective_core::store::persona::PersonaStore;
use collective_core::store::room::RoomStore;
use collective_infra::config::load_config;
use collective_infra::llm::create_provider;
use collective_infra::secret::env::EnvCredentialSource;
use collective_infra::storage::json_file::JsonFileKvStore;
use collective_types::config::{AppConfig, BedrockCredentials};

/// Concrete session type used by the terminal.
pub type RoomSession = ChatSession<ResponseOrchestrator>;

/// Everything the chat loop reads and mutates.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub kv: JsonFileKvStore,
    pub personas: PersonaStore,
    pub room: RoomStore,
    pub session: RoomSession,
    /// How the provider authenticates, or `None` while disconnected.
    pub auth_label: Option<&'static str>,
}

impl AppState {
    /// Load config and credentials from `data_dir` and the environment, then
    /// wire the application.
    pub async fn init(data_dir: PathBuf, human_name: Option<String>) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let mut config = load_config(&data_dir).await;
        if let Some(name) = human_name {
            config.human_name = name;
        }

        let credentials = match EnvCredentialSource::new().resolve(&config.bedrock) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "ignoring incomplete Bedrock credentials");
                None
            }
        };

        Self::open(data_dir, config, credentials).await
    }

    /// Wire the application from already-resolved config and credentials.
    ///
    /// Without credentials the completion client stays uninitialized and every
    /// persona reports an error until `/connect` installs a provider.
    pub async fn open(
        data_dir: PathBuf,
        config: AppConfig,
        credentials: Option<BedrockCredentials>,
    ) -> anyhow::Result<Self> {
        let kv = JsonFileKvStore::new(data_dir.join("state"));
        let personas = PersonaStore::load(&kv).await;
        let room = RoomStore::load(&kv).await;

        let session = ChatSession::new(ResponseOrchestrator::new(CompletionClient::new()))
            .with_human_name(config.human_name.clone());

        let mut state = Self {
            data_dir,
            config,
            kv,
            personas,
            room,
            session,
            auth_label: None,
        };

        match credentials {
            Some(credentials) => state.connect(credentials).await?,
            None => warn!("no Bedrock credentials found; personas will report errors"),
        }
        Ok(state)
    }

    /// Install (or replace) the Bedrock provider behind the session.
    ///
    /// On failure the previous provider, if any, stays in place.
    pub async fn connect(&mut self, credentials: BedrockCredentials) -> anyhow::Result<()> {
        let label = credentials.auth_label();
        let model_id = credentials.model_id.clone();
        let region = credentials.region.clone();
        let provider = create_provider(credentials, &self.config.bedrock)
            .context("failed to create Bedrock provider")?;
        self.client()
            .initialize(provider, model_id, self.config.bedrock.max_tokens)
            .await;
        info!(auth = label, region = %region, "Bedrock provider ready");
        self.auth_label = Some(label);
        Ok(())
    }

    /// Remove the provider. Personas report errors until the next `connect`.
    pub async fn disconnect(&mut self) {
        self.client().reset().await;
        self.auth_label = None;
        info!("Bedrock provider disconnected");
    }

    /// Completion client shared with the orchestrator.
    pub fn client(&self) -> &CompletionClient {
        self.session.dispatcher().client()
    }

    /// Persist the persona roster.
    pub async fn save_personas(&self) -> anyhow::Result<()> {
        self.personas
            .persist(&self.kv)
            .await
            .context("failed to save personas")
    }

    /// Persist the room settings.
    pub async fn save_room(&self) -> anyhow::Result<()> {
        self.room
            .persist(&self.kv)
            .await
            .context("failed to save room settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use collective_types::config::{DEFAULT_MODEL_ID, DEFAULT_REGION};

    #[tokio::test]
    async fn test_open_without_credentials_leaves_client_uninitialized() {
        let tmp = TempDir::new().unwrap();
        let state = AppState::open(tmp.path().to_path_buf(), AppConfig::default(), None)
            .await
            .unwrap();

        assert!(state.auth_label.is_none());
        assert!(!state.session.dispatcher().client().is_initialized().await);
        assert!(!state.personas.is_empty());
        assert_eq!(state.session.human_name(), "Human");
    }

    #[tokio::test]
    async fn test_open_with_credentials_initializes_client() {
        let tmp = TempDir::new().unwrap();
        let credentials =
            BedrockCredentials::bearer_token(DEFAULT_REGION, DEFAULT_MODEL_ID, "token").unwrap();
        let state = AppState::open(tmp.path().to_path_buf(), AppConfig::default(), Some(credentials))
            .await
            .unwrap();

        assert_eq!(state.auth_label, Some("bearer token"));
        let (provider, model) = state.session.dispatcher().client().describe().await.unwrap();
        assert_eq!(provider, "bedrock");
        assert_eq!(model, DEFAULT_MODEL_ID);
    }

    #[tokio::test]
    async fn test_connect_replaces_and_disconnect_resets() {
        let tmp = TempDir::new().unwrap();
        let mut state = AppState::open(tmp.path().to_path_buf(), AppConfig::default(), None)
            .await
            .unwrap();

        let credentials =
            BedrockCredentials::access_key("eu-west-1", "other-model", "AKID", "secret", None)
                .unwrap();
        state.connect(credentials).await.unwrap();
        assert_eq!(state.auth_label, Some("access key (SigV4)"));
        let (_, model) = state.client().describe().await.unwrap();
        assert_eq!(model, "other-model");

        state.disconnect().await;
        assert!(state.auth_label.is_none());
        assert!(!state.client().is_initialized().await);
    }

    #[tokio::test]
    async fn test_saved_state_is_reloaded() {
        let tmp = TempDir::new().unwrap();
        {
            let mut state = AppState::open(tmp.path().to_path_buf(), AppConfig::default(), None)
                .await
                .unwrap();
            state.personas.reset_to_defaults();
            state
                .personas
                .add(collective_types::persona::NewPersona::named("Zed"));
            state.room.apply_preset("sci-fi");
            state.save_personas().await.unwrap();
            state.save_room().await.unwrap();
        }

        let state = AppState::open(tmp.path().to_path_buf(), AppConfig::default(), None)
            .await
            .unwrap();
        assert!(state.personas.list().iter().any(|p| p.name == "Zed"));
        assert_ne!(state.room.current().name, "The Collective");
    }
}
