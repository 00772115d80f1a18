//! Configuration loader for Collective.
//!
//! Reads `config.toml` from the data directory (`~/.collective/` by default)
//! into [`AppConfig`], then lets environment variables override individual
//! fields. A missing or malformed file falls back to defaults.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use collective_types::config::AppConfig;
use collective_types::error::ConfigError;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "COLLECTIVE_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority: `COLLECTIVE_DATA_DIR`, then `~/.collective`, then `./.collective`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".collective");
    }

    PathBuf::from(".collective")
}

/// Read and parse `{data_dir}/config.toml`.
///
/// Returns `Ok(None)` when the file does not exist.
pub async fn read_config(data_dir: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Read(format!(
                "{}: {err}",
                config_path.display()
            )));
        }
    };

    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse(format!("{}: {err}", config_path.display())))
}

/// Load the effective configuration: file (or defaults) plus process env.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let mut config = match read_config(data_dir).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            debug!("no {CONFIG_FILE} found in {}, using defaults", data_dir.display());
            AppConfig::default()
        }
        Err(err) => {
            warn!("{err}, using defaults");
            AppConfig::default()
        }
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Override config fields from environment variables.
///
/// `lookup` abstracts the environment so tests do not touch process state.
/// Blank values are ignored.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(region) = get("AWS_REGION") {
        config.bedrock.region = region.trim().to_string();
    }
    if let Some(model_id) = get("BEDROCK_MODEL_ID") {
        config.bedrock.model_id = model_id.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    use collective_types::config::{DEFAULT_MODEL_ID, DEFAULT_REGION};

    #[tokio::test]
    async fn read_config_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(read_config(tmp.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
human_name = "Grace"

[bedrock]
region = "us-west-2"
max_tokens = 512
"#,
        )
        .await
        .unwrap();

        let config = read_config(tmp.path()).await.unwrap().unwrap();
        assert_eq!(config.human_name, "Grace");
        assert_eq!(config.bedrock.region, "us-west-2");
        assert_eq!(config.bedrock.max_tokens, 512);
        assert_eq!(config.bedrock.model_id, DEFAULT_MODEL_ID);
    }

    #[tokio::test]
    async fn read_config_invalid_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let err = read_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "human_name = [")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.human_name, "Human");
    }

    #[test]
    fn env_overrides_region_and_model() {
        let env: HashMap<&str, &str> =
            HashMap::from([("AWS_REGION", "eu-central-1"), ("BEDROCK_MODEL_ID", "  custom-model  ")]);
        let mut config = AppConfig::default();

        apply_env_overrides(&mut config, |k: &str| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.bedrock.region, "eu-central-1");
        assert_eq!(config.bedrock.model_id, "custom-model");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |_| Some("   ".to_string()));
        assert_eq!(config.bedrock.region, DEFAULT_REGION);
        assert_eq!(config.bedrock.model_id, DEFAULT_MODEL_ID);
    }
}
