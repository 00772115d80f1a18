//! Configuration types for the Collective chatroom.
//!
//! `AppConfig` represents the `config.toml` in the data directory. All
//! fields have defaults so an empty or missing file is valid. Credentials
//! are never part of the file; they are resolved from the environment into
//! [`BedrockCredentials`].

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default AWS region for Bedrock.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default Bedrock model (Claude Sonnet 4 cross-region inference profile).
pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

/// Default generation budget per completion.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name used for human messages.
    #[serde(default = "default_human_name")]
    pub human_name: String,

    #[serde(default)]
    pub bedrock: BedrockSettings,
}

fn default_human_name() -> String {
    "Human".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            human_name: default_human_name(),
            bedrock: BedrockSettings::default(),
        }
    }
}

/// Non-secret Bedrock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockSettings {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Optional per-request timeout. Unset means requests never time out.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for BedrockSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
            model_id: default_model_id(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: None,
        }
    }
}

/// How requests to Bedrock are authenticated.
///
/// Secret halves are wrapped in [`SecretString`] and never appear in
/// `Debug` output.
#[derive(Debug, Clone)]
pub enum BedrockAuth {
    /// IAM access key pair, signed with AWS Signature V4.
    AccessKey {
        access_key_id: String,
        secret_access_key: SecretString,
        session_token: Option<SecretString>,
    },
    /// Bedrock API key sent as a bearer token.
    BearerToken(SecretString),
}

/// Everything needed to talk to the Bedrock Runtime API.
#[derive(Debug, Clone)]
pub struct BedrockCredentials {
    pub region: String,
    pub model_id: String,
    pub auth: BedrockAuth,
}

impl BedrockCredentials {
    /// Build credentials from an IAM access key pair.
    ///
    /// Both halves of the pair must be non-blank.
    pub fn access_key(
        region: impl Into<String>,
        model_id: impl Into<String>,
        access_key_id: &str,
        secret_access_key: &str,
        session_token: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if access_key_id.trim().is_empty() || secret_access_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        let credentials = Self {
            region: region.into(),
            model_id: model_id.into(),
            auth: BedrockAuth::AccessKey {
                access_key_id: access_key_id.trim().to_string(),
                secret_access_key: SecretString::from(secret_access_key.trim().to_string()),
                session_token: session_token
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| SecretString::from(t.to_string())),
            },
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Build credentials from a Bedrock API key.
    pub fn bearer_token(
        region: impl Into<String>,
        model_id: impl Into<String>,
        token: &str,
    ) -> Result<Self, ConfigError> {
        if token.trim().is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        let credentials = Self {
            region: region.into(),
            model_id: model_id.into(),
            auth: BedrockAuth::BearerToken(SecretString::from(token.trim().to_string())),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Check that the region is usable as a hostname label.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let region_ok = !self.region.is_empty()
            && self
                .region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !region_ok {
            return Err(ConfigError::InvalidRegion(self.region.clone()));
        }
        if let BedrockAuth::AccessKey {
            secret_access_key, ..
        } = &self.auth
        {
            if secret_access_key.expose_secret().is_empty() {
                return Err(ConfigError::MissingCredentials);
            }
        }
        Ok(())
    }

    /// Short description of the auth mode for status output.
    pub fn auth_label(&self) -> &'static str {
        match self.auth {
            BedrockAuth::AccessKey { .. } => "access key (SigV4)",
            BedrockAuth::BearerToken(_) => "bearer token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults_from_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.human_name, "Human");
        assert_eq!(config.bedrock.region, DEFAULT_REGION);
        assert_eq!(config.bedrock.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.bedrock.max_tokens, 1000);
        assert!(config.bedrock.request_timeout_secs.is_none());
    }

    #[test]
    fn test_app_config_partial_section() {
        let config: AppConfig = toml::from_str(
            r#"
human_name = "Ada"

[bedrock]
region = "eu-west-1"
request_timeout_secs = 90
"#,
        )
        .unwrap();
        assert_eq!(config.human_name, "Ada");
        assert_eq!(config.bedrock.region, "eu-west-1");
        assert_eq!(config.bedrock.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.bedrock.request_timeout_secs, Some(90));
    }

    #[test]
    fn test_access_key_requires_both_halves() {
        let err = BedrockCredentials::access_key(DEFAULT_REGION, DEFAULT_MODEL_ID, "AKIA", " ", None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));

        let err = BedrockCredentials::access_key(DEFAULT_REGION, DEFAULT_MODEL_ID, "", "secret", None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));
    }

    #[test]
    fn test_invalid_region_rejected() {
        let err = BedrockCredentials::bearer_token("us-east-1/evil", DEFAULT_MODEL_ID, "tok")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegion(_)));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let creds = BedrockCredentials::access_key(
            DEFAULT_REGION,
            DEFAULT_MODEL_ID,
            "AKIDEXAMPLE",
            "super-secret-value",
            Some("session-value"),
        )
        .unwrap();
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("session-value"));
        assert_eq!(creds.auth_label(), "access key (SigV4)");
    }

    #[test]
    fn test_blank_session_token_dropped() {
        let creds =
            BedrockCredentials::access_key(DEFAULT_REGION, DEFAULT_MODEL_ID, "AKID", "secret", Some(""))
                .unwrap();
        match creds.auth {
            BedrockAuth::AccessKey { session_token, .. } => assert!(session_token.is_none()),
            BedrockAuth::BearerToken(_) => panic!("expected access key auth"),
        }
    }
}
