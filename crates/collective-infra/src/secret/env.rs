//! Environment variable credential source.
//!
//! Credentials are never written to disk by the application; they come from
//! the standard AWS variables:
//! - `AWS_BEARER_TOKEN_BEDROCK`: a Bedrock API key (takes precedence)
//! - `AWS_ACCESS_KEY_ID` + `AWS_SECRET_ACCESS_KEY` (+ optional `AWS_SESSION_TOKEN`)

use tracing::debug;

use collective_types::config::{BedrockCredentials, BedrockSettings};
use collective_types::error::ConfigError;

pub const BEARER_TOKEN_VAR: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

/// Resolves Bedrock credentials from environment variables.
pub struct EnvCredentialSource<F> {
    lookup: F,
}

impl EnvCredentialSource<fn(&str) -> Option<String>> {
    /// A source reading the process environment.
    pub fn new() -> Self {
        Self {
            lookup: process_env,
        }
    }
}

impl Default for EnvCredentialSource<fn(&str) -> Option<String>> {
    fn default() -> Self {
        Self::new()
    }
}

fn process_env(key: &str) -> Option<String> {
    // Non-Unicode values are treated as unset.
    std::env::var(key).ok()
}

impl<F: Fn(&str) -> Option<String>> EnvCredentialSource<F> {
    /// A source reading from an arbitrary lookup function.
    pub fn with_lookup(lookup: F) -> Self {
        Self { lookup }
    }

    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Resolve credentials for `settings`.
    ///
    /// Returns `Ok(None)` when no credential variables are set at all, and
    /// `MissingCredentials` when only half of an access key pair is present.
    pub fn resolve(
        &self,
        settings: &BedrockSettings,
    ) -> Result<Option<BedrockCredentials>, ConfigError> {
        if let Some(token) = self.get(BEARER_TOKEN_VAR) {
            debug!("using Bedrock bearer token from environment");
            return BedrockCredentials::bearer_token(&settings.region, &settings.model_id, &token)
                .map(Some);
        }

        let access_key_id = self.get(ACCESS_KEY_ID_VAR);
        let secret_access_key = self.get(SECRET_ACCESS_KEY_VAR);
        match (access_key_id, secret_access_key) {
            (None, None) => Ok(None),
            (Some(id), Some(secret)) => {
                debug!("using AWS access key from environment");
                let session_token = self.get(SESSION_TOKEN_VAR);
                BedrockCredentials::access_key(
                    &settings.region,
                    &settings.model_id,
                    &id,
                    &secret,
                    session_token.as_deref(),
                )
                .map(Some)
            }
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}
