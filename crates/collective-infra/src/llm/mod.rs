//! LLM provider implementations.
//!
//! Contains the AWS Bedrock implementation of the [`LlmProvider`] trait
//! defined in `collective-core`, plus a factory ([`create_provider`]) that
//! builds it from resolved credentials and settings.
//!
//! [`LlmProvider`]: collective_core::llm::provider::LlmProvider

pub mod bedrock;

use std::time::Duration;

use collective_core::llm::box_provider::BoxLlmProvider;
use collective_types::config::{BedrockCredentials, BedrockSettings};
use collective_types::llm::LlmError;

use self::bedrock::BedrockProvider;

/// Create a [`BoxLlmProvider`] for Bedrock.
///
/// Credentials are validated first; the request timeout comes from
/// `settings.request_timeout_secs` and is disabled when unset.
///
/// # Errors
///
/// Returns `InvalidRequest` for an invalid region, or `Provider` if the
/// HTTP client cannot be built.
pub fn create_provider(
    credentials: BedrockCredentials,
    settings: &BedrockSettings,
) -> Result<BoxLlmProvider, LlmError> {
    credentials
        .validate()
        .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;
    let timeout = settings.request_timeout_secs.map(Duration::from_secs);
    let provider = BedrockProvider::new(credentials, timeout)?;
    Ok(BoxLlmProvider::new(provider))
}
