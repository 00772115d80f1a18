//! LlmProvider trait definition.
//!
//! The single abstraction every completion backend implements. Uses RPITIT
//! for `complete`; `BoxLlmProvider` adds dynamic dispatch on top.

use collective_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends.
///
/// Implementations live in collective-infra (e.g., `BedrockProvider`).
/// A provider performs exactly one outbound request per `complete` call;
/// retries and caching are not its concern.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "bedrock").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
