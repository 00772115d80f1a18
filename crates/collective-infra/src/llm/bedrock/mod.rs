//! AWS Bedrock LLM provider implementation.
//!
//! Implements [`LlmProvider`](collective_core::llm::provider::LlmProvider)
//! for the Bedrock Runtime `invoke` API with either SigV4 (IAM access key)
//! or bearer-token authentication.

mod client;
pub mod sigv4;
pub mod types;

pub use client::BedrockProvider;
