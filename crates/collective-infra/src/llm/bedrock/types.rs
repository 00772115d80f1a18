//! AWS Bedrock request/response types for Anthropic models.
//!
//! Bedrock takes the Claude Messages API body with two differences from the
//! direct API: `model` is omitted (it is part of the URL path) and
//! `anthropic_version` is required.

use serde::{Deserialize, Serialize};

/// Request body for Bedrock `invoke`.
#[derive(Debug, Clone, Serialize)]
pub struct BedrockRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub messages: Vec<BedrockMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BedrockMessage {
    pub role: String,
    pub content: String,
}

/// The metadata fields of a Bedrock `invoke` response.
///
/// Every field is optional on the wire. The reply text is read separately
/// from `content[0].text` so that an unexpected `content` shape degrades to
/// "no text" instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BedrockResponse {
    pub id: String,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: BedrockUsage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BedrockUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Text of the first content block, or `""` when there is none.
pub fn first_text(body: &serde_json::Value) -> &str {
    body.pointer("/content/0/text")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
}
