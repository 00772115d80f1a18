//! BedrockProvider -- concrete [`LlmProvider`] implementation for AWS Bedrock.
//!
//! Sends one `invoke` request per completion. Requests are authenticated
//! either with AWS Signature V4 (IAM access key pair) or with a Bedrock API
//! key sent as a bearer token.
//!
//! Secrets are held as [`secrecy::SecretString`] and only exposed while
//! building request headers. They never appear in logs or `Debug` output.

use std::time::Duration;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use collective_core::llm::provider::LlmProvider;
use collective_types::config::{BedrockAuth, BedrockCredentials};
use collective_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::sigv4::{self, AwsCredentials, SigningRequest};
use super::types::{BedrockMessage, BedrockRequest, BedrockResponse, first_text};

/// AWS Bedrock Claude provider.
pub struct BedrockProvider {
    client: reqwest::Client,
    auth: BedrockAuth,
    region: String,
    model_id: String,
    endpoint: String,
}

impl BedrockProvider {
    /// The Anthropic API version for Bedrock.
    const API_VERSION: &'static str = "bedrock-2023-05-31";

    /// Prefix used to identify Bedrock API keys.
    const KEY_PREFIX: &'static str = "bedrock-api-key-";

    /// SigV4 service name for Bedrock Runtime.
    const SERVICE: &'static str = "bedrock";

    /// Create a provider from resolved credentials.
    ///
    /// `request_timeout` of `None` means requests never time out.
    ///
    /// A bearer token starting with `bedrock-api-key-` has the prefix
    /// stripped. When the token embeds a credential scope for a different
    /// region, that region is used instead.
    pub fn new(
        credentials: BedrockCredentials,
        request_timeout: Option<Duration>,
    ) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| LlmError::Provider {
            message: format!("failed to create HTTP client: {e}"),
        })?;

        let BedrockCredentials {
            mut region,
            model_id,
            auth,
        } = credentials;

        let auth = match auth {
            BedrockAuth::BearerToken(token) => {
                let raw = token.expose_secret();
                let token_part = raw.strip_prefix(Self::KEY_PREFIX).unwrap_or(raw);
                if let Some(detected) = Self::detect_region_from_token(token_part) {
                    region = detected;
                }
                BedrockAuth::BearerToken(SecretString::from(token_part.to_string()))
            }
            other => other,
        };

        let endpoint = format!("https://bedrock-runtime.{region}.amazonaws.com");

        Ok(Self {
            client,
            auth,
            region,
            model_id,
            endpoint,
        })
    }

    /// Send requests to `endpoint` (scheme and authority, no trailing slash)
    /// instead of the regional AWS host.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Try to extract the AWS region from a base64-encoded presigned URL token.
    ///
    /// The token decodes to a URL like:
    /// `bedrock.amazonaws.com/?...&X-Amz-Credential=AKIA.../20260212/us-east-1/bedrock/aws4_request&...`
    fn detect_region_from_token(token: &str) -> Option<String> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(token)
            .ok()?;
        let text = String::from_utf8(decoded).ok()?;

        let cred_start = text.find("X-Amz-Credential=")?;
        let cred_value = &text[cred_start + "X-Amz-Credential=".len()..];
        // <access-key>/<date>/<region>/<service>/aws4_request
        let parts: Vec<&str> = cred_value.split('/').collect();
        if parts.len() >= 3 {
            let region = parts[2].split('&').next().unwrap_or(parts[2]);
            info!(region = %region, "detected region from Bedrock bearer token");
            Some(region.to_string())
        } else {
            None
        }
    }

    /// Full `invoke` URL for a model. The model id is percent-encoded
    /// (`:` becomes `%3A`).
    fn url(&self, model_id: &str) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint,
            urlencoding::encode(model_id)
        )
    }

    fn to_bedrock_request(&self, request: &CompletionRequest) -> BedrockRequest {
        BedrockRequest {
            anthropic_version: Self::API_VERSION.to_string(),
            max_tokens: request.max_tokens,
            messages: request
                .messages
                .iter()
                .map(|m| BedrockMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        }
    }

    /// Build a ready-to-send request carrying the auth headers.
    fn authorized_request(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> Result<reqwest::RequestBuilder, LlmError> {
        let request = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .header("accept", "application/json");

        match &self.auth {
            BedrockAuth::BearerToken(token) => Ok(request
                .header(
                    "authorization",
                    format!("Bearer {}", token.expose_secret()),
                )
                .body(body)),
            BedrockAuth::AccessKey {
                access_key_id,
                secret_access_key,
                session_token,
            } => {
                let parsed = reqwest::Url::parse(url)
                    .map_err(|e| LlmError::InvalidRequest(format!("invalid URL {url}: {e}")))?;
                let host = match (parsed.host_str(), parsed.port()) {
                    (Some(host), Some(port)) => format!("{host}:{port}"),
                    (Some(host), None) => host.to_string(),
                    (None, _) => {
                        return Err(LlmError::InvalidRequest(format!("URL has no host: {url}")));
                    }
                };

                let credentials = AwsCredentials {
                    access_key_id,
                    secret_access_key: secret_access_key.expose_secret(),
                    session_token: session_token.as_ref().map(|t| t.expose_secret()),
                };
                let signing = SigningRequest {
                    method: "POST",
                    path: parsed.path(),
                    headers: &[
                        ("accept", "application/json"),
                        ("content-type", "application/json"),
                        ("host", host.as_str()),
                    ],
                    payload: &body,
                };
                let signed = sigv4::sign(
                    &credentials,
                    &self.region,
                    Self::SERVICE,
                    &signing,
                    Utc::now(),
                )?;

                let mut request = request
                    .header("x-amz-date", signed.x_amz_date)
                    .header("authorization", signed.authorization);
                if let Some(token) = signed.x_amz_security_token {
                    request = request.header("x-amz-security-token", token);
                }
                Ok(request.body(body))
            }
        }
    }
}

// BedrockProvider intentionally does NOT derive Debug to prevent
// accidental exposure of internal state.

impl LlmProvider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model_id = if request.model.is_empty() {
            self.model_id.as_str()
        } else {
            request.model.as_str()
        };
        let url = self.url(model_id);
        let body = serde_json::to_vec(&self.to_bedrock_request(request))
            .map_err(|e| LlmError::InvalidRequest(format!("failed to encode request: {e}")))?;

        debug!(url = %url, model_id = %model_id, region = %self.region, "Bedrock invoke request");

        let response = self
            .authorized_request(&url, body)?
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %error_body, url = %url, "Bedrock API error response");
            return Err(match status.as_u16() {
                401 | 403 => {
                    LlmError::AuthenticationFailed(format!("HTTP {status}: {error_body}"))
                }
                429 => LlmError::RateLimited { retry_after_ms },
                s if s >= 500 => LlmError::Provider {
                    message: format!("Bedrock server error HTTP {status}: {error_body}"),
                },
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let text = response.text().await.map_err(|e| LlmError::Provider {
            message: format!("failed to read response body: {e}"),
        })?;
        let body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;
        let meta: BedrockResponse = serde_json::from_value(body.clone()).unwrap_or_default();

        Ok(CompletionResponse {
            id: meta.id,
            content: first_text(&body).to_string(),
            model: if meta.model.is_empty() {
                model_id.to_string()
            } else {
                meta.model
            },
            stop_reason: meta.stop_reason.as_deref().and_then(|s| s.parse().ok()),
            usage: Usage {
                input_tokens: meta.usage.input_tokens,
                output_tokens: meta.usage.output_tokens,
            },
        })
    }
}
