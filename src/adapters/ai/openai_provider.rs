//! OpenAI-compatible Provider - AIProvider over the chat-completions API.
//!
//! Any endpoint that speaks the OpenAI chat-completions dialect works here.
//! The default configuration targets Gemini's OpenAI-compatible endpoint,
//! which is what the consultation agent is registered against.
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_base_url(GEMINI_OPENAI_BASE_URL);
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::{map_send_error, parse_retry_after, with_backoff};
use super::ProviderSetupError;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Gemini's OpenAI-compatible base URL.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    pub model: String,
    /// Base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.5-flash".to_string(),
            base_url: GEMINI_OPENAI_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Chat-completions provider.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self, ProviderSetupError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderSetupError::HttpClient)?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> ChatRequest {
        let system = request
            .system_prompt
            .iter()
            .map(|prompt| ChatMessage {
                role: "system".to_string(),
                content: Some(prompt.clone()),
            });

        let history = request.messages.iter().map(|msg| ChatMessage {
            role: match msg.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            }
            .to_string(),
            content: Some(msg.content.clone()),
        });

        ChatRequest {
            model: self.config.model.clone(),
            messages: system.chain(history).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&self.to_wire_request(request))
            .send()
            .await
            .map_err(|e| map_send_error(e, self.config.timeout))?;

        let response = self.check_status(response, request).await?;
        self.parse_response(response).await
    }

    async fn check_status(
        &self,
        response: Response,
        request: &CompletionRequest,
    ) -> Result<Response, AIError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => AIError::AuthenticationFailed,
            429 => AIError::rate_limited(parse_retry_after(&error_body, 30)),
            400 if error_body.contains("maximum context length")
                || error_body.contains("context_length_exceeded") =>
            {
                AIError::context_too_long(
                    self.estimate_request_tokens(request),
                    self.provider_info().max_context_tokens,
                )
            }
            400 | 404 | 422 => AIError::InvalidRequest(error_body),
            500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
            _ => AIError::network(format!("Unexpected status {}: {}", status, error_body)),
        })
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No choices in response"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
            model: body.model.unwrap_or_else(|| self.config.model.clone()),
            finish_reason,
        })
    }

    fn estimate_request_tokens(&self, request: &CompletionRequest) -> u32 {
        u32::try_from(request.prompt_len() / 4).unwrap_or(u32::MAX)
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        tracing::debug!(
            model = %self.config.model,
            trace_id = %request.metadata.trace_id,
            estimated_tokens = self.estimate_request_tokens(&request),
            "Sending chat completion"
        );
        with_backoff("openai", self.config.max_retries, || self.send(&request)).await
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        // ~4 characters per token for English text
        u32::try_from(text.len() / 4).unwrap_or(u32::MAX).max(1)
    }

    fn provider_info(&self) -> ProviderInfo {
        let max_context = match self.config.model.as_str() {
            m if m.starts_with("gemini-") => 1_048_576,
            m if m.starts_with("gpt-4o") || m.starts_with("gpt-4-turbo") => 128_000,
            m if m.starts_with("gpt-4") => 8_192,
            _ => 128_000,
        };
        ProviderInfo::new("openai", &self.config.model, max_context)
    }
}

// ----- Chat-completions wire types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::ports::RequestMetadata;

    fn provider(model: &str) -> OpenAIProvider {
        OpenAIProvider::new(OpenAIConfig::new("test-key").with_model(model)).unwrap()
    }

    #[test]
    fn config_defaults_target_gemini() {
        let config = OpenAIConfig::new("key");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url, GEMINI_OPENAI_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.api_key(), "key");
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let provider = OpenAIProvider::new(
            OpenAIConfig::new("k").with_base_url("https://api.openai.com/v1/"),
        )
        .unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn wire_request_puts_system_prompt_first() {
        let request = CompletionRequest::new(RequestMetadata::new(SessionId::new(), "t"))
            .with_system_prompt("You are Riva")
            .with_message(MessageRole::Assistant, "Question: ... ID[1]")
            .with_message(MessageRole::User, "Bankstown")
            .with_temperature(0.3);

        let wire = provider("gemini-2.5-flash").to_wire_request(&request);
        let roles: Vec<&str> = wire.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "assistant", "user"]);
        assert_eq!(wire.temperature, Some(0.3));

        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn provider_info_by_model() {
        assert_eq!(provider("gemini-2.5-flash").provider_info().max_context_tokens, 1_048_576);
        assert_eq!(provider("gpt-4o-mini").provider_info().max_context_tokens, 128_000);
        assert_eq!(provider("gpt-4").provider_info().name, "openai");
    }

    #[test]
    fn estimate_tokens_approximates() {
        let p = provider("gemini-2.5-flash");
        assert_eq!(p.estimate_tokens("Hi"), 1);
        assert_eq!(p.estimate_tokens("Hello, world!"), 3);
    }

    #[test]
    fn response_tolerates_null_content() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert!(body.model.is_none());
        assert!(body.choices[0].message.content.is_none());
    }
}
