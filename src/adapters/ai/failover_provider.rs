//! Failover AI Provider - primary provider with an optional fallback.
//!
//! A retryable failure from the primary (rate limit, outage, network, timeout)
//! is logged and the same request is sent once to the fallback. Any other
//! failure is returned as is.
//!
//! ```ignore
//! let provider = FailoverAIProvider::new(Box::new(gemini))
//!     .with_fallback(Box::new(claude));
//! ```

use async_trait::async_trait;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

pub struct FailoverAIProvider {
    primary: Box<dyn AIProvider>,
    fallback: Option<Box<dyn AIProvider>>,
}

impl FailoverAIProvider {
    pub fn new(primary: Box<dyn AIProvider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn AIProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[async_trait]
impl AIProvider for FailoverAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let err = match self.primary.complete(request.clone()).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        let fallback = match &self.fallback {
            Some(fallback) if err.is_retryable() => fallback,
            _ => return Err(err),
        };

        tracing::warn!(
            primary = %self.primary.provider_info().name,
            fallback = %fallback.provider_info().name,
            trace_id = %request.metadata.trace_id,
            error = %err,
            "Primary provider failed, using fallback"
        );
        fallback.complete(request).await
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        self.primary.estimate_tokens(text)
    }

    fn provider_info(&self) -> ProviderInfo {
        self.primary.provider_info()
    }
}
