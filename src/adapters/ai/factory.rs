//! Builds the configured provider stack from [`AiConfig`].

use std::sync::Arc;
use thiserror::Error;

use super::{AnthropicConfig, AnthropicProvider, FailoverAIProvider, OpenAIConfig, OpenAIProvider};
use crate::config::{AiConfig, AiProvider};
use crate::ports::AIProvider;

/// Errors raised while wiring up AI providers.
#[derive(Debug, Error)]
pub enum ProviderSetupError {
    #[error("No API key configured for {0:?}")]
    MissingApiKey(AiProvider),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Creates the primary provider, wrapped with the fallback when one is configured.
pub fn build_provider(config: &AiConfig) -> Result<Arc<dyn AIProvider>, ProviderSetupError> {
    let primary = build_single(config, config.primary_provider)?;

    let fallback_kind = config
        .fallback_provider
        .filter(|kind| *kind != config.primary_provider);

    tracing::info!(
        primary = ?config.primary_provider,
        fallback = ?fallback_kind,
        "AI provider configured"
    );

    Ok(match fallback_kind {
        Some(kind) => {
            let fallback = build_single(config, kind)?;
            Arc::new(FailoverAIProvider::new(primary).with_fallback(fallback))
        }
        None => Arc::from(primary),
    })
}

fn build_single(
    config: &AiConfig,
    kind: AiProvider,
) -> Result<Box<dyn AIProvider>, ProviderSetupError> {
    let key = match kind {
        AiProvider::OpenAI => config.openai_api_key.as_deref(),
        AiProvider::Anthropic => config.anthropic_api_key.as_deref(),
    }
    .filter(|k| !k.is_empty())
    .ok_or(ProviderSetupError::MissingApiKey(kind))?;

    Ok(match kind {
        AiProvider::OpenAI => Box::new(OpenAIProvider::new(
            OpenAIConfig::new(key)
                .with_model(config.openai_model.clone())
                .with_base_url(config.openai_base_url.clone())
                .with_timeout(config.timeout())
                .with_max_retries(config.max_retries),
        )?),
        AiProvider::Anthropic => Box::new(AnthropicProvider::new(
            AnthropicConfig::new(key)
                .with_model(config.anthropic_model.clone())
                .with_timeout(config.timeout())
                .with_max_retries(config.max_retries),
        )?),
    })
}
