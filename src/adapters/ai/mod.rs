//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - Any OpenAI-compatible chat-completions endpoint (Gemini by default)
//! - `AnthropicProvider` - Anthropic Claude models via the Messages API
//! - `FailoverAIProvider` - Primary provider with an optional fallback
//! - `MockAIProvider` - Queued replies and call recording for tests

mod anthropic_provider;
mod factory;
mod failover_provider;
mod mock_provider;
mod openai_provider;
mod retry;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use factory::{build_provider, ProviderSetupError};
pub use failover_provider::FailoverAIProvider;
pub use mock_provider::{MockAIProvider, MockError, MockResponse, DEFAULT_MOCK_REPLY};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, GEMINI_OPENAI_BASE_URL};
