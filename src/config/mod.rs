//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DELIVERY_CONSULT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use delivery_consult::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Agent model: {}", config.ai.openai_model);
//! ```

mod ai;
mod error;
mod logging;
mod survey;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use survey::SurveyConfig;

use serde::Deserialize;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "DELIVERY_CONSULT";

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads; only the AI
/// section needs secrets, and those are checked by [`AppConfig::validate()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (OpenAI-compatible/Anthropic)
    #[serde(default)]
    pub ai: AiConfig,

    /// Consultation configuration (catalog, assistant persona, sampling)
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DELIVERY_CONSULT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DELIVERY_CONSULT__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    /// - `DELIVERY_CONSULT__SURVEY__TEMPERATURE=0.2` -> `survey.temperature = 0.2`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.survey.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "DELIVERY_CONSULT__AI__OPENAI_API_KEY",
        "DELIVERY_CONSULT__AI__PRIMARY_PROVIDER",
        "DELIVERY_CONSULT__AI__MAX_RETRIES",
        "DELIVERY_CONSULT__SURVEY__ASSISTANT_NAME",
        "DELIVERY_CONSULT__SURVEY__TEMPERATURE",
        "DELIVERY_CONSULT__SURVEY__CATALOG_PATH",
        "DELIVERY_CONSULT__LOGGING__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.survey.assistant_name, "Riva");
        assert_eq!(config.ai.primary_provider, AiProvider::OpenAI);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DELIVERY_CONSULT__AI__OPENAI_API_KEY", "gm-xxx");
        env::set_var("DELIVERY_CONSULT__AI__MAX_RETRIES", "5");
        env::set_var("DELIVERY_CONSULT__SURVEY__ASSISTANT_NAME", "Ada");
        env::set_var("DELIVERY_CONSULT__SURVEY__TEMPERATURE", "0.7");
        env::set_var("DELIVERY_CONSULT__SURVEY__CATALOG_PATH", "/tmp/questions.json");
        env::set_var("DELIVERY_CONSULT__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.openai_api_key.as_deref(), Some("gm-xxx"));
        assert_eq!(config.ai.max_retries, 5);
        assert_eq!(config.survey.assistant_name, "Ada");
        assert!((config.survey.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(
            config.survey.catalog_path.as_deref(),
            Some(std::path::Path::new("/tmp/questions.json"))
        );
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_primary_provider_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DELIVERY_CONSULT__AI__PRIMARY_PROVIDER", "anthropic");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().ai.primary_provider, AiProvider::Anthropic);
    }

    #[test]
    fn test_unparseable_value_is_a_load_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DELIVERY_CONSULT__AI__MAX_RETRIES", "many");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_out_of_range_value_loads_then_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DELIVERY_CONSULT__AI__OPENAI_API_KEY", "gm-xxx");
        env::set_var("DELIVERY_CONSULT__SURVEY__TEMPERATURE", "5.0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTemperature(t)) if (t - 5.0).abs() < f32::EPSILON
        ));
    }
}
