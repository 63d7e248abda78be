//! Consultation configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Consultation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    /// Question catalog on disk; the bundled catalog is used when unset
    pub catalog_path: Option<PathBuf>,

    /// Name the assistant introduces itself with
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Registered agent name
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Maximum tokens per agent reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature for agent replies
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl SurveyConfig {
    /// Validate consultation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.assistant_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ASSISTANT_NAME"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature(self.temperature));
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }
        Ok(())
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            assistant_name: default_assistant_name(),
            agent_name: default_agent_name(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_assistant_name() -> String {
    "Riva".to_string()
}

fn default_agent_name() -> String {
    "delivery_staff_agent".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.3
}
