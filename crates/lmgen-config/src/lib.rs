//! Configuration loading for lmgen
//!
//! A small TOML surface describing which model client to construct and how to
//! reach the provider. Client construction itself lives in `lmgen-client`;
//! this crate only loads and validates the file.
//!
//! ```toml
//! [llm]
//! provider = "openai"
//!
//! [llm.openai]
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! model = "gpt-4o-mini"
//! max_tokens = 2048
//! temperature = 0.2
//! ```

use lmgen_utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Providers the client factory knows how to construct.
const KNOWN_PROVIDERS: &[&str] = &["openai"];

/// Top-level lmgen configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Model-client selection and provider-specific settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name; defaults to "openai" when unset
    pub provider: Option<String>,
    pub openai: Option<OpenAiConfig>,
}

/// Settings for the OpenAI-compatible HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL; defaults to the OpenAI endpoint when unset.
    /// Point this at any OpenAI-compatible server (vLLM, LM Studio, ...).
    pub base_url: Option<String>,
    /// Environment variable holding the API key (default `OPENAI_API_KEY`)
    pub api_key_env: Option<String>,
    /// Default model used when model kwargs omit one
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read,
    /// `ConfigError::Parse` on malformed TOML, and `ConfigError::Validation`
    /// for semantically invalid settings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed TOML and
    /// `ConfigError::Validation` for semantically invalid settings.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate semantic constraints the TOML schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an unknown provider name or an
    /// out-of-range sampling temperature.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = self.llm.provider.as_deref()
            && !KNOWN_PROVIDERS.contains(&provider)
        {
            return Err(ConfigError::Validation(format!(
                "Unknown LLM provider '{}'. Supported providers: {}.",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if let Some(temperature) = self.llm.openai.as_ref().and_then(|o| o.temperature)
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ConfigError::Validation(format!(
                "temperature must be within [0.0, 2.0], got {temperature}"
            )));
        }

        Ok(())
    }

    /// Effective provider name, applying the default.
    #[must_use]
    pub fn provider(&self) -> &str {
        self.llm.provider.as_deref().unwrap_or("openai")
    }

    /// Minimal configuration for tests: default provider, no provider tables.
    #[cfg(any(test, feature = "test-utils"))]
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        Config {
            llm: LlmConfig {
                provider: None,
                openai: None,
            },
        }
    }
}
