use std::time::Duration;
use thiserror::Error;

/// Configuration file errors.
///
/// Raised when loading or validating an lmgen TOML configuration. These are
/// fatal to the assembler: a Generator is never constructed from a config
/// that fails here.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Prompt template errors.
///
/// Rendering errors indicate a caller-construction mistake (an under-specified
/// variable set), so they are always surfaced to the caller rather than being
/// folded into a structured output.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt template is empty")]
    EmptyTemplate,

    #[error("Prompt variable '{name}' is not bound (no caller value and no preset)")]
    MissingVariable { name: String },
}

/// Model client errors.
///
/// Covers the full backend interaction surface: transport, provider-side
/// failures, input conversion, and completion parsing.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (HTTP connectivity, malformed response body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Request timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Completion could not be parsed into a usable response
    #[error("Completion parse error: {0}")]
    Parse(String),

    /// Configuration error (missing API key, bad base URL, no model)
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported provider or capability
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Output-processor stage failure.
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Processor failed: {0}")]
    Failed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors a Generator is allowed to raise.
///
/// Only configuration and rendering failures escape `call`/`acall`; backend
/// and post-processing failures are recovered into the `error_message` field
/// of a returned `GeneratorOutput`. A caller can therefore always distinguish
/// "failed before reaching the model" (this error) from "reached the model but
/// something downstream was imperfect" (`error_message` populated).
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("model_kwargs must contain a 'model' entry")]
    MissingModel,

    #[error("trainable parameter '{name}' not found in prompt variables: [{available}]")]
    UnknownTrainableParam { name: String, available: String },

    #[error("Prompt rendering error: {0}")]
    Render(#[from] PromptError),

    #[error("Failed to build backend call arguments: {0}")]
    ApiKwargs(#[source] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_error_messages() {
        let err = GeneratorError::MissingModel;
        assert!(err.to_string().contains("'model'"));

        let err = GeneratorError::UnknownTrainableParam {
            name: "steps_str".to_string(),
            available: "context_str, task_desc_str".to_string(),
        };
        assert!(err.to_string().contains("steps_str"));
        assert!(err.to_string().contains("context_str"));
    }

    #[test]
    fn test_prompt_error_converts_into_generator_error() {
        let err: GeneratorError = PromptError::MissingVariable {
            name: "context_str".to_string(),
        }
        .into();
        match err {
            GeneratorError::Render(PromptError::MissingVariable { name }) => {
                assert_eq!(name, "context_str");
            }
            other => panic!("Expected Render variant, got {other:?}"),
        }
    }

    #[test]
    fn test_client_error_timeout_display() {
        let err = ClientError::Timeout {
            duration: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("30"));
    }
}
