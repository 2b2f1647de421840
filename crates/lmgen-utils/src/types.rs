//! Core shared types for generator orchestration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Variables fed into a prompt template before rendering.
///
/// Values are JSON so callers can pass strings, numbers, or structured data;
/// the renderer decides how each value is textualized.
pub type PromptKwargs = HashMap<String, serde_json::Value>;

/// Model invocation arguments (model name, temperature, max_tokens, ...).
///
/// Must carry a `"model"` entry when handed to a [`Generator`]; everything
/// else is passed through to the backend untouched.
///
/// [`Generator`]: https://docs.rs/lmgen
pub type ModelKwargs = HashMap<String, serde_json::Value>;

/// Backend-specific call arguments produced by a model client's input
/// conversion, shaped exactly as the provider's wire format expects.
pub type ApiKwargs = serde_json::Map<String, serde_json::Value>;

/// Raw completion payload returned by a backend before parsing.
pub type Completion = serde_json::Value;

/// Tag distinguishing backend call shapes
///
/// Model clients use this to build correct request arguments: chat-style
/// completion requests for [`ModelType::Llm`], embedding requests for
/// [`ModelType::Embedder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Chat/completion-style generative call
    Llm,
    /// Embedding call
    Embedder,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::Llm => write!(f, "llm"),
            ModelType::Embedder => write!(f, "embedder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_display() {
        assert_eq!(ModelType::Llm.to_string(), "llm");
        assert_eq!(ModelType::Embedder.to_string(), "embedder");
    }

    #[test]
    fn test_model_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&ModelType::Llm).unwrap(), "\"llm\"");
        let parsed: ModelType = serde_json::from_str("\"embedder\"").unwrap();
        assert_eq!(parsed, ModelType::Embedder);
    }
}
