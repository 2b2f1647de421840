//! Structured generator result

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The structured, error-aware result of one generator call.
///
/// Created fresh per call. `error_message` is set iff a recoverable failure
/// occurred during backend invocation, parsing, or post-processing; in that
/// case `raw_response`/`data` hold the best-effort values produced before the
/// failure. A populated `error_message` means the call reached (or tried to
/// reach) the model; failures before that point raise instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorOutput {
    /// Parsed-but-unprocessed backend response. `None` only when the backend
    /// call itself failed before producing a completion.
    pub raw_response: Option<Value>,
    /// Post-processed payload; equals the parsed response when no output
    /// processors are configured.
    pub data: Option<Value>,
    /// Description of a recoverable failure, if one occurred.
    pub error_message: Option<String>,
}

impl GeneratorOutput {
    /// Result for a successfully parsed response; `data` is filled in by the
    /// post-processing step.
    #[must_use]
    pub fn new(raw_response: Value) -> Self {
        Self {
            raw_response: Some(raw_response),
            data: None,
            error_message: None,
        }
    }

    /// Result for a completion the client's parser rejected; carries the
    /// best-effort string form of the raw completion.
    #[must_use]
    pub fn from_parse_failure(raw_response: Value, error: impl Into<String>) -> Self {
        Self {
            raw_response: Some(raw_response),
            data: None,
            error_message: Some(error.into()),
        }
    }

    /// Result for a backend call that failed before producing a completion.
    #[must_use]
    pub fn from_call_failure(error: impl Into<String>) -> Self {
        Self {
            raw_response: None,
            data: None,
            error_message: Some(error.into()),
        }
    }

    /// Whether a recoverable failure occurred anywhere in the call.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}
