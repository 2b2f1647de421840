//! Model client abstraction for lmgen
//!
//! This crate provides a trait-based system for invoking generative-model
//! backends over HTTP. All providers implement the [`ModelClient`] trait,
//! allowing the generator orchestrator to work with any backend without
//! knowing wire-format details.

mod openai_client;
mod transport;
mod types;

#[cfg(any(test, feature = "test-utils"))]
mod mock_client;

pub use openai_client::{OpenAiClient, SamplingDefaults};
pub use types::ModelClient;

// Test seam; not part of public API stability guarantees.
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub use mock_client::MockClient;

use lmgen_config::Config;
use lmgen_utils::error::ClientError;
use std::sync::Arc;

/// Create a model client from configuration.
///
/// Dispatches on the configured provider name; when none is set the
/// `"openai"` provider is assumed. The returned client is shareable across
/// generators and tasks.
///
/// # Errors
///
/// Returns `ClientError::Unsupported` for an unknown provider and
/// `ClientError::Misconfiguration` when provider-specific settings are
/// invalid (e.g. missing API key).
pub fn client_from_config(config: &Config) -> Result<Arc<dyn ModelClient>, ClientError> {
    match config.provider() {
        "openai" => {
            let client = OpenAiClient::new_from_config(config)?;
            Ok(Arc::new(client))
        }
        unknown => Err(ClientError::Unsupported(format!(
            "Unknown LLM provider '{}'. Supported providers: openai.",
            unknown
        ))),
    }
}
